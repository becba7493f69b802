mod common;

use chaos::{ChaosError, Collection, Entity, Value};
use common::{int, setup_db, text};

fn names(collection: &Collection, field: &str) -> Vec<String> {
    collection
        .iter()
        .map(|entity| text(entity.get(field)).to_owned())
        .collect()
}

#[test]
fn test_has_many_embed_uses_one_query() {
    let db = setup_db();
    let galleries = db.query("Gallery").unwrap().embed(["images"]).all().unwrap();

    let selects = db.connection().matching("SELECT");
    assert_eq!(selects.len(), 2);
    assert_eq!(
        selects[1],
        r#"SELECT * FROM "image" WHERE "gallery_id" IN (1, 2)"#
    );

    let foo = galleries.get(0).unwrap();
    assert_eq!(text(foo.get("name")), "Foo Gallery");
    assert_eq!(
        names(foo.many("images").unwrap(), "title"),
        ["Amiga 1200", "Srinivasa Ramanujan", "Las Vegas"]
    );
    let bar = galleries.get(1).unwrap();
    assert_eq!(names(bar.many("images").unwrap(), "title"), ["Montreal", "Panda"]);
}

#[test]
fn test_belongs_to_embed_shares_targets() {
    let db = setup_db();
    let images = db.query("Image").unwrap().embed(["gallery"]).all().unwrap();

    assert_eq!(db.connection().matching("SELECT").len(), 2);
    let galleries: Vec<i64> = images
        .iter()
        .map(|image| int(image.one("gallery").unwrap().unwrap().get("id")))
        .collect();
    assert_eq!(galleries, [1, 1, 1, 2, 2]);
}

#[test]
fn test_has_one_embed() {
    let db = setup_db();
    let galleries = db.query("Gallery").unwrap().embed(["detail"]).all().unwrap();

    let foo = galleries.get(0).unwrap().one("detail").unwrap().unwrap();
    assert_eq!(text(foo.get("description")), "Foo Gallery Description");
    assert!(galleries.get(1).unwrap().one("detail").unwrap().is_none());
}

#[test]
fn test_nested_through_embed_one_query_per_level() {
    let db = setup_db();
    let galleries = db
        .query("Gallery")
        .unwrap()
        .embed(["images.tags"])
        .all()
        .unwrap();

    // galleries, images, pivots, tags
    let selects = db.connection().matching("SELECT");
    assert_eq!(selects.len(), 4, "{selects:#?}");
    assert!(selects[2].starts_with(r#"SELECT * FROM "images_tags" WHERE "image_id" IN"#));
    assert!(selects[3].starts_with(r#"SELECT * FROM "tag" WHERE "id" IN"#));

    let bar = galleries.get(1).unwrap();
    let montreal = bar.many("images").unwrap().get(0).unwrap();
    let tags_rel = db.relation("Image", "tags").unwrap();
    let tags: Vec<&str> = montreal
        .through_entities(&tags_rel)
        .unwrap()
        .into_iter()
        .map(|tag| text(tag.get("name")))
        .collect();
    assert_eq!(tags, ["Wildlife", "Computer", "High Tech"]);
}

#[test]
fn test_through_preserves_multiplicity() {
    let db = setup_db();
    db.execute_sql(r#"INSERT INTO "images_tags" ("image_id", "tag_id") VALUES (1, 1)"#)
        .unwrap();

    let mut images = db
        .query("Image")
        .unwrap()
        .r#where(chaos::core::prelude::eq(chaos::core::prelude::field("id"), 1))
        .embed(["tags"])
        .all()
        .unwrap();
    let tags_rel = db.relation("Image", "tags").unwrap();
    let amiga = images.get_mut(0).unwrap();
    assert!(amiga.is_loaded("tags"));

    let view = amiga.through(&tags_rel).unwrap();
    assert_eq!(view.len(), 3);
    let ids: Vec<i64> = view.iter().map(|tag| int(tag.get("id"))).collect();
    assert_eq!(ids, [1, 3, 1]);
}

#[test]
fn test_reverse_through_embed() {
    let db = setup_db();
    let tags = db
        .query("Tag")
        .unwrap()
        .r#where(chaos::core::prelude::eq(chaos::core::prelude::field("name"), "Computer"))
        .embed(["images.gallery"])
        .all()
        .unwrap();
    let images_rel = db.relation("Tag", "images").unwrap();
    let computer = tags.get(0).unwrap();
    let galleries: Vec<&str> = computer
        .through_entities(&images_rel)
        .unwrap()
        .into_iter()
        .map(|image| text(image.one("gallery").unwrap().unwrap().get("name")))
        .collect();
    assert_eq!(galleries, ["Foo Gallery", "Bar Gallery"]);
}

#[test]
fn test_fields_filter_adds_correlation_key() {
    let db = setup_db();
    let galleries = db.query("Gallery").unwrap().embed(["titles"]).all().unwrap();

    let selects = db.connection().matching("SELECT");
    assert_eq!(
        selects[1],
        r#"SELECT "title", "gallery_id" FROM "image" WHERE "gallery_id" IN (1, 2)"#
    );
    let titles = galleries.get(1).unwrap().many("titles").unwrap();
    assert_eq!(names(titles, "title"), ["Montreal", "Panda"]);
    assert!(titles.get(0).unwrap().get("name").is_none());
}

#[test]
fn test_owners_without_keys_skip_the_query() {
    let db = setup_db();
    let mut galleries = Collection::with_entities(
        "Gallery",
        vec![Entity::new("Gallery"), Entity::new("Gallery").with("id", Value::Null)],
    );
    db.embed(&mut galleries, ["images"]).unwrap();

    assert!(db.connection().statements().is_empty());
    for gallery in &galleries {
        assert!(gallery.many("images").unwrap().is_empty());
    }
}

#[test]
fn test_missing_relation_key_is_an_integrity_error() {
    let db = setup_db();
    let err = db
        .query("Gallery")
        .unwrap()
        .embed(["broken"])
        .all()
        .unwrap_err();
    assert!(matches!(err, ChaosError::Integrity(_)), "{err}");
    assert!(err.to_string().contains("`missing_id`"));
}

#[test]
fn test_unembedded_relation_is_not_loaded() {
    let db = setup_db();
    let gallery = db.query("Gallery").unwrap().first().unwrap().unwrap();
    assert!(matches!(
        gallery.many("images"),
        Err(ChaosError::NotLoaded(_))
    ));

    let err = db.query("Gallery").unwrap().embed(["nope"]).all().unwrap_err();
    assert!(matches!(err, ChaosError::Configuration(_)));
}
