mod common;

use chaos::core::prelude::{eq, field};
use chaos::{Collection, Entity, Reconciliation, SaveOptions, Value};
use common::{RecordingConnection, int, setup_db, setup_db_with, setup_ranked_db, text};

type Db = chaos::Database<RecordingConnection>;

fn image(db: &Db, id: i64, embed: &[&str]) -> Entity {
    db.query("Image")
        .unwrap()
        .r#where(eq(field("id"), id))
        .embed(embed.iter().copied())
        .first()
        .unwrap()
        .unwrap()
}

fn tag(db: &Db, id: i64) -> Entity {
    db.query("Tag")
        .unwrap()
        .r#where(eq(field("id"), id))
        .first()
        .unwrap()
        .unwrap()
}

fn tag_ids(db: &Db, image_id: i64) -> Vec<i64> {
    let tags = db.relation("Image", "tags").unwrap();
    image(db, image_id, &["tags"])
        .through_entities(&tags)
        .unwrap()
        .into_iter()
        .map(|tag| int(tag.get("id")))
        .collect()
}

#[test]
fn test_save_new_gallery_with_images() {
    let db = setup_db();
    let images = Collection::with_entities(
        "Image",
        vec![
            Entity::new("Image").with("title", "Amiga 500"),
            Entity::new("Image").with("title", "Atari ST"),
        ],
    );
    let mut gallery = Entity::new("Gallery")
        .with("name", "Retro Gallery")
        .with_many("images", images);
    db.save_with(&mut gallery, &SaveOptions::new().embed(["images"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 3, "{writes:#?}");
    assert_eq!(
        writes[0],
        r#"INSERT INTO "gallery" ("name") VALUES ('Retro Gallery')"#
    );
    assert!(writes[1].starts_with(r#"INSERT INTO "image""#));
    assert!(db.connection().matching("DELETE").is_empty());

    assert!(gallery.exists());
    assert_eq!(int(gallery.get("id")), 3);
    for image in gallery.many("images").unwrap() {
        assert!(image.exists());
        assert_eq!(int(image.get("gallery_id")), 3);
    }
    let ids: Vec<i64> = gallery
        .many("images")
        .unwrap()
        .iter()
        .map(|image| int(image.get("id")))
        .collect();
    assert_eq!(ids, [6, 7]);
}

#[test]
fn test_update_writes_only_modified_fields() {
    let db = setup_db();
    let mut amiga = image(&db, 1, &[]);
    db.connection().clear();

    amiga.set("title", "Amiga 500");
    db.save(&mut amiga).unwrap();
    assert_eq!(
        db.connection().statements(),
        [r#"UPDATE "image" SET "title" = 'Amiga 500' WHERE "id" = 1"#]
    );

    db.connection().clear();
    db.save(&mut amiga).unwrap();
    assert!(db.connection().statements().is_empty());
}

#[test]
fn test_fields_outside_the_schema_are_not_written() {
    let db = setup_db();
    let mut tag = Entity::new("Tag").with("name", "Space").with("color", "blue");
    db.save(&mut tag).unwrap();
    assert_eq!(
        db.connection().writes(),
        [r#"INSERT INTO "tag" ("name") VALUES ('Space')"#]
    );
    assert_eq!(int(tag.get("id")), 7);
    assert_eq!(text(tag.get("color")), "blue");
}

#[test]
fn test_belongs_to_is_saved_first() {
    let db = setup_db();
    let mut panda = Entity::new("Image")
        .with("title", "Red Panda")
        .with_one("gallery", Entity::new("Gallery").with("name", "Zoo Gallery"));
    db.save_with(&mut panda, &SaveOptions::new().embed(["gallery"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 2, "{writes:#?}");
    assert!(writes[0].starts_with(r#"INSERT INTO "gallery""#));
    assert!(writes[1].starts_with(r#"INSERT INTO "image""#));
    assert_eq!(int(panda.get("gallery_id")), 3);
    assert_eq!(int(panda.one("gallery").unwrap().unwrap().get("id")), 3);
}

#[test]
fn test_has_one_sets_foreign_key() {
    let db = setup_db();
    let mut bar = db
        .query("Gallery")
        .unwrap()
        .r#where(eq(field("id"), 2))
        .first()
        .unwrap()
        .unwrap()
        .with_one(
            "detail",
            Entity::new("GalleryDetail").with("description", "Bar Gallery Description"),
        );
    db.connection().clear();
    db.save_with(&mut bar, &SaveOptions::new().embed(["detail"]))
        .unwrap();

    let detail = bar.one("detail").unwrap().unwrap();
    assert_eq!(int(detail.get("gallery_id")), 2);
    assert_eq!(db.connection().writes().len(), 1);

    let galleries = db.query("Gallery").unwrap().embed(["detail"]).all().unwrap();
    let reloaded = galleries.get(1).unwrap().one("detail").unwrap().unwrap();
    assert_eq!(text(reloaded.get("description")), "Bar Gallery Description");
}

#[test]
fn test_has_many_deletes_missing_children_at_once() {
    let db = setup_db();
    let mut foo = db
        .query("Gallery")
        .unwrap()
        .r#where(eq(field("id"), 1))
        .embed(["images"])
        .first()
        .unwrap()
        .unwrap();
    {
        let images = foo.many_mut("images").unwrap();
        images.remove(2);
        images.remove(0);
        images.push(Entity::new("Image").with("title", "Commodore 64"));
    }
    db.connection().clear();
    db.save_with(&mut foo, &SaveOptions::new().embed(["images"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 2, "{writes:#?}");
    assert!(writes[0].starts_with(r#"INSERT INTO "image""#));
    assert_eq!(writes[1], r#"DELETE FROM "image" WHERE "id" IN (1, 3)"#);

    let count = db
        .query("Image")
        .unwrap()
        .r#where(eq(field("gallery_id"), 1))
        .count()
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_through_diff_touches_only_changed_pivots() {
    let db = setup_db();
    let tags = db.relation("Image", "tags").unwrap();
    let mut montreal = image(&db, 4, &["tags"]);
    let sea = tag(&db, 2);
    db.connection().clear();

    let previous = montreal.through(&tags).unwrap().set(1, sea);
    assert_eq!(text(previous.as_ref().and_then(|tag| tag.get("name"))), "Computer");
    db.save_with(&mut montreal, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 2, "{writes:#?}");
    assert_eq!(
        writes[0],
        r#"INSERT INTO "images_tags" ("image_id", "tag_id") VALUES (4, 2)"#
    );
    assert_eq!(writes[1], r#"DELETE FROM "images_tags" WHERE "id" IN (6)"#);

    let mut reloaded = tag_ids(&db, 4);
    reloaded.sort_unstable();
    assert_eq!(reloaded, [1, 2, 6]);
}

#[test]
fn test_through_diff_reuses_rows_for_duplicates() {
    let db = setup_db();
    let tags = db.relation("Image", "tags").unwrap();
    let mut amiga = image(&db, 1, &["tags"]);
    let high_tech = tag(&db, 1);
    db.connection().clear();

    amiga.through(&tags).unwrap().push(high_tech);
    db.save_with(&mut amiga, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 1, "{writes:#?}");
    assert!(writes[0].starts_with(r#"INSERT INTO "images_tags""#));
    assert_eq!(tag_ids(&db, 1), [1, 3, 1]);
}

/// Image 1 gets a second High Tech pivot: rows (1, tag 1, position 10),
/// (2, tag 3) and (9, tag 1, position 20).
fn ranked_amiga(db: &Db) -> Entity {
    for sql in [
        r#"UPDATE "images_tags" SET "position" = 10 WHERE "id" = 1"#,
        r#"INSERT INTO "images_tags" ("id", "image_id", "tag_id", "position") VALUES (9, 1, 1, 20)"#,
    ] {
        db.execute_sql(sql).unwrap();
    }
    let amiga = image(db, 1, &["tags"]);
    db.connection().clear();
    amiga
}

fn stored_pivots(db: &Db, image_id: i64) -> Vec<(i64, i64, Option<i64>)> {
    db.query("ImageTag")
        .unwrap()
        .r#where(eq(field("image_id"), image_id))
        .order(["id"])
        .all()
        .unwrap()
        .iter()
        .map(|pivot| {
            (
                int(pivot.get("id")),
                int(pivot.get("tag_id")),
                pivot.get("position").and_then(Value::as_i64),
            )
        })
        .collect()
}

#[test]
fn test_through_diff_keeps_the_retained_duplicate_row() {
    let db = setup_ranked_db();
    let tags = db.relation("Image", "tags").unwrap();
    let mut amiga = ranked_amiga(&db);

    let dropped = amiga.through(&tags).unwrap().unset(0);
    assert_eq!(int(dropped.as_ref().and_then(|tag| tag.get("id"))), 1);
    db.save_with(&mut amiga, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    assert_eq!(
        db.connection().writes(),
        [r#"DELETE FROM "images_tags" WHERE "id" IN (1)"#]
    );
    assert_eq!(stored_pivots(&db, 1), [(2, 3, None), (9, 1, Some(20))]);

    let survivor = amiga.many("images_tags").unwrap().get(1).unwrap();
    assert_eq!(int(survivor.get("id")), 9);
    assert_eq!(int(survivor.get("position")), 20);
    assert!(!survivor.is_modified("position"));
}

#[test]
fn test_through_diff_drops_the_removed_duplicate_row() {
    let db = setup_ranked_db();
    let tags = db.relation("Image", "tags").unwrap();
    let mut amiga = ranked_amiga(&db);

    amiga.through(&tags).unwrap().unset(2);
    db.save_with(&mut amiga, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    assert_eq!(
        db.connection().writes(),
        [r#"DELETE FROM "images_tags" WHERE "id" IN (9)"#]
    );
    assert_eq!(stored_pivots(&db, 1), [(1, 1, Some(10)), (2, 3, None)]);
}

#[test]
fn test_through_flush_recreates_pivots() {
    let db = setup_db_with(Reconciliation::Flush);
    let tags = db.relation("Image", "tags").unwrap();
    let mut montreal = image(&db, 4, &["tags"]);
    let sea = tag(&db, 2);
    db.connection().clear();

    montreal.through(&tags).unwrap().set(1, sea);
    db.save_with(&mut montreal, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(writes.len(), 4, "{writes:#?}");
    assert_eq!(
        writes[0],
        r#"DELETE FROM "images_tags" WHERE "image_id" = 4"#
    );
    assert_eq!(db.connection().matching("INSERT").len(), 3);
    assert_eq!(tag_ids(&db, 4), [6, 2, 1]);
}

#[test]
fn test_through_push_new_far_entity() {
    let db = setup_db();
    let tags = db.relation("Image", "tags").unwrap();
    let mut panda = image(&db, 5, &["tags"]);
    db.connection().clear();

    panda
        .through(&tags)
        .unwrap()
        .push(Entity::new("Tag").with("name", "Bamboo"));
    db.save_with(&mut panda, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    let writes = db.connection().writes();
    assert_eq!(
        writes,
        [
            r#"INSERT INTO "tag" ("name") VALUES ('Bamboo')"#,
            r#"INSERT INTO "images_tags" ("tag_id", "image_id") VALUES (7, 5)"#,
        ]
    );
    assert_eq!(tag_ids(&db, 5), [6, 7]);
}

#[test]
fn test_through_on_new_entity() {
    let db = setup_db();
    let tags = db.relation("Image", "tags").unwrap();
    let city = tag(&db, 5);
    let mut vegas = Entity::new("Image").with("title", "Las Vegas by Night");
    {
        let mut view = vegas.through(&tags).unwrap();
        view.push(city);
        view.push(Entity::new("Tag").with("name", "Night"));
    }
    db.save_with(&mut vegas, &SaveOptions::new().embed(["tags"]))
        .unwrap();

    let id = int(vegas.get("id"));
    assert_eq!(id, 6);
    assert_eq!(tag_ids(&db, id), [5, 7]);
}

#[test]
fn test_unloaded_relations_are_skipped() {
    let db = setup_db();
    let mut amiga = image(&db, 1, &[]);
    db.connection().clear();
    db.save_with(&mut amiga, &SaveOptions::new().embed(["tags", "gallery"]))
        .unwrap();
    assert!(db.connection().statements().is_empty());

    let through = db.relation("Image", "tags").unwrap();
    assert!(amiga.through(&through).is_err());
}

#[test]
fn test_delete_makes_entity_new() {
    let db = setup_db();
    let mut bar = db
        .query("Gallery")
        .unwrap()
        .r#where(eq(field("id"), 2))
        .first()
        .unwrap()
        .unwrap();
    db.connection().clear();
    db.delete(&mut bar).unwrap();

    assert_eq!(
        db.connection().statements(),
        [r#"DELETE FROM "gallery" WHERE "id" = 2"#]
    );
    assert!(!bar.exists());
    assert_eq!(db.query("Gallery").unwrap().count().unwrap(), 1);
    assert!(db.delete(&mut Entity::new("Gallery")).is_err());
}

#[test]
fn test_save_all() {
    let db = setup_db();
    let mut tags = Collection::with_entities(
        "Tag",
        vec![
            Entity::new("Tag").with("name", "Forest"),
            Entity::new("Tag").with("name", Value::from("Desert")),
        ],
    );
    db.save_all(&mut tags, &SaveOptions::new()).unwrap();
    assert_eq!(db.connection().matching("INSERT").len(), 2);
    assert!(tags.iter().all(Entity::exists));
    assert_eq!(db.query("Tag").unwrap().count().unwrap(), 8);
}
