#![allow(dead_code)]

use chaos::{
    Connection, Database, FieldSpec, Reconciliation, RelationConfig, Registry, Result, Rows,
    SQLDialect, Schema, ThroughConfig, Value,
};
use chaos_sqlite::SqliteConnection;
use std::cell::RefCell;

/// In-memory SQLite connection that records every statement it runs.
#[derive(Debug)]
pub struct RecordingConnection {
    inner: SqliteConnection,
    log: RefCell<Vec<String>>,
}

impl RecordingConnection {
    pub fn open() -> Self {
        Self {
            inner: SqliteConnection::open_in_memory().expect("Failed to open in-memory database"),
            log: RefCell::new(Vec::new()),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Recorded statements starting with `keyword`, e.g. `"DELETE"`.
    pub fn matching(&self, keyword: &str) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|sql| sql.starts_with(keyword))
            .cloned()
            .collect()
    }

    /// Recorded statements other than `SELECT`s.
    pub fn writes(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter(|sql| !sql.starts_with("SELECT"))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl Connection for RecordingConnection {
    fn dialect(&self) -> &dyn SQLDialect {
        self.inner.dialect()
    }

    fn execute(&self, sql: &str) -> Result<Rows> {
        self.log.borrow_mut().push(sql.to_owned());
        self.inner.execute(sql)
    }

    fn last_insert_id(&self) -> Option<Value> {
        self.inner.last_insert_id()
    }
}

fn image_tag() -> Schema {
    Schema::new("ImageTag")
        .source("images_tags")
        .field(FieldSpec::new("id", "serial"))
        .field(FieldSpec::new("image_id", "integer"))
        .field(FieldSpec::new("tag_id", "integer"))
        .belongs_to("image", "Image")
        .belongs_to("tag", "Tag")
}

pub fn registry(mode: Reconciliation) -> Registry {
    registry_with(mode, image_tag())
}

fn registry_with(mode: Reconciliation, image_tag: Schema) -> Registry {
    let gallery = Schema::new("Gallery")
        .field(FieldSpec::new("id", "serial"))
        .field(FieldSpec::new("name", "string"))
        .has_many("images", "Image")
        .has_many_with("titles", RelationConfig::new("Image").fields(["title"]))
        .has_many_with(
            "broken",
            RelationConfig::new("Image").keys("id", "missing_id"),
        )
        .has_one("detail", "GalleryDetail");

    let detail = Schema::new("GalleryDetail")
        .source("gallery_details")
        .field(FieldSpec::new("id", "serial"))
        .field(FieldSpec::new("description", "text"))
        .field(FieldSpec::new("gallery_id", "integer"))
        .belongs_to("gallery", "Gallery");

    let image = Schema::new("Image")
        .field(FieldSpec::new("id", "serial"))
        .field(FieldSpec::new("gallery_id", "integer"))
        .field(FieldSpec::new("name", "string"))
        .field(FieldSpec::new("title", "string"))
        .belongs_to("gallery", "Gallery")
        .has_many("images_tags", "ImageTag")
        .has_many_through_with("tags", ThroughConfig::new("images_tags", "tag").mode(mode))
        .expect("Failed to declare tags");

    let tag = Schema::new("Tag")
        .field(FieldSpec::new("id", "serial"))
        .field(FieldSpec::new("name", "string"))
        .has_many("images_tags", "ImageTag")
        .has_many_through("images", "images_tags", "image")
        .expect("Failed to declare images");

    let mut registry = Registry::new();
    for schema in [gallery, detail, image, image_tag, tag] {
        registry.insert(schema).expect("Failed to register schema");
    }
    registry
}

pub fn setup_db() -> Database<RecordingConnection> {
    setup_db_with(Reconciliation::Diff)
}

pub fn setup_db_with(mode: Reconciliation) -> Database<RecordingConnection> {
    setup(registry(mode))
}

/// Fixtures whose pivot rows carry an extra `position` attribute.
pub fn setup_ranked_db() -> Database<RecordingConnection> {
    let image_tag = image_tag().field(FieldSpec::new("position", "integer"));
    setup(registry_with(Reconciliation::Diff, image_tag))
}

/// Creates every table, loads the fixtures and clears the statement log.
fn setup(registry: Registry) -> Database<RecordingConnection> {
    let db = Database::new(RecordingConnection::open(), registry);
    for model in ["Gallery", "GalleryDetail", "Image", "ImageTag", "Tag"] {
        db.create_table(model).expect("Failed to create table");
    }
    seed(&db);
    db.connection().clear();
    db
}

fn seed(db: &Database<RecordingConnection>) {
    let statements = [
        r#"INSERT INTO "gallery" ("id", "name") VALUES (1, 'Foo Gallery'), (2, 'Bar Gallery')"#,
        r#"INSERT INTO "gallery_details" ("id", "description", "gallery_id") VALUES (1, 'Foo Gallery Description', 1)"#,
        r#"INSERT INTO "image" ("id", "gallery_id", "name", "title") VALUES
            (1, 1, 'amiga_1200.jpg', 'Amiga 1200'),
            (2, 1, 'srinivasa_ramanujan.jpg', 'Srinivasa Ramanujan'),
            (3, 1, 'las_vegas.jpg', 'Las Vegas'),
            (4, 2, 'montreal.jpg', 'Montreal'),
            (5, 2, 'panda.jpg', 'Panda')"#,
        r#"INSERT INTO "tag" ("id", "name") VALUES
            (1, 'High Tech'), (2, 'Sea'), (3, 'Computer'), (4, 'Science'), (5, 'City'), (6, 'Wildlife')"#,
        r#"INSERT INTO "images_tags" ("id", "image_id", "tag_id") VALUES
            (1, 1, 1), (2, 1, 3), (3, 2, 4), (4, 3, 5), (5, 4, 6), (6, 4, 3), (7, 4, 1), (8, 5, 6)"#,
    ];
    for sql in statements {
        db.execute_sql(sql).expect("Failed to seed fixtures");
    }
}

pub fn text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or_default()
}

pub fn int(value: Option<&Value>) -> i64 {
    value.and_then(Value::as_i64).unwrap_or_default()
}
