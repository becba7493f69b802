//! # chaos
//!
//! A relational data-mapping layer: schemas with typed fields, dialect-aware
//! SQL compilation, and relationships that load without N+1 queries and save
//! with cascading reconciliation.
//!
//! ## Quick Start
//!
//! ```rust
//! use chaos::prelude::*;
//! use chaos_sqlite::SqliteConnection;
//!
//! # fn main() -> chaos::Result<()> {
//! let registry = Registry::new()
//!     .register(
//!         Schema::new("Gallery")
//!             .field(FieldSpec::new("id", "serial"))
//!             .field(FieldSpec::new("name", "string"))
//!             .has_many("images", "Image"),
//!     )?
//!     .register(
//!         Schema::new("Image")
//!             .field(FieldSpec::new("id", "serial"))
//!             .field(FieldSpec::new("gallery_id", "integer"))
//!             .field(FieldSpec::new("title", "string"))
//!             .belongs_to("gallery", "Gallery"),
//!     )?;
//!
//! let db = Database::new(SqliteConnection::open_in_memory()?, registry);
//! db.create_table("Gallery")?;
//! db.create_table("Image")?;
//!
//! let images = Collection::with_entities(
//!     "Image",
//!     vec![
//!         Entity::new("Image").with("title", "Amiga 1200"),
//!         Entity::new("Image").with("title", "Srinivasa Ramanujan"),
//!     ],
//! );
//! let mut gallery = Entity::new("Gallery")
//!     .with("name", "Foo")
//!     .with_many("images", images);
//! db.save_with(&mut gallery, &SaveOptions::new().embed(["images"]))?;
//!
//! let galleries = db.query("Gallery")?.embed(["images"]).all()?;
//! assert_eq!(galleries.get(0).unwrap().many("images")?.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dialect Support
//!
//! | Database   | Crate            | Feature Flag |
//! |------------|------------------|--------------|
//! | SQLite     | `chaos-sqlite`   | `sqlite` (connection: `rusqlite`) |
//! | PostgreSQL | `chaos-postgres` | `postgres`   |
//! | MySQL      | `chaos-mysql`    | `mysql`      |

mod collection;
mod database;
mod entity;
mod query;
mod registry;
mod relationship;
mod schema;
mod through;

// =============================================================================
// Root-level exports
// =============================================================================

pub use collection::{Collection, Positions};
pub use database::{Database, SaveOptions};
pub use entity::{Entity, Related};
pub use query::Query;
pub use registry::Registry;
pub use relationship::{
    Embed, Link, Reconciliation, RelationConfig, RelationDef, RelationKind, RelationType,
    Relationship, ThroughConfig, ThroughInfo,
};
pub use schema::Schema;
pub use through::Through;

/// Result type for chaos operations
pub use chaos_core::error::Result;

/// Error types
pub use chaos_core::error::ChaosError;

pub use chaos_core::{
    Connection, Conventions, DefaultConventions, Dialect, FieldDescriptor, FieldSpec, Key,
    LogicalType, Row, Rows, SQLDialect, Value,
};

// =============================================================================
// Core module - expression compiler and statement builders
// =============================================================================

/// Expression compiler, statement builders and dialect policy.
///
/// ```rust
/// use chaos::core::prelude::*;
/// use chaos::core::{GenericDialect, Select};
///
/// let sql = Select::new()
///     .from("gallery")
///     .r#where(eq(field("id"), 1))
///     .to_sql(&GenericDialect::new())
///     .unwrap();
/// assert_eq!(sql, r#"SELECT * FROM "gallery" WHERE "id" = 1"#);
/// ```
pub mod core {
    pub use chaos_core::{
        Column, ConditionTree, Constraint, ConstraintKind, CreateTable, Delete, DropBehavior,
        DropTable, FieldRef, GenericDialect, Insert, Join, JoinKind, Modifier, Operator, Order,
        OrderBy, ReferentialAction, Select, Source, StatementKind, ToSQL, Token, TypeDef,
        TypeTable, Update,
    };
    pub use chaos_core::{compiler, condition, prelude};
}

// =============================================================================
// Dialect crates
// =============================================================================

#[cfg(feature = "sqlite")]
pub use chaos_sqlite as sqlite;

#[cfg(feature = "postgres")]
pub use chaos_postgres as postgres;

#[cfg(feature = "mysql")]
pub use chaos_mysql as mysql;

pub mod prelude {
    pub use crate::{
        ChaosError, Collection, Connection, Database, Embed, Entity, FieldSpec, Reconciliation,
        Registry, RelationConfig, Result, SaveOptions, Schema, ThroughConfig, Value,
    };
    pub use chaos_core::prelude::*;
}
