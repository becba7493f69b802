//! Shared type definitions for chaos
//!
//! This crate provides the dialect-independent vocabulary used across the
//! chaos crates:
//!
//! - [`Dialect`] - Database dialect identification (Generic, SQLite, PostgreSQL, MySQL)
//! - [`LogicalType`] - Logical column types mapped to native DDL by each dialect
//! - [`Value`] / [`Key`] - Dynamic field values and their hashable projection
//! - [`FieldSpec`] / [`FieldDescriptor`] - Field definitions and introspection output
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization

mod dialect;
mod field;
mod logical;
mod value;

pub use dialect::{Dialect, DialectParseError};
pub use field::{FieldDescriptor, FieldSpec};
pub use logical::LogicalType;
pub use value::{Key, Value};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{Dialect, FieldDescriptor, FieldSpec, Key, LogicalType, Value};
}
