//! SQLite implementation for chaos
//!
//! This crate provides the SQLite dialect and, with the `rusqlite` feature,
//! a [`Connection`](chaos_core::Connection) backed by `rusqlite`.

pub mod connection;
pub mod dialect;

pub use connection::SQLiteTransactionType;
#[cfg(feature = "rusqlite")]
pub use connection::SqliteConnection;
pub use dialect::SQLiteDialect;
