//! PostgreSQL implementation for chaos
//!
//! Provides the PostgreSQL dialect: array columns and composite literals,
//! `bytea` binaries, `numeric` decimals and `RETURNING`.

pub mod dialect;

pub use dialect::PostgresDialect;
