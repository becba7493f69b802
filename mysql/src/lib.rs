//! MySQL implementation for chaos
//!
//! Provides the MySQL dialect (backtick quoting, `AUTO_INCREMENT` serials,
//! backslash-escaped strings) and extension traits for the MySQL statement
//! modifiers.

pub mod dialect;
pub mod modifiers;

pub use dialect::MySQLDialect;
pub use modifiers::{MySQLDeleteExt, MySQLInsertExt, MySQLSelectExt, MySQLUpdateExt};
