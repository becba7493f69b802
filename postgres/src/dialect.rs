use chaos_core::{SQLDialect, TypeDef, TypeTable};
use chaos_types::{Dialect, LogicalType};
use std::fmt::Write;

/// PostgreSQL rendering policy.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    types: TypeTable,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let types = TypeTable::base()
            .with(LogicalType::Serial, TypeDef::new("serial").serial())
            .with(LogicalType::Float, TypeDef::new("real"))
            .with(LogicalType::Decimal, TypeDef::new("numeric").length(10).precision(2))
            .with(LogicalType::Binary, TypeDef::new("bytea"))
            .with(LogicalType::Uuid, TypeDef::new("uuid"));
        Self { types }
    }

    /// Registers an extension type such as `json` or `inet`.
    #[must_use]
    pub fn with_type(mut self, name: &str, def: TypeDef) -> Self {
        self.types.insert(name, def);
        self
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SQLDialect for PostgresDialect {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSQL
    }

    fn types(&self) -> &TypeTable {
        &self.types
    }

    fn supports_arrays(&self) -> bool {
        true
    }

    fn supports_returning(&self) -> bool {
        true
    }

    /// `'\xDEAD'` hex format bytea literal.
    fn binary(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2 + 4);
        out.push_str("'\\x");
        for byte in bytes {
            let _ = write!(out, "{byte:02x}");
        }
        out.push('\'');
        out
    }
}
