use chaos_core::{Modifier, SQLDialect, StatementKind, Token, TypeDef, TypeTable, Value};
use chaos_types::{Dialect, LogicalType};

/// SQLite rendering policy.
///
/// Booleans are stored as integers and serial keys rely on the implicit
/// `INTEGER PRIMARY KEY` rowid alias, so no keyword is appended.
#[derive(Debug, Clone)]
pub struct SQLiteDialect {
    types: TypeTable,
}

impl SQLiteDialect {
    pub fn new() -> Self {
        let types = TypeTable::base()
            .with(LogicalType::Float, TypeDef::new("real"))
            .with(LogicalType::Decimal, TypeDef::new("numeric").length(10).precision(2))
            .with(LogicalType::Datetime, TypeDef::new("timestamp"));
        Self { types }
    }

    #[must_use]
    pub fn with_type(mut self, name: &str, def: TypeDef) -> Self {
        self.types.insert(name, def);
        self
    }
}

impl Default for SQLiteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SQLDialect for SQLiteDialect {
    fn dialect(&self) -> Dialect {
        Dialect::SQLite
    }

    fn types(&self) -> &TypeTable {
        &self.types
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_modifier(&self, _kind: StatementKind, _modifier: Modifier) -> bool {
        false
    }

    fn value(&self, value: &Value) -> String {
        match value {
            Value::Bool(b) => i64::from(*b).to_string(),
            Value::Null => Token::NULL.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_finite() => f.to_string(),
            Value::Float(_) => Token::NULL.to_string(),
            Value::Text(text) => self.quote(text),
            Value::Binary(bytes) => self.binary(bytes),
            Value::Array(items) => self.array(items),
        }
    }
}
