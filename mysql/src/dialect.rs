use chaos_core::{Modifier, SQLDialect, StatementKind, TypeDef, TypeTable};
use chaos_types::{Dialect, LogicalType};

/// MySQL rendering policy.
#[derive(Debug, Clone)]
pub struct MySQLDialect {
    types: TypeTable,
}

impl MySQLDialect {
    pub fn new() -> Self {
        let types = TypeTable::base()
            .with(LogicalType::Id, TypeDef::new("int"))
            .with(LogicalType::Serial, TypeDef::new("int").serial())
            .with(LogicalType::Integer, TypeDef::new("int"))
            .with(LogicalType::Datetime, TypeDef::new("datetime"));
        Self { types }
    }

    #[must_use]
    pub fn with_type(mut self, name: &str, def: TypeDef) -> Self {
        self.types.insert(name, def);
        self
    }
}

impl Default for MySQLDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SQLDialect for MySQLDialect {
    fn dialect(&self) -> Dialect {
        Dialect::MySQL
    }

    fn types(&self) -> &TypeTable {
        &self.types
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn supports_modifier(&self, kind: StatementKind, modifier: Modifier) -> bool {
        use Modifier::*;
        match kind {
            StatementKind::Select => matches!(modifier, HighPriority),
            StatementKind::Insert => {
                matches!(modifier, LowPriority | Delayed | HighPriority | Ignore)
            }
            StatementKind::Update => matches!(modifier, LowPriority | Ignore),
            StatementKind::Delete => matches!(modifier, LowPriority | Quick | Ignore),
        }
    }

    fn auto_increment(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }

    /// Backslashes are escape characters in MySQL string literals.
    fn quote(&self, text: &str) -> String {
        format!("'{}'", text.replace('\\', "\\\\").replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaos_core::condition::{eq, field};
    use chaos_core::{FieldSpec, Select, ToSQL, Value};

    #[test]
    fn test_backtick_quoting() {
        let d = MySQLDialect::new();
        assert_eq!(d.escape("t.name"), "`t`.`name`");
        assert_eq!(d.escape("we`ird"), "`we``ird`");
        assert_eq!(
            Select::new()
                .fields(["id"])
                .from("gallery")
                .r#where(eq(field("name"), "a\\b"))
                .to_sql(&d)
                .unwrap(),
            r"SELECT `id` FROM `gallery` WHERE `name` = 'a\\b'"
        );
    }

    #[test]
    fn test_mysql_columns() {
        let d = MySQLDialect::new();
        assert_eq!(
            d.column(&FieldSpec::new("id", "serial").not_null()).unwrap(),
            "`id` int AUTO_INCREMENT NOT NULL"
        );
        assert_eq!(
            d.column(&FieldSpec::new("title", "string").length(32).default("x"))
                .unwrap(),
            "`title` varchar(32) DEFAULT 'x'"
        );
        assert_eq!(
            d.column(&FieldSpec::new("data", "binary")).unwrap(),
            "`data` blob"
        );
        assert_eq!(
            d.column(&FieldSpec::new("at", "datetime").default("CURRENT_TIMESTAMP"))
                .unwrap(),
            "`at` datetime DEFAULT CURRENT_TIMESTAMP"
        );
        assert!(d.column(&FieldSpec::new("ids", "integer").array()).is_err());
    }

    #[test]
    fn test_composite_literal_is_rendered() {
        let d = MySQLDialect::new();
        assert_eq!(d.value(&Value::array([1, 2])), "{1,2}");
    }
}
