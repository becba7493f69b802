//! Backend rendering policy.
//!
//! A dialect owns identifier quoting, literal formatting and the mapping from
//! logical column types to native DDL. Everything else about SQL generation is
//! shared and lives in [`crate::compiler`] and [`crate::statement`].

mod generic;

pub use generic::GenericDialect;

use crate::compiler;
use crate::ddl::{Constraint, ConstraintKind};
use crate::error::{ChaosError, Result};
use crate::statement::{Modifier, StatementKind};
use crate::token::Token;
use chaos_types::{Dialect, FieldSpec, LogicalType, Value};
use hashbrown::HashMap;
use std::fmt::Write;

/// Native rendering of one logical type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub use_type: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    /// Auto-incrementing integer column
    pub serial: bool,
}

impl TypeDef {
    pub fn new(use_type: impl Into<String>) -> Self {
        Self {
            use_type: use_type.into(),
            length: None,
            precision: None,
            serial: false,
        }
    }

    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub const fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    #[must_use]
    pub const fn serial(mut self) -> Self {
        self.serial = true;
        self
    }
}

/// Logical type name to native type mapping of a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeTable {
    entries: HashMap<String, TypeDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping shared by every dialect unless overridden.
    pub fn base() -> Self {
        Self::new()
            .with(LogicalType::Id, TypeDef::new("integer"))
            .with(LogicalType::Serial, TypeDef::new("integer").serial())
            .with(LogicalType::String, TypeDef::new("varchar").length(255))
            .with(LogicalType::Text, TypeDef::new("text"))
            .with(LogicalType::Integer, TypeDef::new("integer"))
            .with(LogicalType::Float, TypeDef::new("float"))
            .with(
                LogicalType::Decimal,
                TypeDef::new("decimal").length(10).precision(2),
            )
            .with(LogicalType::Boolean, TypeDef::new("boolean"))
            .with(LogicalType::Date, TypeDef::new("date"))
            .with(LogicalType::Time, TypeDef::new("time"))
            .with(LogicalType::Datetime, TypeDef::new("timestamp"))
            .with(LogicalType::Binary, TypeDef::new("blob"))
            .with(LogicalType::Uuid, TypeDef::new("char").length(36))
    }

    #[must_use]
    pub fn with(mut self, name: impl AsRef<str>, def: TypeDef) -> Self {
        self.insert(name, def);
        self
    }

    pub fn insert(&mut self, name: impl AsRef<str>, def: TypeDef) {
        self.entries.insert(name.as_ref().to_owned(), def);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDef> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// Per-backend rendering policy.
///
/// Implementors supply the identity, quote character and type table; quoting,
/// literal formatting and DDL rendering are provided and overridden only where
/// a backend differs.
pub trait SQLDialect: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn types(&self) -> &TypeTable;

    fn quote_char(&self) -> char {
        '"'
    }

    /// Whether array columns (`type[]`) can be declared.
    fn supports_arrays(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_modifier(&self, _kind: StatementKind, _modifier: Modifier) -> bool {
        false
    }

    /// Keyword appended to serial columns, if the backend needs one.
    fn auto_increment(&self) -> Option<&'static str> {
        None
    }

    /// Quotes one identifier segment, doubling embedded quote characters.
    fn quote_identifier(&self, ident: &str) -> String {
        let q = self.quote_char();
        let mut out = String::with_capacity(ident.len() + 2);
        out.push(q);
        for c in ident.chars() {
            if c == q {
                out.push(q);
            }
            out.push(c);
        }
        out.push(q);
        out
    }

    /// Quotes a possibly dotted name; `*` segments stay raw.
    fn escape(&self, name: &str) -> String {
        name.split('.')
            .map(|part| {
                if part == "*" {
                    part.to_owned()
                } else {
                    self.quote_identifier(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// String literal with embedded single quotes doubled.
    fn quote(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    fn binary(&self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2 + 3);
        out.push_str("X'");
        for byte in bytes {
            let _ = write!(out, "{byte:02X}");
        }
        out.push('\'');
        out
    }

    /// Renders a literal value.
    fn value(&self, value: &Value) -> String {
        match value {
            Value::Null => Token::NULL.to_string(),
            Value::Bool(true) => "TRUE".to_owned(),
            Value::Bool(false) => "FALSE".to_owned(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) if f.is_finite() => f.to_string(),
            Value::Float(_) => Token::NULL.to_string(),
            Value::Text(text) => self.quote(text),
            Value::Binary(bytes) => self.binary(bytes),
            Value::Array(items) => self.array(items),
        }
    }

    /// Composite literal `{a,b,c}`; nests, and renders `{}` when empty.
    fn array(&self, items: &[Value]) -> String {
        let mut out = String::from("{");
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                out.push(',');
            }
            match item {
                Value::Array(nested) => out.push_str(&self.array(nested)),
                Value::Text(text) => {
                    out.push('"');
                    out.push_str(&text.replace('\\', "\\\\").replace('"', "\\\""));
                    out.push('"');
                }
                Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                other => out.push_str(&self.value(other)),
            }
        }
        out.push('}');
        out
    }

    /// Column DDL: `"name" type[(len[,prec])][[]] [AUTO_INCREMENT] [NOT NULL] [DEFAULT v]`.
    fn column(&self, field: &FieldSpec) -> Result<String> {
        let def = self.types().get(&field.type_name).ok_or_else(|| {
            ChaosError::Compile(format!("Column type `{}` does not exist.", field.type_name))
        })?;

        let (use_type, length, precision) = match &field.use_type {
            Some(native) => (native.as_str(), field.length, field.precision),
            None => (
                def.use_type.as_str(),
                field.length.or(def.length),
                field.precision.or(def.precision),
            ),
        };

        let mut sql = format!("{} {}", self.quote_identifier(&field.name), use_type);
        match (length, precision) {
            (Some(length), Some(precision)) => {
                let _ = write!(sql, "({length},{precision})");
            }
            (Some(length), None) => {
                let _ = write!(sql, "({length})");
            }
            _ => {}
        }

        if field.array {
            if !self.supports_arrays() {
                return Err(ChaosError::Compile(format!(
                    "Array column `{}` is not supported by the `{}` dialect.",
                    field.name,
                    self.dialect()
                )));
            }
            sql.push_str("[]");
        }

        if def.serial {
            if let Some(keyword) = self.auto_increment() {
                sql.push(' ');
                sql.push_str(keyword);
            }
        }

        if !field.nullable {
            sql.push(' ');
            sql.push_str(Token::NOT_NULL.as_str());
        }

        if let Some(default) = &field.default {
            sql.push(' ');
            sql.push_str(Token::DEFAULT.as_str());
            sql.push(' ');
            sql.push_str(&self.default_value(field, default));
        }

        Ok(sql)
    }

    /// Default clause value; temporal keywords stay unquoted.
    fn default_value(&self, field: &FieldSpec, value: &Value) -> String {
        let temporal = field.logical_type().is_some_and(|ty| ty.is_temporal());
        match value {
            Value::Text(text) if temporal && is_temporal_keyword(text) => text.clone(),
            Value::Array(items) => self.quote(&self.array(items)),
            other => self.value(other),
        }
    }

    /// Table constraint DDL.
    fn constraint(&self, constraint: &Constraint) -> Result<String> {
        let mut sql = String::new();
        if let Some(name) = &constraint.name {
            let _ = write!(sql, "{} {} ", Token::CONSTRAINT, self.quote_identifier(name));
        }
        let list = |columns: &[String]| {
            columns
                .iter()
                .map(|c| self.quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match &constraint.kind {
            ConstraintKind::PrimaryKey(columns) => {
                let _ = write!(sql, "{} ({})", Token::PRIMARY_KEY, list(columns));
            }
            ConstraintKind::Unique(columns) => {
                let _ = write!(sql, "{} ({})", Token::UNIQUE, list(columns));
            }
            ConstraintKind::ForeignKey {
                columns,
                table,
                references,
                on_delete,
                on_update,
            } => {
                let _ = write!(
                    sql,
                    "{} ({}) {} {} ({})",
                    Token::FOREIGN_KEY,
                    list(columns),
                    Token::REFERENCES,
                    self.escape(table),
                    list(references)
                );
                if let Some(action) = on_delete {
                    let _ = write!(sql, " {} {}", Token::ON_DELETE, action);
                }
                if let Some(action) = on_update {
                    let _ = write!(sql, " {} {}", Token::ON_UPDATE, action);
                }
            }
            ConstraintKind::Check(condition) => {
                let _ = write!(
                    sql,
                    "{} ({})",
                    Token::CHECK,
                    compiler::conditions(self, condition)?
                );
            }
        }
        Ok(sql)
    }
}

fn is_temporal_keyword(text: &str) -> bool {
    matches!(
        text.to_ascii_uppercase().as_str(),
        "CURRENT_TIMESTAMP" | "CURRENT_DATE" | "CURRENT_TIME" | "NOW()" | "LOCALTIMESTAMP"
    )
}
