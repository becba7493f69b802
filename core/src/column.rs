//! Selected columns and their friendly JSON shapes.

use crate::condition::{ConditionTree, FieldRef};
use crate::error::{ChaosError, Result};
use crate::statement::Select;
use serde_json::Value as Json;

/// One entry of a column list.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// `"table"."name" AS "alias"`; a name of `*` renders raw
    Field {
        table: Option<String>,
        name: String,
        alias: Option<String>,
    },
    /// Rendered through the condition compiler
    Expr {
        tree: ConditionTree,
        alias: Option<String>,
    },
    /// `(SELECT ...) AS "alias"`
    Subquery { select: Box<Select>, alias: String },
}

impl Column {
    pub fn field(path: &str) -> Self {
        let FieldRef { table, name } = FieldRef::parse(path);
        Column::Field {
            table,
            name,
            alias: None,
        }
    }

    pub fn star() -> Self {
        Column::field("*")
    }

    pub fn expr(tree: impl Into<ConditionTree>) -> Self {
        Column::Expr {
            tree: tree.into(),
            alias: None,
        }
    }

    pub fn subquery(select: Select, alias: impl Into<String>) -> Self {
        Column::Subquery {
            select: Box::new(select),
            alias: alias.into(),
        }
    }

    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Column::Field { table, name, .. } => Column::Field {
                table,
                name,
                alias: Some(alias.into()),
            },
            Column::Expr { tree, .. } => Column::Expr {
                tree,
                alias: Some(alias.into()),
            },
            Column::Subquery { select, .. } => Column::Subquery {
                select,
                alias: alias.into(),
            },
        }
    }

    /// Anchors an unqualified field to `table`.
    #[must_use]
    pub fn in_table(self, prefix: &str) -> Self {
        match self {
            Column::Field {
                table: None,
                name,
                alias,
            } => Column::Field {
                table: Some(prefix.to_owned()),
                name,
                alias,
            },
            other => other,
        }
    }

    /// Field name if this is a plain field reference.
    pub fn name(&self) -> Option<&str> {
        match self {
            Column::Field { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Normalizes a friendly column shape.
    ///
    /// - `"table.field"` is a field
    /// - `{"alias": "table.field"}` aliases a field
    /// - `{"table": ["a", "b"]}` or `{"table": {"alias": "a"}}` prefixes nested fields
    /// - `{":count()": []}`, `{":plain": "sql"}` and other operator keys are expressions
    pub fn from_json(input: &Json) -> Result<Vec<Column>> {
        let mut columns = Vec::new();
        collect(input, &mut columns)?;
        Ok(columns)
    }
}

fn collect(input: &Json, out: &mut Vec<Column>) -> Result<()> {
    match input {
        Json::String(path) => out.push(Column::field(path)),
        Json::Array(items) => {
            for item in items {
                collect(item, out)?;
            }
        }
        Json::Object(map) => {
            for (key, value) in map {
                if key.starts_with(':') {
                    let mut single = serde_json::Map::new();
                    single.insert(key.clone(), value.clone());
                    out.push(Column::expr(ConditionTree::from_json(&Json::Object(single))?));
                    continue;
                }
                match value {
                    Json::String(path) => out.push(Column::field(path).alias(key.as_str())),
                    Json::Array(_) | Json::Object(_) => {
                        let mut nested = Vec::new();
                        collect(value, &mut nested)?;
                        out.extend(nested.into_iter().map(|column| column.in_table(key)));
                    }
                    other => {
                        return Err(ChaosError::Compile(format!(
                            "Unsupported column shape `{other}` under `{key}`."
                        )));
                    }
                }
            }
        }
        other => {
            return Err(ChaosError::Compile(format!(
                "Unsupported column shape `{other}`."
            )));
        }
    }
    Ok(())
}

impl From<&str> for Column {
    fn from(path: &str) -> Self {
        Column::field(path)
    }
}

impl From<String> for Column {
    fn from(path: String) -> Self {
        Column::field(&path)
    }
}

impl From<&String> for Column {
    fn from(path: &String) -> Self {
        Column::field(path)
    }
}

impl From<ConditionTree> for Column {
    fn from(tree: ConditionTree) -> Self {
        Column::expr(tree)
    }
}
