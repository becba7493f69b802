use super::{Modifier, Modifiers, StatementKind, ToSQL, modifiers_sql, push_modifier};
use crate::column::Column;
use crate::compiler;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;
use chaos_types::Value;

/// `INSERT` statement builder.
///
/// The first row fixes the column list; every further row must carry the
/// same columns. A row without columns renders `DEFAULT VALUES`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Insert {
    modifiers: Modifiers,
    table: Option<String>,
    rows: Vec<Vec<(String, Value)>>,
    returning: Vec<Column>,
}

impl Insert {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        push_modifier(&mut self.modifiers, modifier);
        self
    }

    /// Appends one row of `(column, value)` pairs.
    #[must_use]
    pub fn values<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.rows.push(
            row.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    #[must_use]
    pub fn returning<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.returning.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        let table = self.table.as_deref().ok_or_else(|| {
            ChaosError::Compile("Invalid `INSERT` statement, missing `INTO` clause.".to_owned())
        })?;
        let first = self.rows.first().ok_or_else(|| {
            ChaosError::Compile("Invalid `INSERT` statement, missing `VALUES` clause.".to_owned())
        })?;

        let mut sql = String::from(Token::INSERT.as_str());
        sql.push_str(&modifiers_sql(dialect, StatementKind::Insert, &self.modifiers)?);
        sql.push(' ');
        sql.push_str(Token::INTO.as_str());
        sql.push(' ');
        sql.push_str(&dialect.escape(table));

        if first.is_empty() {
            if self.rows.len() > 1 {
                return Err(ChaosError::Compile(
                    "Invalid `INSERT` statement, `DEFAULT VALUES` takes a single row.".to_owned(),
                ));
            }
            sql.push(' ');
            sql.push_str(Token::DEFAULT_VALUES.as_str());
        } else {
            let columns: Vec<&str> = first.iter().map(|(name, _)| name.as_str()).collect();
            let mut tuples = Vec::with_capacity(self.rows.len());
            for row in &self.rows {
                tuples.push(tuple(dialect, &columns, row)?);
            }
            let names = columns
                .iter()
                .map(|name| dialect.quote_identifier(name))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(
                " ({}) {} {}",
                names,
                Token::VALUES,
                tuples.join(", ")
            ));
        }

        if !self.returning.is_empty() {
            if !dialect.supports_returning() {
                return Err(ChaosError::Compile(format!(
                    "`RETURNING` is not supported by the `{}` dialect.",
                    dialect.dialect()
                )));
            }
            sql.push(' ');
            sql.push_str(Token::RETURNING.as_str());
            sql.push(' ');
            sql.push_str(&compiler::names(dialect, &self.returning, true)?);
        }

        Ok(sql)
    }
}

/// Renders `(v1, v2, ...)` following the column order of the first row.
fn tuple<D: SQLDialect + ?Sized>(
    dialect: &D,
    columns: &[&str],
    row: &[(String, Value)],
) -> Result<String> {
    if row.len() != columns.len() {
        return Err(ChaosError::Compile(
            "Invalid `INSERT` statement, rows must share the same columns.".to_owned(),
        ));
    }
    let mut values = Vec::with_capacity(columns.len());
    for column in columns {
        let value = row
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .ok_or_else(|| {
                ChaosError::Compile(format!(
                    "Invalid `INSERT` statement, row is missing column `{column}`."
                ))
            })?;
        values.push(dialect.value(value));
    }
    Ok(format!("({})", values.join(", ")))
}

impl ToSQL for Insert {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    #[test]
    fn test_insert() {
        let sql = Insert::new()
            .into("gallery")
            .values([("name", Value::from("Foo")), ("id", Value::from(1))])
            .to_sql(&GenericDialect::new())
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "gallery" ("name", "id") VALUES ('Foo', 1)"#);
    }

    #[test]
    fn test_insert_many_rows_follow_first_row_order() {
        let sql = Insert::new()
            .into("tag")
            .values([("id", 1), ("rank", 2)])
            .values([("rank", 4), ("id", 3)])
            .to_sql(&GenericDialect::new())
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "tag" ("id", "rank") VALUES (1, 2), (3, 4)"#);
    }

    #[test]
    fn test_insert_default_values() {
        let empty: [(&str, Value); 0] = [];
        let sql = Insert::new()
            .into("tag")
            .values(empty)
            .to_sql(&GenericDialect::new())
            .unwrap();
        assert_eq!(sql, r#"INSERT INTO "tag" DEFAULT VALUES"#);
    }

    #[test]
    fn test_insert_errors() {
        let d = GenericDialect::new();
        assert!(Insert::new().values([("a", 1)]).to_sql(&d).is_err());
        assert!(Insert::new().into("t").to_sql(&d).is_err());
        assert!(
            Insert::new()
                .into("t")
                .values([("a", 1)])
                .values([("b", 1)])
                .to_sql(&d)
                .is_err()
        );
        assert!(
            Insert::new()
                .into("t")
                .values([("a", 1)])
                .returning(["id"])
                .to_sql(&d)
                .is_err()
        );
    }
}
