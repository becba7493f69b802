use super::ToSQL;
use crate::ddl::Constraint;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;
use chaos_types::FieldSpec;

/// `CREATE TABLE` statement builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateTable {
    table: Option<String>,
    if_not_exists: bool,
    columns: Vec<FieldSpec>,
    constraints: Vec<Constraint>,
}

impl CreateTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    #[must_use]
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = FieldSpec>,
    {
        self.columns.extend(columns);
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        let table = self.table.as_deref().ok_or_else(|| {
            ChaosError::Compile(
                "Invalid `CREATE TABLE` statement, missing `TABLE` clause.".to_owned(),
            )
        })?;
        if self.columns.is_empty() {
            return Err(ChaosError::Compile(format!(
                "Invalid `CREATE TABLE` statement, `{table}` has no columns."
            )));
        }

        let mut parts = Vec::with_capacity(self.columns.len() + self.constraints.len());
        for column in &self.columns {
            parts.push(dialect.column(column)?);
        }
        for constraint in &self.constraints {
            parts.push(dialect.constraint(constraint)?);
        }

        let mut sql = format!("{} {}", Token::CREATE, Token::TABLE);
        if self.if_not_exists {
            sql.push(' ');
            sql.push_str(Token::IF_NOT_EXISTS.as_str());
        }
        sql.push(' ');
        sql.push_str(&dialect.escape(table));
        sql.push_str(" (");
        sql.push_str(&parts.join(", "));
        sql.push(')');
        Ok(sql)
    }
}

impl ToSQL for CreateTable {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    #[test]
    fn test_create_table() {
        let sql = CreateTable::new()
            .table("gallery")
            .if_not_exists(true)
            .columns([
                FieldSpec::new("id", "serial").not_null(),
                FieldSpec::new("name", "string").length(64),
            ])
            .constraint(Constraint::primary_key(["id"]))
            .to_sql(&GenericDialect::new())
            .unwrap();
        assert_eq!(
            sql,
            r#"CREATE TABLE IF NOT EXISTS "gallery" ("id" integer NOT NULL, "name" varchar(64), PRIMARY KEY ("id"))"#
        );
    }

    #[test]
    fn test_create_table_reports_unknown_type() {
        let err = CreateTable::new()
            .table("t")
            .columns([FieldSpec::new("x", "money")])
            .to_sql(&GenericDialect::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Compile error: Column type `money` does not exist.");
    }
}
