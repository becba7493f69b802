use super::ToSQL;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;

/// Trailing behavior of `DROP TABLE`; one of the two at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropBehavior {
    Cascade,
    Restrict,
}

/// `DROP TABLE` statement builder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropTable {
    tables: Vec<String>,
    if_exists: bool,
    behavior: Option<DropBehavior>,
}

impl DropTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    #[must_use]
    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    #[must_use]
    pub fn cascade(mut self) -> Self {
        self.behavior = Some(DropBehavior::Cascade);
        self
    }

    #[must_use]
    pub fn restrict(mut self) -> Self {
        self.behavior = Some(DropBehavior::Restrict);
        self
    }

    pub fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        if self.tables.is_empty() {
            return Err(ChaosError::Compile(
                "Invalid `DROP TABLE` statement, missing `TABLE` clause.".to_owned(),
            ));
        }

        let mut sql = format!("{} {}", Token::DROP, Token::TABLE);
        if self.if_exists {
            sql.push(' ');
            sql.push_str(Token::IF_EXISTS.as_str());
        }
        let tables = self
            .tables
            .iter()
            .map(|table| dialect.escape(table))
            .collect::<Vec<_>>();
        sql.push(' ');
        sql.push_str(&tables.join(", "));
        match self.behavior {
            Some(DropBehavior::Cascade) => {
                sql.push(' ');
                sql.push_str(Token::CASCADE.as_str());
            }
            Some(DropBehavior::Restrict) => {
                sql.push(' ');
                sql.push_str(Token::RESTRICT.as_str());
            }
            None => {}
        }
        Ok(sql)
    }
}

impl ToSQL for DropTable {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}
