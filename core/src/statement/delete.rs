use super::{
    Modifier, Modifiers, Order, StatementKind, ToSQL, clause_sql, limit_sql, modifiers_sql,
    order_sql, push_modifier,
};
use crate::condition::ConditionTree;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;

/// `DELETE` statement builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Delete {
    modifiers: Modifiers,
    table: Option<String>,
    conditions: ConditionTree,
    order: Vec<Order>,
    limit: Option<u64>,
}

impl Delete {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        push_modifier(&mut self.modifiers, modifier);
        self
    }

    #[must_use]
    pub fn r#where(mut self, condition: impl Into<ConditionTree>) -> Self {
        self.conditions = core::mem::take(&mut self.conditions).and(condition);
        self
    }

    #[must_use]
    pub fn order<I, O>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Order>,
    {
        self.order.extend(order.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    pub fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        let table = self.table.as_deref().ok_or_else(|| {
            ChaosError::Compile("Invalid `DELETE` statement, missing `FROM` clause.".to_owned())
        })?;

        let mut sql = String::from(Token::DELETE.as_str());
        sql.push_str(&modifiers_sql(dialect, StatementKind::Delete, &self.modifiers)?);
        sql.push(' ');
        sql.push_str(Token::FROM.as_str());
        sql.push(' ');
        sql.push_str(&dialect.escape(table));
        sql.push_str(&clause_sql(dialect, Token::WHERE, &self.conditions)?);
        sql.push_str(&order_sql(dialect, &self.order)?);
        sql.push_str(&limit_sql(self.limit));
        Ok(sql)
    }
}

impl ToSQL for Delete {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}
