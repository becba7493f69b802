use super::{
    Modifier, Modifiers, Order, StatementKind, ToSQL, clause_sql, limit_sql, modifiers_sql,
    order_sql, push_modifier,
};
use crate::compiler;
use crate::condition::ConditionTree;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;
use chaos_types::Value;

/// `UPDATE` statement builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Update {
    modifiers: Modifiers,
    table: Option<String>,
    set: Vec<(String, ConditionTree)>,
    conditions: ConditionTree,
    order: Vec<Order>,
    limit: Option<u64>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        push_modifier(&mut self.modifiers, modifier);
        self
    }

    /// Assigns an expression, e.g. `set("hits", add(field("hits"), 1))`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<ConditionTree>) -> Self {
        self.set.push((column.into(), value.into()));
        self
    }

    /// Assigns literal values.
    #[must_use]
    pub fn values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.set.extend(
            values
                .into_iter()
                .map(|(key, value)| (key.into(), ConditionTree::Value(value.into()))),
        );
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
            ChaosError::Compile("Invalid `UPDATE` statement, missing `TABLE` clause.".to_owned())
        })?;
        if self.set.is_empty() {
            return Err(ChaosError::Compile(
                "Invalid `UPDATE` statement, missing `SET` clause.".to_owned(),
            ));
        }

        let assignments = self
            .set
            .iter()
            .map(|(column, value)| {
                Ok(format!(
                    "{} {} {}",
                    dialect.quote_identifier(column),
                    Token::EQ,
                    compiler::conditions(dialect, value)?
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sql = String::from(Token::UPDATE.as_str());
        sql.push_str(&modifiers_sql(dialect, StatementKind::Update, &self.modifiers)?);
        sql.push(' ');
        sql.push_str(&dialect.escape(table));
        sql.push(' ');
        sql.push_str(Token::SET.as_str());
        sql.push(' ');
        sql.push_str(&assignments.join(", "));
        sql.push_str(&clause_sql(dialect, Token::WHERE, &self.conditions)?);
        sql.push_str(&order_sql(dialect, &self.order)?);
        sql.push_str(&limit_sql(self.limit));
        Ok(sql)
    }
}

impl ToSQL for Update {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}
