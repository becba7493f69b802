use super::{
    Modifier, Modifiers, Order, StatementKind, ToSQL, clause_sql, limit_sql, modifiers_sql,
    order_sql, push_modifier,
};
use crate::column::Column;
use crate::compiler;
use crate::condition::ConditionTree;
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;

/// A `FROM` or `JOIN` source.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Table { name: String, alias: Option<String> },
    Subquery { select: Box<Select>, alias: String },
}

impl Source {
    pub fn table(name: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Source::Table {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn subquery(select: Select, alias: impl Into<String>) -> Self {
        Source::Subquery {
            select: Box::new(select),
            alias: alias.into(),
        }
    }

    fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        Ok(match self {
            Source::Table { name, alias: None } => dialect.escape(name),
            Source::Table {
                name,
                alias: Some(alias),
            } => format!(
                "{} {} {}",
                dialect.escape(name),
                Token::AS,
                dialect.quote_identifier(alias)
            ),
            Source::Subquery { select, alias } => format!(
                "({}) {} {}",
                select.render(dialect)?,
                Token::AS,
                dialect.quote_identifier(alias)
            ),
        })
    }
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::table(name)
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::table(name)
    }
}

impl From<(&str, &str)> for Source {
    fn from((name, alias): (&str, &str)) -> Self {
        Source::aliased(name, alias)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
}

impl JoinKind {
    const fn token(&self) -> Token {
        match self {
            JoinKind::Inner => Token::INNER_JOIN,
            JoinKind::Left => Token::LEFT_JOIN,
            JoinKind::Right => Token::RIGHT_JOIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub source: Source,
    pub on: ConditionTree,
}

/// `SELECT` statement builder.
///
/// ```
/// use chaos_core::{GenericDialect, Select, ToSQL};
/// use chaos_core::condition::{eq, field};
///
/// let sql = Select::new()
///     .fields(["id", "name"])
///     .from("gallery")
///     .r#where(eq(field("id"), 1))
///     .order(["name"])
///     .limit(10)
///     .to_sql(&GenericDialect::new())
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     r#"SELECT "id", "name" FROM "gallery" WHERE "id" = 1 ORDER BY "name" ASC LIMIT 10"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    distinct: bool,
    modifiers: Modifiers,
    fields: Vec<Column>,
    from: Vec<Source>,
    joins: Vec<Join>,
    conditions: ConditionTree,
    group: Vec<Column>,
    having: ConditionTree,
    order: Vec<Order>,
    limit: Option<u64>,
    offset: Option<u64>,
    for_update: bool,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        push_modifier(&mut self.modifiers, modifier);
        self
    }

    /// Appends selected columns; no columns means `*`.
    #[must_use]
    pub fn fields<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.fields.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn clear_fields(mut self) -> Self {
        self.fields.clear();
        self
    }

    #[must_use]
    pub fn from(mut self, source: impl Into<Source>) -> Self {
        self.from.push(source.into());
        self
    }

    #[must_use]
    pub fn join(self, source: impl Into<Source>, on: impl Into<ConditionTree>) -> Self {
        self.join_kind(JoinKind::Inner, source, on)
    }

    #[must_use]
    pub fn left_join(self, source: impl Into<Source>, on: impl Into<ConditionTree>) -> Self {
        self.join_kind(JoinKind::Left, source, on)
    }

    #[must_use]
    pub fn right_join(self, source: impl Into<Source>, on: impl Into<ConditionTree>) -> Self {
        self.join_kind(JoinKind::Right, source, on)
    }

    fn join_kind(
        mut self,
        kind: JoinKind,
        source: impl Into<Source>,
        on: impl Into<ConditionTree>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            source: source.into(),
            on: on.into(),
        });
        self
    }

    /// AND-accumulates a condition.
    #[must_use]
    pub fn r#where(mut self, condition: impl Into<ConditionTree>) -> Self {
        self.conditions = core::mem::take(&mut self.conditions).and(condition);
        self
    }

    #[must_use]
    pub fn group<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.group.extend(columns.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn having(mut self, condition: impl Into<ConditionTree>) -> Self {
        self.having = core::mem::take(&mut self.having).and(condition);
        self
    }

    /// Appends sort entries; an empty list is a no-op.
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
    pub fn clear_order(mut self) -> Self {
        self.order.clear();
        self
    }

    /// Sets `LIMIT`; zero unsets it.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Sets `OFFSET`, rendered only together with a limit.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = (offset > 0).then_some(offset);
        self
    }

    /// One-based page of `limit` rows; call after [`Select::limit`].
    #[must_use]
    pub fn page(self, page: u64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(self.limit.unwrap_or(0));
        self.offset(offset)
    }

    #[must_use]
    pub fn for_update(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }

    pub fn conditions(&self) -> &ConditionTree {
        &self.conditions
    }

    pub fn columns(&self) -> &[Column] {
        &self.fields
    }

    pub fn sources(&self) -> &[Source] {
        &self.from
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    /// Renders the statement.
    pub fn render<D: SQLDialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        if self.from.is_empty() {
            return Err(ChaosError::Compile(
                "Invalid `SELECT` statement, missing `FROM` clause.".to_owned(),
            ));
        }

        let mut sql = String::from(Token::SELECT.as_str());
        if self.distinct {
            sql.push(' ');
            sql.push_str(Token::DISTINCT.as_str());
        }
        sql.push_str(&modifiers_sql(dialect, StatementKind::Select, &self.modifiers)?);

        sql.push(' ');
        if self.fields.is_empty() {
            sql.push_str(Token::STAR.as_str());
        } else {
            sql.push_str(&compiler::names(dialect, &self.fields, true)?);
        }

        let sources = self
            .from
            .iter()
            .map(|source| source.render(dialect))
            .collect::<Result<Vec<_>>>()?;
        sql.push(' ');
        sql.push_str(Token::FROM.as_str());
        sql.push(' ');
        sql.push_str(&sources.join(", "));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join.kind.token().as_str());
            sql.push(' ');
            sql.push_str(&join.source.render(dialect)?);
            sql.push_str(&clause_sql(dialect, Token::ON, &join.on)?);
        }

        sql.push_str(&clause_sql(dialect, Token::WHERE, &self.conditions)?);

        if !self.group.is_empty() {
            sql.push(' ');
            sql.push_str(Token::GROUP_BY.as_str());
            sql.push(' ');
            sql.push_str(&compiler::names(dialect, &self.group, false)?);
        }

        sql.push_str(&clause_sql(dialect, Token::HAVING, &self.having)?);
        sql.push_str(&order_sql(dialect, &self.order)?);
        sql.push_str(&limit_sql(self.limit));

        if let (Some(_), Some(offset)) = (self.limit, self.offset) {
            sql.push(' ');
            sql.push_str(Token::OFFSET.as_str());
            sql.push(' ');
            sql.push_str(&offset.to_string());
        }

        if self.for_update {
            sql.push(' ');
            sql.push_str(Token::FOR_UPDATE.as_str());
        }

        Ok(sql)
    }
}

impl ToSQL for Select {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        self.render(dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::*;
    use crate::dialect::GenericDialect;
    use crate::statement::OrderBy;

    #[test]
    fn test_missing_from() {
        let err = Select::new().to_sql(&GenericDialect::new()).unwrap_err();
        assert!(matches!(err, ChaosError::Compile(ref msg) if msg.contains("`FROM`")));
    }

    #[test]
    fn test_select_star() {
        let sql = Select::new().from("table").to_sql(&GenericDialect::new()).unwrap();
        assert_eq!(sql, r#"SELECT * FROM "table""#);
    }

    #[test]
    fn test_idempotent_rendering() {
        let d = GenericDialect::new();
        let select = Select::new()
            .fields(["a"])
            .from("t")
            .r#where(eq(field("a"), 1))
            .order(["a DESC"]);
        assert_eq!(select.to_sql(&d).unwrap(), select.to_sql(&d).unwrap());
    }

    #[test]
    fn test_order_accumulates_and_empty_is_noop() {
        let d = GenericDialect::new();
        let none: [&str; 0] = [];
        let sql = Select::new()
            .from("t")
            .order(["a"])
            .order(none)
            .order([("b", OrderBy::Desc)])
            .to_sql(&d)
            .unwrap();
        assert_eq!(sql, r#"SELECT * FROM "t" ORDER BY "a" ASC, "b" DESC"#);
    }

    #[test]
    fn test_limit_zero_and_offset() {
        let d = GenericDialect::new();
        assert_eq!(
            Select::new().from("t").limit(0).offset(5).to_sql(&d).unwrap(),
            r#"SELECT * FROM "t""#
        );
        assert_eq!(
            Select::new().from("t").limit(10).page(3).to_sql(&d).unwrap(),
            r#"SELECT * FROM "t" LIMIT 10 OFFSET 20"#
        );
    }

    #[test]
    fn test_full_clause_order() {
        let d = GenericDialect::new();
        let sql = Select::new()
            .distinct(true)
            .fields(["g.id", "g.name"])
            .fields([alias(func("count", [field("i.id")]), "images")])
            .from(("gallery", "g"))
            .left_join(("image", "i"), eq(field("i.gallery_id"), field("g.id")))
            .r#where(gt(field("g.id"), 0))
            .r#where(neq(field("g.name"), "x"))
            .group(["g.id", "g.name"])
            .having(gt(func("count", [field("i.id")]), 1))
            .order(["g.name"])
            .limit(5)
            .offset(5)
            .for_update(true)
            .to_sql(&d)
            .unwrap();
        assert_eq!(
            sql,
            concat!(
                r#"SELECT DISTINCT "g"."id", "g"."name", COUNT("i"."id") AS "images" "#,
                r#"FROM "gallery" AS "g" LEFT JOIN "image" AS "i" ON "i"."gallery_id" = "g"."id" "#,
                r#"WHERE "g"."id" > 0 AND "g"."name" <> 'x' "#,
                r#"GROUP BY "g"."id", "g"."name" HAVING COUNT("i"."id") > 1 "#,
                r#"ORDER BY "g"."name" ASC LIMIT 5 OFFSET 5 FOR UPDATE"#
            )
        );
    }

    #[test]
    fn test_subquery_source() {
        let d = GenericDialect::new();
        let inner = Select::new().fields(["id"]).from("image");
        let sql = Select::new()
            .from(Source::subquery(inner, "sub"))
            .to_sql(&d)
            .unwrap();
        assert_eq!(sql, r#"SELECT * FROM (SELECT "id" FROM "image") AS "sub""#);
    }

    #[test]
    fn test_unsupported_modifier() {
        let err = Select::new()
            .from("t")
            .modifier(Modifier::HighPriority)
            .to_sql(&GenericDialect::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Compile error: Modifier `HIGH_PRIORITY` is not supported by the `generic` dialect."
        );
    }
}
