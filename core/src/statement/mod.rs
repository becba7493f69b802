//! Statement builders.
//!
//! Builders consume `self` on every clause call and return the updated
//! builder. Rendering borrows the builder, so it can be repeated and always
//! yields the same text. Missing mandatory clauses are reported at render
//! time, never when clauses are set.

mod create_table;
mod delete;
mod drop_table;
mod insert;
mod select;
mod update;

pub use create_table::CreateTable;
pub use delete::Delete;
pub use drop_table::{DropBehavior, DropTable};
pub use insert::Insert;
pub use select::{Join, JoinKind, Select, Source};
pub use update::Update;

use crate::compiler;
use crate::condition::{ConditionTree, FieldRef};
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;
use smallvec::SmallVec;

/// Anything that renders to one SQL statement.
pub trait ToSQL {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String>;
}

impl<T: ToSQL + ?Sized> ToSQL for &T {
    fn to_sql(&self, dialect: &dyn SQLDialect) -> Result<String> {
        (**self).to_sql(dialect)
    }
}

/// Statement family, used to check modifier support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

/// Statement modifier keyword, rendered in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    LowPriority,
    Delayed,
    HighPriority,
    Quick,
    Ignore,
}

impl Modifier {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Modifier::LowPriority => "LOW_PRIORITY",
            Modifier::Delayed => "DELAYED",
            Modifier::HighPriority => "HIGH_PRIORITY",
            Modifier::Quick => "QUICK",
            Modifier::Ignore => "IGNORE",
        }
    }
}

impl core::fmt::Display for Modifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type Modifiers = SmallVec<[Modifier; 2]>;

pub(crate) fn push_modifier(modifiers: &mut Modifiers, modifier: Modifier) {
    if !modifiers.contains(&modifier) {
        modifiers.push(modifier);
        modifiers.sort();
    }
}

/// Renders `" MOD1 MOD2"` or an empty string.
pub(crate) fn modifiers_sql<D: SQLDialect + ?Sized>(
    dialect: &D,
    kind: StatementKind,
    modifiers: &[Modifier],
) -> Result<String> {
    let mut sql = String::new();
    for modifier in modifiers {
        if !dialect.supports_modifier(kind, *modifier) {
            return Err(ChaosError::Compile(format!(
                "Modifier `{}` is not supported by the `{}` dialect.",
                modifier,
                dialect.dialect()
            )));
        }
        sql.push(' ');
        sql.push_str(modifier.as_str());
    }
    Ok(sql)
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBy {
    #[default]
    Asc,
    Desc,
}

impl OrderBy {
    pub const fn token(&self) -> Token {
        match self {
            OrderBy::Asc => Token::ASC,
            OrderBy::Desc => Token::DESC,
        }
    }
}

/// One `ORDER BY` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub expr: ConditionTree,
    pub direction: OrderBy,
}

impl Order {
    pub fn asc(path: &str) -> Self {
        Self {
            expr: ConditionTree::Field(FieldRef::parse(path)),
            direction: OrderBy::Asc,
        }
    }

    pub fn desc(path: &str) -> Self {
        Self {
            expr: ConditionTree::Field(FieldRef::parse(path)),
            direction: OrderBy::Desc,
        }
    }

    /// Parses `"field"`, `"field ASC"` or `"t.field DESC"`.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.rsplit_once(char::is_whitespace) {
            Some((path, dir)) if dir.eq_ignore_ascii_case("desc") => Self::desc(path.trim()),
            Some((path, dir)) if dir.eq_ignore_ascii_case("asc") => Self::asc(path.trim()),
            _ => Self::asc(input),
        }
    }
}

impl From<&str> for Order {
    fn from(input: &str) -> Self {
        Order::parse(input)
    }
}

impl From<String> for Order {
    fn from(input: String) -> Self {
        Order::parse(&input)
    }
}

impl From<(&str, OrderBy)> for Order {
    fn from((path, direction): (&str, OrderBy)) -> Self {
        Self {
            expr: ConditionTree::Field(FieldRef::parse(path)),
            direction,
        }
    }
}

impl From<(ConditionTree, OrderBy)> for Order {
    fn from((expr, direction): (ConditionTree, OrderBy)) -> Self {
        Self { expr, direction }
    }
}

/// Renders `" ORDER BY ..."` or an empty string.
pub(crate) fn order_sql<D: SQLDialect + ?Sized>(dialect: &D, order: &[Order]) -> Result<String> {
    if order.is_empty() {
        return Ok(String::new());
    }
    let parts = order
        .iter()
        .map(|entry| {
            Ok(format!(
                "{} {}",
                compiler::conditions(dialect, &entry.expr)?,
                entry.direction.token()
            ))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" {} {}", Token::ORDER_BY, parts.join(", ")))
}

/// Renders `" KEYWORD cond"` or an empty string for an empty tree.
pub(crate) fn clause_sql<D: SQLDialect + ?Sized>(
    dialect: &D,
    keyword: Token,
    tree: &ConditionTree,
) -> Result<String> {
    if tree.is_empty() {
        return Ok(String::new());
    }
    let sql = compiler::conditions(dialect, tree)?;
    if sql.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(" {keyword} {sql}"))
}

pub(crate) fn limit_sql(limit: Option<u64>) -> String {
    match limit {
        Some(limit) => format!(" {} {}", Token::LIMIT, limit),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("name"), Order::asc("name"));
        assert_eq!(Order::parse("name DESC"), Order::desc("name"));
        assert_eq!(Order::parse("t.name  desc"), Order::desc("t.name"));
        assert_eq!(Order::parse("name asc"), Order::asc("name"));
    }

    #[test]
    fn test_modifiers_are_ordered_and_unique() {
        let mut modifiers = Modifiers::new();
        push_modifier(&mut modifiers, Modifier::Ignore);
        push_modifier(&mut modifiers, Modifier::LowPriority);
        push_modifier(&mut modifiers, Modifier::Ignore);
        assert_eq!(modifiers.as_slice(), &[Modifier::LowPriority, Modifier::Ignore]);
    }
}
