//! Canonical condition trees.
//!
//! Every friendly input shape (JSON mappings, the typed constructors below)
//! normalizes into [`ConditionTree`] before any SQL is compiled. The compiler
//! only ever sees this one representation.

mod json;

use crate::error::{ChaosError, Result};
use crate::statement::Select;
use crate::token::Token;
use chaos_types::Value;
use std::borrow::Cow;

/// A reference to a field, optionally anchored to a table or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub table: Option<String>,
    pub name: String,
}

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Splits `"table.field"` on the last dot; a bare name stays unqualified.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((table, name)) if !table.is_empty() => Self::qualified(table, name),
            _ => Self::new(path),
        }
    }
}

impl core::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Operand count contract of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub const fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Range(min, max) => count >= min && count <= max,
        }
    }
}

impl core::fmt::Display for Arity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

/// Operator tag of an [`ConditionTree::Operator`] node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    Is,
    IsNot,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Not,
    Between,
    NotBetween,
    In,
    NotIn,
    Any,
    Exists,
    NotExists,
    Distinct,
    As,
    /// `:name()` function call, name stored upper-cased
    Function(String),
}

impl Operator {
    /// Parses an operator tag such as `"="`, `":between"` or `":concat()"`.
    pub fn parse(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "=" => Operator::Eq,
            "<>" | "!=" => Operator::Ne,
            "<" => Operator::Lt,
            "<=" => Operator::Le,
            ">" => Operator::Gt,
            ">=" => Operator::Ge,
            "+" => Operator::Add,
            "-" => Operator::Sub,
            "*" => Operator::Mul,
            "/" => Operator::Div,
            ":like" => Operator::Like,
            ":not like" => Operator::NotLike,
            ":is" => Operator::Is,
            ":is not" => Operator::IsNot,
            ":and" => Operator::And,
            ":or" => Operator::Or,
            ":not" => Operator::Not,
            ":between" => Operator::Between,
            ":not between" => Operator::NotBetween,
            ":in" => Operator::In,
            ":not in" => Operator::NotIn,
            ":any" => Operator::Any,
            ":exists" => Operator::Exists,
            ":not exists" => Operator::NotExists,
            ":distinct" => Operator::Distinct,
            ":as" => Operator::As,
            _ => {
                let name = symbol.strip_prefix(':')?.strip_suffix("()")?;
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return None;
                }
                Operator::Function(name.to_ascii_uppercase())
            }
        };
        Some(op)
    }

    /// The tag this operator is written with in friendly input.
    pub fn symbol(&self) -> Cow<'static, str> {
        let symbol = match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Like => ":like",
            Operator::NotLike => ":not like",
            Operator::Is => ":is",
            Operator::IsNot => ":is not",
            Operator::And => ":and",
            Operator::Or => ":or",
            Operator::Not => ":not",
            Operator::Between => ":between",
            Operator::NotBetween => ":not between",
            Operator::In => ":in",
            Operator::NotIn => ":not in",
            Operator::Any => ":any",
            Operator::Exists => ":exists",
            Operator::NotExists => ":not exists",
            Operator::Distinct => ":distinct",
            Operator::As => ":as",
            Operator::Function(name) => {
                return Cow::Owned(format!(":{}()", name.to_ascii_lowercase()));
            }
        };
        Cow::Borrowed(symbol)
    }

    pub const fn arity(&self) -> Arity {
        match self {
            Operator::And | Operator::Or => Arity::AtLeast(0),
            Operator::Not | Operator::Exists | Operator::NotExists => Arity::Exact(1),
            Operator::Any => Arity::Range(1, 2),
            Operator::Distinct => Arity::AtLeast(1),
            Operator::Function(_) => Arity::AtLeast(0),
            _ => Arity::Exact(2),
        }
    }

    /// Token for operators rendered infix as `lhs SYM rhs`.
    pub(crate) const fn binary_token(&self) -> Option<Token> {
        let token = match self {
            Operator::Eq => Token::EQ,
            Operator::Ne => Token::NE,
            Operator::Lt => Token::LT,
            Operator::Le => Token::LE,
            Operator::Gt => Token::GT,
            Operator::Ge => Token::GE,
            Operator::Add => Token::PLUS,
            Operator::Sub => Token::MINUS,
            Operator::Mul => Token::STAR_OP,
            Operator::Div => Token::SLASH,
            Operator::Like => Token::LIKE,
            Operator::NotLike => Token::NOT_LIKE,
            Operator::Is => Token::IS,
            Operator::IsNot => Token::IS_NOT,
            _ => return None,
        };
        Some(token)
    }

    pub(crate) const fn is_conjunction(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

/// Canonical structured boolean/comparison expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTree {
    /// Literal value; arrays render as composite literals
    Value(Value),
    /// Field reference, quoted on render
    Field(FieldRef),
    /// Operator applied to an ordered operand list
    Operator(Operator, Vec<ConditionTree>),
    /// Verbatim SQL text
    Raw(String),
    /// Nested SELECT, rendered parenthesized
    Subquery(Box<Select>),
}

impl ConditionTree {
    /// Builds an operator node, enforcing its arity contract.
    pub fn operator(op: Operator, operands: Vec<ConditionTree>) -> Result<Self> {
        let arity = op.arity();
        if !arity.accepts(operands.len()) {
            return Err(ChaosError::Compile(format!(
                "Operator `{}` expects {} operands, got {}.",
                op.symbol(),
                arity,
                operands.len()
            )));
        }
        Ok(ConditionTree::Operator(op, operands))
    }

    /// Normalizes a friendly JSON condition into a canonical tree.
    ///
    /// ```
    /// use chaos_core::condition::ConditionTree;
    /// use serde_json::json;
    ///
    /// let tree = ConditionTree::from_json(&json!({"field1": "value", "field2": 10})).unwrap();
    /// assert!(matches!(tree, ConditionTree::Operator(_, ref operands) if operands.len() == 2));
    /// ```
    pub fn from_json(input: &serde_json::Value) -> Result<Self> {
        json::condition(input)
    }

    /// An `AND` with no operands renders to nothing and is skipped by statements.
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionTree::Operator(op, operands) if op.is_conjunction() => {
                operands.iter().all(ConditionTree::is_empty)
            }
            _ => false,
        }
    }

    /// Conjoins two trees, flattening nested `AND`s.
    #[must_use]
    pub fn and(self, other: impl Into<ConditionTree>) -> Self {
        let other = other.into();
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let mut operands = match self {
            ConditionTree::Operator(Operator::And, operands) => operands,
            tree => vec![tree],
        };
        match other {
            ConditionTree::Operator(Operator::And, more) => operands.extend(more),
            tree => operands.push(tree),
        }
        ConditionTree::Operator(Operator::And, operands)
    }
}

impl Default for ConditionTree {
    fn default() -> Self {
        ConditionTree::Operator(Operator::And, Vec::new())
    }
}

impl From<Value> for ConditionTree {
    fn from(value: Value) -> Self {
        ConditionTree::Value(value)
    }
}

impl From<FieldRef> for ConditionTree {
    fn from(field: FieldRef) -> Self {
        ConditionTree::Field(field)
    }
}

impl From<Select> for ConditionTree {
    fn from(select: Select) -> Self {
        ConditionTree::Subquery(Box::new(select))
    }
}

macro_rules! impl_from_literal {
    ($($ty:ty),*) => { $(
        impl From<$ty> for ConditionTree {
            fn from(value: $ty) -> Self {
                ConditionTree::Value(Value::from(value))
            }
        }
    )* }
}

impl_from_literal!(i32, i64, u32, f64, bool, &str, String);

//------------------------------------------------------------------------------
// Constructors
//------------------------------------------------------------------------------

/// Field reference from a `"table.field"` or bare `"field"` path.
pub fn field(path: &str) -> ConditionTree {
    ConditionTree::Field(FieldRef::parse(path))
}

pub fn value(value: impl Into<Value>) -> ConditionTree {
    ConditionTree::Value(value.into())
}

pub fn raw(sql: impl Into<String>) -> ConditionTree {
    ConditionTree::Raw(sql.into())
}

fn binary(op: Operator, left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    ConditionTree::Operator(op, vec![left.into(), right.into()])
}

pub fn eq(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Eq, left, right)
}

pub fn neq(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Ne, left, right)
}

pub fn gt(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Gt, left, right)
}

pub fn gte(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Ge, left, right)
}

pub fn lt(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Lt, left, right)
}

pub fn lte(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Le, left, right)
}

pub fn like(left: impl Into<ConditionTree>, pattern: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Like, left, pattern)
}

pub fn add(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Add, left, right)
}

pub fn sub(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Sub, left, right)
}

pub fn mul(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Mul, left, right)
}

pub fn div(left: impl Into<ConditionTree>, right: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Div, left, right)
}

pub fn is_null(left: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::Is, left, Value::Null)
}

pub fn is_not_null(left: impl Into<ConditionTree>) -> ConditionTree {
    binary(Operator::IsNot, left, Value::Null)
}

/// `left BETWEEN low AND high`
pub fn between(left: impl Into<ConditionTree>, low: impl Into<Value>, high: impl Into<Value>) -> ConditionTree {
    binary(Operator::Between, left, Value::Array(vec![low.into(), high.into()]))
}

pub fn not_between(
    left: impl Into<ConditionTree>,
    low: impl Into<Value>,
    high: impl Into<Value>,
) -> ConditionTree {
    binary(Operator::NotBetween, left, Value::Array(vec![low.into(), high.into()]))
}

/// `left IN (v1, v2, ...)`; an empty list renders `IN (NULL)`.
pub fn in_list<I, T>(left: impl Into<ConditionTree>, values: I) -> ConditionTree
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    binary(Operator::In, left, Value::array(values))
}

pub fn not_in_list<I, T>(left: impl Into<ConditionTree>, values: I) -> ConditionTree
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    binary(Operator::NotIn, left, Value::array(values))
}

pub fn in_subquery(left: impl Into<ConditionTree>, select: Select) -> ConditionTree {
    binary(Operator::In, left, select)
}

/// `ANY (subquery-or-raw)`, meant as the right-hand side of a comparison.
pub fn any(source: impl Into<ConditionTree>) -> ConditionTree {
    ConditionTree::Operator(Operator::Any, vec![source.into()])
}

pub fn exists(select: Select) -> ConditionTree {
    ConditionTree::Operator(Operator::Exists, vec![select.into()])
}

pub fn not_exists(select: Select) -> ConditionTree {
    ConditionTree::Operator(Operator::NotExists, vec![select.into()])
}

pub fn and<I>(operands: I) -> ConditionTree
where
    I: IntoIterator<Item = ConditionTree>,
{
    ConditionTree::Operator(Operator::And, operands.into_iter().collect())
}

pub fn or<I>(operands: I) -> ConditionTree
where
    I: IntoIterator<Item = ConditionTree>,
{
    ConditionTree::Operator(Operator::Or, operands.into_iter().collect())
}

pub fn not(operand: impl Into<ConditionTree>) -> ConditionTree {
    ConditionTree::Operator(Operator::Not, vec![operand.into()])
}

/// `NAME(arg1, arg2, ...)`
pub fn func<I>(name: &str, args: I) -> ConditionTree
where
    I: IntoIterator<Item = ConditionTree>,
{
    ConditionTree::Operator(
        Operator::Function(name.to_ascii_uppercase()),
        args.into_iter().collect(),
    )
}

/// `expr AS "alias"`
pub fn alias(expr: impl Into<ConditionTree>, alias: &str) -> ConditionTree {
    ConditionTree::Operator(Operator::As, vec![expr.into(), field(alias)])
}
