//! Normalization of friendly JSON conditions into canonical trees.
//!
//! Accepted shapes:
//! - `{"field": scalar}` -> `"field" = scalar`, `null` -> `IS NULL`, array -> `IN (...)`
//! - `{"field": {">": 10, "<": 20}}` -> one comparison per operator key
//! - `{":op": [operand, ...]}` -> operator node; a single non-array operand is allowed
//! - operand objects `{":name": "t.f"}`, `{":value": v}`, `{":plain": "sql"}`
//! - adjacent mapping keys are conjoined with `AND`

use super::{ConditionTree, FieldRef, Operator};
use crate::error::{ChaosError, Result};
use chaos_types::Value;
use serde_json::{Map, Value as Json};

pub(super) fn condition(input: &Json) -> Result<ConditionTree> {
    match input {
        Json::Object(map) => mapping(map),
        Json::Array(items) => {
            let operands = items.iter().map(condition).collect::<Result<Vec<_>>>()?;
            Ok(conjoin(operands))
        }
        Json::String(sql) => Ok(ConditionTree::Raw(sql.clone())),
        other => Err(ChaosError::Compile(format!(
            "Unsupported condition `{other}`, expected a mapping."
        ))),
    }
}

fn conjoin(mut operands: Vec<ConditionTree>) -> ConditionTree {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        ConditionTree::Operator(Operator::And, operands)
    }
}

fn mapping(map: &Map<String, Json>) -> Result<ConditionTree> {
    let mut operands = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(leaf) = leaf(key, value)? {
            operands.push(leaf);
        } else if key.starts_with(':') || Operator::parse(key).is_some() {
            let op = parse_operator(key)?;
            let args = match value {
                Json::Array(items) => items.iter().map(operand).collect::<Result<Vec<_>>>()?,
                single => vec![operand(single)?],
            };
            operands.push(ConditionTree::operator(op, args)?);
        } else {
            operands.push(field_condition(FieldRef::parse(key), value)?);
        }
    }
    Ok(conjoin(operands))
}

/// Leaf tags: `:name`, `:value`, `:plain`.
fn leaf(key: &str, value: &Json) -> Result<Option<ConditionTree>> {
    let tree = match key {
        ":name" => match value {
            Json::String(path) => ConditionTree::Field(FieldRef::parse(path)),
            other => {
                return Err(ChaosError::Compile(format!(
                    "Operator `:name` expects a string, got `{other}`."
                )));
            }
        },
        ":value" => ConditionTree::Value(literal(value)?),
        ":plain" => match value {
            Json::String(sql) => ConditionTree::Raw(sql.clone()),
            other => ConditionTree::Raw(other.to_string()),
        },
        _ => return Ok(None),
    };
    Ok(Some(tree))
}

fn parse_operator(key: &str) -> Result<Operator> {
    Operator::parse(key)
        .ok_or_else(|| ChaosError::Compile(format!("Unsupported operator `{key}`.")))
}

fn operand(input: &Json) -> Result<ConditionTree> {
    match input {
        Json::Object(map) => mapping(map),
        other => Ok(ConditionTree::Value(literal(other)?)),
    }
}

fn field_condition(field: FieldRef, value: &Json) -> Result<ConditionTree> {
    let lhs = ConditionTree::Field(field);
    match value {
        Json::Null => Ok(ConditionTree::Operator(
            Operator::Is,
            vec![lhs, ConditionTree::Value(Value::Null)],
        )),
        Json::Array(_) => Ok(ConditionTree::Operator(
            Operator::In,
            vec![lhs, ConditionTree::Value(literal(value)?)],
        )),
        Json::Object(map) if map.keys().all(|key| Operator::parse(key).is_some()) => {
            let mut operands = Vec::with_capacity(map.len());
            for (key, rhs) in map {
                let op = parse_operator(key)?;
                operands.push(ConditionTree::operator(op, vec![lhs.clone(), operand(rhs)?])?);
            }
            Ok(conjoin(operands))
        }
        Json::Object(map) => Ok(ConditionTree::Operator(
            Operator::Eq,
            vec![lhs, mapping(map)?],
        )),
        scalar => Ok(ConditionTree::Operator(
            Operator::Eq,
            vec![lhs, ConditionTree::Value(literal(scalar)?)],
        )),
    }
}

/// Converts a JSON scalar or array into a literal value.
pub(crate) fn literal(input: &Json) -> Result<Value> {
    Ok(match input {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Text(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(literal).collect::<Result<_>>()?),
        Json::Object(_) => {
            return Err(ChaosError::Compile(format!(
                "Unsupported literal `{input}`, objects are not values."
            )));
        }
    })
}
