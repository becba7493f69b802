//! Expression compiler.
//!
//! Renders column lists and condition trees to SQL text. Backend-specific
//! formatting (quoting, literals) is delegated to the active [`SQLDialect`].

use crate::column::Column;
use crate::condition::{ConditionTree, FieldRef, Operator};
use crate::dialect::SQLDialect;
use crate::error::{ChaosError, Result};
use crate::token::Token;
use chaos_types::Value;
use hashbrown::HashSet;

/// Renders a quoted, optionally table-qualified field reference.
pub fn field<D: SQLDialect + ?Sized>(dialect: &D, field: &FieldRef) -> String {
    let name = if field.name == "*" {
        Token::STAR.as_str().to_owned()
    } else {
        dialect.quote_identifier(&field.name)
    };
    match &field.table {
        Some(table) => format!("{}.{}", dialect.escape(table), name),
        None => name,
    }
}

/// Renders a column list as a comma separated fragment.
///
/// Identical entries are emitted once, in first-seen order. A `*` field is
/// rejected unless `star_allowed` is set.
pub fn names<D: SQLDialect + ?Sized>(
    dialect: &D,
    columns: &[Column],
    star_allowed: bool,
) -> Result<String> {
    let mut seen = HashSet::with_capacity(columns.len());
    let mut parts = Vec::with_capacity(columns.len());

    for column in columns {
        let sql = match column {
            Column::Field { table, name, alias } => {
                if name == "*" && !star_allowed {
                    return Err(ChaosError::Compile(
                        "Star selection `*` is not allowed in this context.".to_owned(),
                    ));
                }
                let mut sql = field(
                    dialect,
                    &FieldRef {
                        table: table.clone(),
                        name: name.clone(),
                    },
                );
                if let Some(alias) = alias {
                    sql = aliased(dialect, sql, alias);
                }
                sql
            }
            Column::Expr { tree, alias } => {
                let sql = conditions(dialect, tree)?;
                match alias {
                    Some(alias) => aliased(dialect, sql, alias),
                    None => sql,
                }
            }
            Column::Subquery { select, alias } => {
                aliased(dialect, format!("({})", select.render(dialect)?), alias)
            }
        };
        if seen.insert(sql.clone()) {
            parts.push(sql);
        }
    }

    Ok(parts.join(", "))
}

fn aliased<D: SQLDialect + ?Sized>(dialect: &D, sql: String, alias: &str) -> String {
    format!("{} {} {}", sql, Token::AS, dialect.quote_identifier(alias))
}

/// Renders a condition tree.
///
/// An empty conjunction renders as an empty string.
pub fn conditions<D: SQLDialect + ?Sized>(dialect: &D, tree: &ConditionTree) -> Result<String> {
    match tree {
        ConditionTree::Value(value) => Ok(dialect.value(value)),
        ConditionTree::Field(f) => Ok(field(dialect, f)),
        ConditionTree::Raw(sql) => Ok(sql.clone()),
        ConditionTree::Subquery(select) => Ok(format!("({})", select.render(dialect)?)),
        ConditionTree::Operator(op, operands) => operator(dialect, op, operands),
    }
}

fn operator<D: SQLDialect + ?Sized>(
    dialect: &D,
    op: &Operator,
    operands: &[ConditionTree],
) -> Result<String> {
    let arity = op.arity();
    if !arity.accepts(operands.len()) {
        return Err(ChaosError::Compile(format!(
            "Operator `{}` expects {} operands, got {}.",
            op.symbol(),
            arity,
            operands.len()
        )));
    }

    if let Some(token) = op.binary_token() {
        return Ok(format!(
            "{} {} {}",
            operand(dialect, &operands[0])?,
            token,
            operand(dialect, &operands[1])?
        ));
    }

    match op {
        Operator::And | Operator::Or => {
            let token = if *op == Operator::And { Token::AND } else { Token::OR };
            let mut parts = Vec::with_capacity(operands.len());
            for item in operands {
                let sql = operand(dialect, item)?;
                if !sql.is_empty() {
                    parts.push(sql);
                }
            }
            Ok(parts.join(&format!(" {token} ")))
        }
        Operator::Not => Ok(format!("{} ({})", Token::NOT, conditions(dialect, &operands[0])?)),
        Operator::Between | Operator::NotBetween => {
            let token = if *op == Operator::Between {
                Token::BETWEEN
            } else {
                Token::NOT_BETWEEN
            };
            let (low, high) = match &operands[1] {
                ConditionTree::Value(Value::Array(bounds)) if bounds.len() == 2 => {
                    (dialect.value(&bounds[0]), dialect.value(&bounds[1]))
                }
                _ => {
                    return Err(ChaosError::Compile(format!(
                        "Operator `{}` expects a pair of bounds.",
                        op.symbol()
                    )));
                }
            };
            Ok(format!(
                "{} {} {} {} {}",
                operand(dialect, &operands[0])?,
                token,
                low,
                Token::AND,
                high
            ))
        }
        Operator::In | Operator::NotIn => {
            let token = if *op == Operator::In { Token::IN } else { Token::NOT_IN };
            Ok(format!(
                "{} {} ({})",
                operand(dialect, &operands[0])?,
                token,
                list(dialect, &operands[1])?
            ))
        }
        Operator::Any => match operands {
            [source] => Ok(format!("{} ({})", Token::ANY, inner(dialect, source)?)),
            [lhs, source] => Ok(format!(
                "{} {} ({})",
                operand(dialect, lhs)?,
                Token::ANY,
                inner(dialect, source)?
            )),
            _ => Err(ChaosError::Compile(
                "Operator `:any` expects 1 to 2 operands.".to_owned(),
            )),
        },
        Operator::Exists | Operator::NotExists => {
            let token = if *op == Operator::Exists {
                Token::EXISTS
            } else {
                Token::NOT_EXISTS
            };
            Ok(format!("{} ({})", token, inner(dialect, &operands[0])?))
        }
        Operator::Distinct => Ok(format!(
            "{} {}",
            Token::DISTINCT,
            arguments(dialect, operands)?
        )),
        Operator::As => {
            let alias = match &operands[1] {
                ConditionTree::Field(f) => dialect.quote_identifier(&f.name),
                ConditionTree::Value(Value::Text(name)) => dialect.quote_identifier(name),
                other => conditions(dialect, other)?,
            };
            Ok(format!(
                "{} {} {}",
                operand(dialect, &operands[0])?,
                Token::AS,
                alias
            ))
        }
        Operator::Function(name) => {
            if operands.is_empty() && name == "COUNT" {
                return Ok(format!("{name}({})", Token::STAR));
            }
            Ok(format!("{name}({})", arguments(dialect, operands)?))
        }
        _ => Err(ChaosError::Compile(format!(
            "Operator `{}` cannot be rendered.",
            op.symbol()
        ))),
    }
}

/// Renders an operand, parenthesizing nested multi-part conjunctions.
fn operand<D: SQLDialect + ?Sized>(dialect: &D, tree: &ConditionTree) -> Result<String> {
    let sql = conditions(dialect, tree)?;
    match tree {
        ConditionTree::Operator(op, operands)
            if op.is_conjunction() && operands.iter().filter(|o| !o.is_empty()).count() > 1 =>
        {
            Ok(format!("({sql})"))
        }
        _ => Ok(sql),
    }
}

/// Contents of a parenthesized subquery slot, without the parentheses.
fn inner<D: SQLDialect + ?Sized>(dialect: &D, tree: &ConditionTree) -> Result<String> {
    match tree {
        ConditionTree::Subquery(select) => select.render(dialect),
        other => conditions(dialect, other),
    }
}

/// Contents of an `IN (...)` list; empty lists render `NULL`.
fn list<D: SQLDialect + ?Sized>(dialect: &D, tree: &ConditionTree) -> Result<String> {
    match tree {
        ConditionTree::Value(Value::Array(items)) if items.is_empty() => {
            Ok(Token::NULL.to_string())
        }
        ConditionTree::Value(Value::Array(items)) => Ok(items
            .iter()
            .map(|item| dialect.value(item))
            .collect::<Vec<_>>()
            .join(", ")),
        other => inner(dialect, other),
    }
}

fn arguments<D: SQLDialect + ?Sized>(dialect: &D, operands: &[ConditionTree]) -> Result<String> {
    Ok(operands
        .iter()
        .map(|item| operand(dialect, item))
        .collect::<Result<Vec<_>>>()?
        .join(", "))
}

/// Anchors every unqualified field reference to `alias`.
///
/// Subqueries are left untouched; they carry their own scope.
pub fn prefix(tree: &ConditionTree, alias: &str) -> ConditionTree {
    match tree {
        ConditionTree::Field(FieldRef { table: None, name }) => {
            ConditionTree::Field(FieldRef::qualified(alias, name.clone()))
        }
        ConditionTree::Operator(op, operands) => ConditionTree::Operator(
            op.clone(),
            operands.iter().map(|item| prefix(item, alias)).collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::*;
    use crate::dialect::GenericDialect;
    use crate::statement::Select;
    use serde_json::json;

    fn render(input: serde_json::Value) -> String {
        let tree = ConditionTree::from_json(&input).unwrap();
        conditions(&GenericDialect::new(), &tree).unwrap()
    }

    #[test]
    fn test_mapping_conditions() {
        assert_eq!(
            render(json!({"field1": "value", "field2": 10})),
            r#""field1" = 'value' AND "field2" = 10"#
        );
    }

    #[test]
    fn test_between_and_in() {
        assert_eq!(
            render(json!({":between": [{":name": "score"}, [90, 100]]})),
            r#""score" BETWEEN 90 AND 100"#
        );
        assert_eq!(
            render(json!({":in": [{":name": "score"}, [1, 2, 3, 4, 5]]})),
            r#""score" IN (1, 2, 3, 4, 5)"#
        );
        assert_eq!(
            render(json!({":not between": [{":name": "score"}, [1, 2]]})),
            r#""score" NOT BETWEEN 1 AND 2"#
        );
    }

    #[test]
    fn test_empty_in_list_renders_null() {
        let d = GenericDialect::new();
        let empty: [i64; 0] = [];
        assert_eq!(
            conditions(&d, &in_list(field("id"), empty)).unwrap(),
            r#""id" IN (NULL)"#
        );
    }

    #[test]
    fn test_value_composites() {
        assert_eq!(render(json!({":value": [1, 2, 3]})), "{1,2,3}");
        assert_eq!(render(json!({":value": []})), "{}");
    }

    #[test]
    fn test_functions() {
        assert_eq!(
            render(json!({":concat()": [{":name": "a"}, "-", {":name": "b"}]})),
            r#"CONCAT("a", '-', "b")"#
        );
        assert_eq!(render(json!({":count()": []})), "COUNT(*)");
        assert_eq!(
            render(json!({":as": [{":count()": []}, {":name": "total"}]})),
            r#"COUNT(*) AS "total""#
        );
    }

    #[test]
    fn test_nested_conjunctions_are_parenthesized() {
        let d = GenericDialect::new();
        let tree = and([
            eq(field("a"), 1),
            or([eq(field("b"), 2), eq(field("c"), 3)]),
        ]);
        assert_eq!(
            conditions(&d, &tree).unwrap(),
            r#""a" = 1 AND ("b" = 2 OR "c" = 3)"#
        );
        assert_eq!(conditions(&d, &and([])).unwrap(), "");
        assert_eq!(
            conditions(&d, &not(eq(field("a"), 1))).unwrap(),
            r#"NOT ("a" = 1)"#
        );
    }

    #[test]
    fn test_subqueries() {
        let d = GenericDialect::new();
        let sub = Select::new().fields(["gallery_id"]).from("image");
        assert_eq!(
            conditions(&d, &in_subquery(field("id"), sub.clone())).unwrap(),
            r#""id" IN (SELECT "gallery_id" FROM "image")"#
        );
        assert_eq!(
            conditions(&d, &eq(field("id"), any(sub.clone()))).unwrap(),
            r#""id" = ANY (SELECT "gallery_id" FROM "image")"#
        );
        assert_eq!(
            conditions(&d, &exists(sub)).unwrap(),
            r#"EXISTS (SELECT "gallery_id" FROM "image")"#
        );
    }

    #[test]
    fn test_names_dedup_with_order() {
        let d = GenericDialect::new();
        let columns: Vec<Column> = ["prefix.field1", "prefix.field1", "prefix.field2"]
            .into_iter()
            .map(Column::from)
            .collect();
        assert_eq!(
            names(&d, &columns, true).unwrap(),
            r#""prefix"."field1", "prefix"."field2""#
        );
    }

    #[test]
    fn test_names_star_handling() {
        let d = GenericDialect::new();
        assert_eq!(names(&d, &[Column::star()], true).unwrap(), "*");
        assert_eq!(names(&d, &[Column::field("t.*")], true).unwrap(), r#""t".*"#);
        assert!(names(&d, &[Column::star()], false).is_err());
    }

    #[test]
    fn test_names_aliases_and_subqueries() {
        let d = GenericDialect::new();
        let columns = Column::from_json(&json!({"total": "t.amount"})).unwrap();
        assert_eq!(
            names(&d, &columns, true).unwrap(),
            r#""t"."amount" AS "total""#
        );

        let sub = Select::new().fields([func("max", [field("id")])]).from("image");
        assert_eq!(
            names(&d, &[Column::subquery(sub, "last")], true).unwrap(),
            r#"(SELECT MAX("id") FROM "image") AS "last""#
        );
    }

    #[test]
    fn test_prefix() {
        let d = GenericDialect::new();
        let tree = and([
            eq(field("id"), 1),
            eq(field("other.id"), field("gallery_id")),
        ]);
        assert_eq!(
            conditions(&d, &prefix(&tree, "g")).unwrap(),
            r#""g"."id" = 1 AND "other"."id" = "g"."gallery_id""#
        );
    }

    #[test]
    fn test_arity_violation_at_render() {
        let d = GenericDialect::new();
        let tree = ConditionTree::Operator(Operator::Eq, vec![field("a")]);
        assert!(matches!(conditions(&d, &tree), Err(ChaosError::Compile(_))));
    }
}
