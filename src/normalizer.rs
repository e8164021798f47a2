//! Filter Normalizer (spec.md §4.1).
//!
//! Rewrites a comparison filter so its indexable side is on the left,
//! rejecting filters that can't apply to the table/coverage being probed.

use crate::expr::{ComparisonOp, Expression};
use crate::value::ValueType;

/// What the normalizer is trying to match the indexable side against.
pub enum Coverage<'a> {
    /// A plain column, identified by table-relative column id.
    Column { column_id: usize },
    /// A general expression index key component.
    Expression(&'a Expression),
}

/// Why a comparison was rejected. All of these are soft: the caller skips
/// the filter for this key component and tries the next one, or falls
/// back to treating it as a residual predicate (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeError {
    /// Neither side matches the coverage, or both sides reference the table.
    Inapplicable,
    /// The indexed side's type cannot exactly represent the other side's type.
    Precision,
}

/// A comparison rewritten so `indexed_side` is syntactically the left
/// operand, plus whatever parameter bindings the match required.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub op: ComparisonOp,
    pub indexed_side: Expression,
    pub other_side: Expression,
    pub bindings: Vec<Expression>,
}

/// Attempts to normalize `filter` (must be `Expression::Comparison`)
/// against `coverage` on behalf of table `table_name`.
pub fn normalize(
    filter: &Expression,
    table_name: &str,
    coverage: &Coverage<'_>,
) -> Result<Normalized, NormalizeError> {
    let (op, left, right) = filter.as_comparison().ok_or(NormalizeError::Inapplicable)?;

    if let Some(bindings) = matches_coverage(left, table_name, coverage) {
        if right.independent_of_table(table_name) {
            check_precision(left, right)?;
            return Ok(Normalized { op, indexed_side: left.clone(), other_side: right.clone(), bindings });
        }
    }

    if let Some(bindings) = matches_coverage(right, table_name, coverage) {
        if left.independent_of_table(table_name) {
            check_precision(right, left)?;
            return Ok(Normalized {
                op: op.reverse(),
                indexed_side: right.clone(),
                other_side: left.clone(),
                bindings,
            });
        }
    }

    Err(NormalizeError::Inapplicable)
}

/// Returns `Some(bindings)` when `side` matches the requested coverage:
/// either a `TupleValue` referencing `table_name`'s column id, or a
/// structural match against an indexed expression.
fn matches_coverage(side: &Expression, table_name: &str, coverage: &Coverage<'_>) -> Option<Vec<Expression>> {
    match coverage {
        Coverage::Column { column_id } => match side {
            Expression::TupleValue { table, column_id: cid, .. } if table == table_name && cid == column_id => {
                Some(Vec::new())
            }
            _ => None,
        },
        Coverage::Expression(indexed) => side.binding_to_indexed_expression(indexed),
    }
}

fn check_precision(indexed_side: &Expression, other_side: &Expression) -> Result<(), NormalizeError> {
    let indexed_type: ValueType = indexed_side.value_type();
    let other_type: ValueType = other_side.value_type();
    if indexed_type.exactly_represents(other_type) {
        Ok(())
    } else {
        Err(NormalizeError::Precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn tv(table: &str, col: usize, vt: ValueType) -> Expression {
        Expression::TupleValue { table: table.into(), column_id: col, column_name: "c".into(), value_type: vt }
    }

    fn constant(v: Value) -> Expression {
        let vt = v.value_type().unwrap();
        Expression::Constant { value: v, value_type: vt, is_prefix_pattern: false }
    }

    #[test]
    fn matches_as_is_when_left_is_the_indexed_column() {
        let filter = Expression::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(tv("t", 0, ValueType::BigInt)),
            right: Box::new(constant(Value::BigInt(5))),
        };
        let coverage = Coverage::Column { column_id: 0 };
        let normalized = normalize(&filter, "t", &coverage).unwrap();
        assert_eq!(normalized.op, ComparisonOp::Eq);
        assert!(normalized.bindings.is_empty());
    }

    #[test]
    fn reverses_operator_when_indexed_side_is_on_the_right() {
        let filter = Expression::Comparison {
            op: ComparisonOp::Gt,
            left: Box::new(constant(Value::BigInt(5))),
            right: Box::new(tv("t", 0, ValueType::BigInt)),
        };
        let coverage = Coverage::Column { column_id: 0 };
        let normalized = normalize(&filter, "t", &coverage).unwrap();
        assert_eq!(normalized.op, ComparisonOp::Lt);
    }

    #[test]
    fn self_referencing_comparison_is_inapplicable() {
        let filter = Expression::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(tv("t", 0, ValueType::BigInt)),
            right: Box::new(tv("t", 1, ValueType::BigInt)),
        };
        let coverage = Coverage::Column { column_id: 0 };
        assert_eq!(normalize(&filter, "t", &coverage), Err(NormalizeError::Inapplicable));
    }

    #[test]
    fn lossy_type_is_rejected_with_precision_error() {
        let filter = Expression::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(tv("t", 0, ValueType::SmallInt)),
            right: Box::new(constant(Value::BigInt(5))),
        };
        let coverage = Coverage::Column { column_id: 0 };
        assert_eq!(normalize(&filter, "t", &coverage), Err(NormalizeError::Precision));
    }
}
