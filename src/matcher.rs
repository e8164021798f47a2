//! Indexable Matcher (spec.md §4.2).
//!
//! Decides whether a filter is usable against a given index key
//! component and, for LIKE, synthesizes the double-ended range bounds a
//! prefix pattern allows.

use crate::expr::{self, ComparisonOp, Expression};
use crate::normalizer::{self, Coverage, Normalized};

/// The result of a successful match attempt: the normalized comparison
/// plus the bindings required for it to remain valid on reuse. Lifecycle
/// mirrors spec.md §3's `IndexableExpression` — produced per attempt,
/// consumed immediately by the access-path builder.
pub struct IndexableExpression {
    pub comparison: Expression,
    pub bindings: Vec<Expression>,
}

/// Both ends of a range derived from a single LIKE filter.
pub struct LikeBounds {
    pub lower: IndexableExpression,
    pub upper: Option<IndexableExpression>,
}

/// Attempts to match `filter` against `coverage` using exactly
/// `target_op`. Does not special-case LIKE's double-ended form — callers
/// that want that use [`match_like_bounds`].
pub fn match_filter(
    filter: &Expression,
    table_name: &str,
    coverage: &Coverage<'_>,
    target_op: ComparisonOp,
) -> Option<IndexableExpression> {
    let normalized = normalizer::normalize(filter, table_name, coverage).ok()?;
    if normalized.op != target_op {
        return None;
    }
    Some(to_indexable(normalized))
}

/// Attempts any lower-bound comparator (GT or GTE).
pub fn match_lower_bound(filter: &Expression, table_name: &str, coverage: &Coverage<'_>) -> Option<IndexableExpression> {
    match_bound(filter, table_name, coverage, ComparisonOp::is_lower_bound)
}

/// Attempts any upper-bound comparator (LT or LTE).
pub fn match_upper_bound(filter: &Expression, table_name: &str, coverage: &Coverage<'_>) -> Option<IndexableExpression> {
    match_bound(filter, table_name, coverage, ComparisonOp::is_upper_bound)
}

fn match_bound(
    filter: &Expression,
    table_name: &str,
    coverage: &Coverage<'_>,
    accept: fn(ComparisonOp) -> bool,
) -> Option<IndexableExpression> {
    let normalized = normalizer::normalize(filter, table_name, coverage).ok()?;
    if !accept(normalized.op) {
        return None;
    }
    Some(to_indexable(normalized))
}

/// Attempts the LIKE double-ended match (spec.md §4.2). Requires the
/// other side to be a prefix-pattern `Constant`, or a `Parameter` whose
/// `original` points to one — in the latter case the parameter itself is
/// folded into the returned bindings, since the cached plan is only
/// reusable while the bound parameter continues to be a prefix pattern.
pub fn match_like_bounds(filter: &Expression, table_name: &str, coverage: &Coverage<'_>) -> Option<LikeBounds> {
    let normalized = match normalizer::normalize(filter, table_name, coverage) {
        Ok(n) if n.op == ComparisonOp::Like => n,
        _ => return None,
    };

    let (pattern, mut bindings) = pattern_text_and_bindings(&normalized)?;
    bindings.extend(normalized.bindings.iter().cloned());

    let (prefix, successor) = expr::like_prefix_and_successor(&pattern);
    let indexed = normalized.indexed_side.clone();
    let lower_value = Expression::Constant {
        value: crate::value::Value::Text(prefix),
        value_type: normalized.indexed_side.value_type(),
        is_prefix_pattern: false,
    };
    let lower = IndexableExpression {
        comparison: Expression::Comparison {
            op: ComparisonOp::Gte,
            left: Box::new(indexed.clone()),
            right: Box::new(lower_value),
        },
        bindings: bindings.clone(),
    };
    let upper = successor.map(|s| {
        let upper_value = Expression::Constant {
            value: crate::value::Value::Text(s),
            value_type: indexed.value_type(),
            is_prefix_pattern: false,
        };
        IndexableExpression {
            comparison: Expression::Comparison {
                op: ComparisonOp::Lt,
                left: Box::new(indexed.clone()),
                right: Box::new(upper_value),
            },
            bindings,
        }
    });

    Some(LikeBounds { lower, upper })
}

/// Extracts the literal pattern text from a LIKE's other-side operand,
/// requiring a prefix-pattern `Constant` directly or via `Parameter::original`.
fn pattern_text_and_bindings(normalized: &Normalized) -> Option<(String, Vec<Expression>)> {
    match &normalized.other_side {
        Expression::Constant { value, is_prefix_pattern: true, .. } => {
            Some((value.as_text()?.to_string(), Vec::new()))
        }
        Expression::Parameter { original: Some(original), .. } => match original.as_ref() {
            Expression::Constant { value, is_prefix_pattern: true, .. } => {
                Some((value.as_text()?.to_string(), vec![normalized.other_side.clone()]))
            }
            _ => None,
        },
        _ => None,
    }
}

fn to_indexable(normalized: Normalized) -> IndexableExpression {
    let comparison = Expression::Comparison {
        op: normalized.op,
        left: Box::new(normalized.indexed_side),
        right: Box::new(normalized.other_side),
    };
    IndexableExpression { comparison, bindings: normalized.bindings }
}
