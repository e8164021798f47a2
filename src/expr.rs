//! The expression model: a tagged variant tree standing in for the
//! class-hierarchy-with-virtuals shape of the source planner (spec.md §9).
//! `bindingToIndexedExpression` becomes a free function dispatching on the
//! tag instead of a virtual method; the comparator-reverse table becomes
//! a pure match instead of a mutable static map.

use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueType};

/// A comparison operator. `Like` is its own reverse, as is `Eq`; the
/// ordering operators swap direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl ComparisonOp {
    /// The operator to use when a comparison's operands are swapped.
    pub fn reverse(self) -> ComparisonOp {
        match self {
            ComparisonOp::Eq => ComparisonOp::Eq,
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Gte => ComparisonOp::Lte,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Lte => ComparisonOp::Gte,
            ComparisonOp::Like => ComparisonOp::Like,
        }
    }

    pub fn is_strict_gt(self) -> bool {
        matches!(self, ComparisonOp::Gt)
    }

    pub fn is_lower_bound(self) -> bool {
        matches!(self, ComparisonOp::Gt | ComparisonOp::Gte)
    }

    pub fn is_upper_bound(self) -> bool {
        matches!(self, ComparisonOp::Lt | ComparisonOp::Lte)
    }
}

/// A filter, index-key, or sub-expression node.
///
/// `Comparison` and `ArithmeticOrOther` own their children; `TupleValue`,
/// `Constant`, and `Parameter` are leaves. Nothing here is ever mutated
/// after construction — a transform (reversal, LIKE synthesis) always
/// produces a new node that references the original operands (spec.md §5).
///
/// Derives `Serialize`/`Deserialize` so an expression-index key component
/// can round-trip through the catalog's serialized-expression-string
/// payload (spec.md §3, §4.4 step 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// A column reference: `table.column`.
    TupleValue { table: String, column_id: usize, column_name: String, value_type: ValueType },
    /// A literal. `is_prefix_pattern` is only meaningful when this constant
    /// is the right-hand side of a LIKE comparison: true means every
    /// wildcard in the pattern appears after a literal prefix, so the
    /// pattern can be converted to a range.
    Constant { value: Value, value_type: ValueType, is_prefix_pattern: bool },
    /// A bind parameter. `original`, when present, is the constant this
    /// parameter was derived from at plan-cache time — used to recheck
    /// that a reused cached plan's actual bound value still satisfies the
    /// condition the plan was built under (e.g. still a prefix pattern).
    Parameter { index: usize, value_type: ValueType, original: Option<Box<Expression>> },
    Comparison { op: ComparisonOp, left: Box<Expression>, right: Box<Expression> },
    /// Anything else: function calls, arithmetic, boolean connectives.
    /// `op` names the operator/function; structural matching requires the
    /// same `op` and arity on both sides.
    ArithmeticOrOther { op: String, children: Vec<Expression>, value_type: ValueType },
}

impl Expression {
    pub fn value_type(&self) -> ValueType {
        match self {
            Expression::TupleValue { value_type, .. }
            | Expression::Constant { value_type, .. }
            | Expression::Parameter { value_type, .. }
            | Expression::ArithmeticOrOther { value_type, .. } => *value_type,
            Expression::Comparison { .. } => ValueType::Boolean,
        }
    }

    pub fn as_comparison(&self) -> Option<(ComparisonOp, &Expression, &Expression)> {
        match self {
            Expression::Comparison { op, left, right } => Some((*op, left, right)),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<(&Value, bool)> {
        match self {
            Expression::Constant { value, is_prefix_pattern, .. } => Some((value, *is_prefix_pattern)),
            _ => None,
        }
    }

    /// Collects every `TupleValue` reachable from this expression.
    /// `Parameter::original` is not descended into — a cached original
    /// constant is not a live reference into the current row.
    pub fn tuple_value_refs(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.collect_tuple_values(&mut out);
        out
    }

    fn collect_tuple_values<'a>(&'a self, out: &mut Vec<&'a Expression>) {
        match self {
            Expression::TupleValue { .. } => out.push(self),
            Expression::Constant { .. } | Expression::Parameter { .. } => {}
            Expression::Comparison { left, right, .. } => {
                left.collect_tuple_values(out);
                right.collect_tuple_values(out);
            }
            Expression::ArithmeticOrOther { children, .. } => {
                for child in children {
                    child.collect_tuple_values(out);
                }
            }
        }
    }

    /// True if no `TupleValue` in this expression references `table`.
    pub fn independent_of_table(&self, table: &str) -> bool {
        self.tuple_value_refs().iter().all(|tv| match tv {
            Expression::TupleValue { table: t, .. } => t != table,
            _ => unreachable!("tuple_value_refs only yields TupleValue nodes"),
        })
    }

    /// True if at least one `TupleValue` in this expression references
    /// `table` (used to confirm invariant I4's "left references T").
    pub fn references_table(&self, table: &str) -> bool {
        self.tuple_value_refs().iter().any(|tv| match tv {
            Expression::TupleValue { table: t, .. } => t == table,
            _ => unreachable!("tuple_value_refs only yields TupleValue nodes"),
        })
    }

    /// Structural match of `self` (typically a filter operand, possibly
    /// containing parameters) against `indexed` (a concrete index key
    /// component expression). Returns `None` when the shapes diverge,
    /// `Some([])` when they match with no binding required, or
    /// `Some(bindings)` where each binding is a synthesized `Parameter`
    /// carrying `original = Some(indexed sub-expression)`.
    pub fn binding_to_indexed_expression(&self, indexed: &Expression) -> Option<Vec<Expression>> {
        let mut bindings = Vec::new();
        if bind_recursive(self, indexed, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }
}

fn bind_recursive(filter_side: &Expression, indexed: &Expression, bindings: &mut Vec<Expression>) -> bool {
    match (filter_side, indexed) {
        (
            Expression::TupleValue { table: t1, column_id: c1, .. },
            Expression::TupleValue { table: t2, column_id: c2, .. },
        ) => t1 == t2 && c1 == c2,
        (Expression::Constant { value: v1, .. }, Expression::Constant { value: v2, .. }) => v1 == v2,
        (Expression::Parameter { index, value_type, .. }, _) => {
            bindings.push(Expression::Parameter {
                index: *index,
                value_type: *value_type,
                original: Some(Box::new(indexed.clone())),
            });
            true
        }
        (
            Expression::ArithmeticOrOther { op: op1, children: c1, .. },
            Expression::ArithmeticOrOther { op: op2, children: c2, .. },
        ) => op1 == op2 && c1.len() == c2.len() && c1.iter().zip(c2).all(|(a, b)| bind_recursive(a, b, bindings)),
        (
            Expression::Comparison { op: op1, left: l1, right: r1 },
            Expression::Comparison { op: op2, left: l2, right: r2 },
        ) => op1 == op2 && bind_recursive(l1, l2, bindings) && bind_recursive(r1, r2, bindings),
        _ => false,
    }
}

/// The literal prefix of a LIKE pattern, up to (not including) the first
/// unescaped `%` or `_`.
pub fn like_literal_prefix(pattern: &str) -> String {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '%' | '_' => break,
            _ => out.push(c),
        }
    }
    out
}

/// The lexicographically-next string after `prefix`, formed by
/// incrementing its last character (carrying into earlier characters when
/// the last one is already at its code-point maximum). `None` when every
/// character is at its maximum (no finite successor exists), in which
/// case the range has no upper bound.
pub fn successor_string(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    loop {
        let last = chars.pop()?;
        if let Some(next) = char::from_u32(last as u32 + 1) {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
}

/// Derives the `(lower, upper)` bound strings for a prefix-pattern LIKE
/// constant: `lower` is the literal prefix (GTE bound), `upper` is its
/// successor (LT bound), or `None` if the prefix has no successor.
pub fn like_prefix_and_successor(pattern: &str) -> (String, Option<String>) {
    let prefix = like_literal_prefix(pattern);
    let successor = successor_string(&prefix);
    (prefix, successor)
}

/// True if every wildcard (`%`/`_`) in `pattern` appears after a
/// non-empty run of literal characters — i.e. the pattern is convertible
/// to a range scan. An all-wildcard or leading-wildcard pattern is not a
/// prefix pattern.
pub fn is_prefix_pattern(pattern: &str) -> bool {
    !like_literal_prefix(pattern).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tv(table: &str, col: usize, name: &str, vt: ValueType) -> Expression {
        Expression::TupleValue { table: table.into(), column_id: col, column_name: name.into(), value_type: vt }
    }

    fn constant(v: Value) -> Expression {
        let vt = v.value_type().unwrap();
        Expression::Constant { value: v, value_type: vt, is_prefix_pattern: false }
    }

    #[test]
    fn reverse_table_matches_spec() {
        assert_eq!(ComparisonOp::Gt.reverse(), ComparisonOp::Lt);
        assert_eq!(ComparisonOp::Lt.reverse(), ComparisonOp::Gt);
        assert_eq!(ComparisonOp::Gte.reverse(), ComparisonOp::Lte);
        assert_eq!(ComparisonOp::Lte.reverse(), ComparisonOp::Gte);
        assert_eq!(ComparisonOp::Eq.reverse(), ComparisonOp::Eq);
        assert_eq!(ComparisonOp::Like.reverse(), ComparisonOp::Like);
    }

    #[test]
    fn independence_rejects_table_self_reference() {
        let e = tv("t", 0, "a", ValueType::BigInt);
        assert!(!e.independent_of_table("t"));
        assert!(e.independent_of_table("other"));
    }

    // spec.md §8 scenario 3: substr(doc,?,1) = 'x' against indexed substr(doc,1,1)
    #[test]
    fn structural_binding_produces_expected_parameter() {
        let doc = tv("t", 0, "doc", ValueType::Text);
        let filter_side = Expression::ArithmeticOrOther {
            op: "substr".into(),
            children: vec![
                doc.clone(),
                Expression::Parameter { index: 0, value_type: ValueType::Integer, original: None },
                constant(Value::Integer(1)),
            ],
            value_type: ValueType::Text,
        };
        let indexed = Expression::ArithmeticOrOther {
            op: "substr".into(),
            children: vec![doc, constant(Value::Integer(1)), constant(Value::Integer(1))],
            value_type: ValueType::Text,
        };

        let bindings = filter_side.binding_to_indexed_expression(&indexed).expect("should match structurally");
        assert_eq!(bindings.len(), 1);
        match &bindings[0] {
            Expression::Parameter { index, original, .. } => {
                assert_eq!(*index, 0);
                let original = original.as_ref().expect("binding carries original");
                assert_eq!(original.as_constant().unwrap().0, &Value::Integer(1));
            }
            other => panic!("expected Parameter binding, got {other:?}"),
        }
    }

    #[test]
    fn structural_mismatch_on_different_function_fails() {
        let doc = tv("t", 0, "doc", ValueType::Text);
        let filter_side = Expression::ArithmeticOrOther {
            op: "upper".into(),
            children: vec![doc.clone()],
            value_type: ValueType::Text,
        };
        let indexed =
            Expression::ArithmeticOrOther { op: "lower".into(), children: vec![doc], value_type: ValueType::Text };
        assert!(filter_side.binding_to_indexed_expression(&indexed).is_none());
    }

    #[test]
    fn no_binding_required_returns_empty_vec() {
        let a = tv("t", 0, "a", ValueType::BigInt);
        let b = tv("t", 0, "a", ValueType::BigInt);
        assert_eq!(a.binding_to_indexed_expression(&b), Some(Vec::new()));
    }

    // spec.md §8 scenario 5: 'foo%' -> GTE 'foo' / LT 'fop'
    #[test]
    fn like_prefix_and_successor_matches_spec_scenario() {
        let (prefix, successor) = like_prefix_and_successor("foo%");
        assert_eq!(prefix, "foo");
        assert_eq!(successor.as_deref(), Some("fop"));
    }

    #[test]
    fn leading_wildcard_is_not_a_prefix_pattern() {
        assert!(!is_prefix_pattern("%foo"));
        assert!(is_prefix_pattern("foo%"));
    }

    #[test]
    fn successor_of_all_max_chars_has_no_successor() {
        let max_char = char::from_u32(char::MAX as u32).unwrap().to_string();
        assert_eq!(successor_string(&max_char), None);
    }
}
