//! Order Determinator (spec.md §4.3).
//!
//! Decides whether an index's key order can satisfy a SELECT's ORDER BY,
//! tentatively tagging the access path with a sort direction. The
//! access-path builder (§4.4) may later invalidate a tentative descending
//! direction if a range bound makes a reverse scan impossible.

use crate::expr::Expression;
use crate::schema::ResolvedKeyComponent;
use crate::statement::OrderByItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    None,
    Ascending,
    Descending,
}

pub struct OrderResult {
    pub direction: SortDirection,
    pub bindings: Vec<Expression>,
}

/// `table_name` and `key` describe the index being probed; `order_by` is
/// empty for non-SELECT statements or statements without an ORDER BY
/// clause, in which case this always returns `SortDirection::None`.
pub fn determine_order(table_name: &str, key: &[ResolvedKeyComponent], order_by: &[OrderByItem]) -> OrderResult {
    let none = OrderResult { direction: SortDirection::None, bindings: Vec::new() };

    if order_by.is_empty() || order_by.len() > key.len() {
        return none;
    }

    let ascending = order_by[0].ascending;
    let mut bindings = Vec::new();

    for (item, component) in order_by.iter().zip(key) {
        if item.ascending != ascending {
            return none;
        }
        match component {
            ResolvedKeyComponent::Column(col) => match &item.expression {
                Expression::TupleValue { table, column_name, .. }
                    if table == table_name && *column_name == col.name => {}
                _ => return none,
            },
            ResolvedKeyComponent::Expression(key_expr) => {
                match item.expression.binding_to_indexed_expression(key_expr) {
                    Some(mut item_bindings) => bindings.append(&mut item_bindings),
                    None => return none,
                }
            }
        }
    }

    let direction = if ascending { SortDirection::Ascending } else { SortDirection::Descending };
    OrderResult { direction, bindings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use crate::value::ValueType;

    fn col_key(names: &[&str]) -> Vec<ResolvedKeyComponent> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| ResolvedKeyComponent::Column(Column::new(*n, i, ValueType::BigInt)))
            .collect()
    }

    fn order_item(table: &str, column: &str, ordinal: usize, ascending: bool) -> OrderByItem {
        OrderByItem {
            expression: Expression::TupleValue {
                table: table.into(),
                column_id: ordinal,
                column_name: column.into(),
                value_type: ValueType::BigInt,
            },
            ascending,
        }
    }

    #[test]
    fn no_order_by_leaves_direction_none() {
        let key = col_key(&["a", "b"]);
        let result = determine_order("t", &key, &[]);
        assert_eq!(result.direction, SortDirection::None);
    }

    #[test]
    fn matching_prefix_columns_yield_ascending() {
        let key = col_key(&["a", "b"]);
        let order_by = vec![order_item("t", "a", 0, true), order_item("t", "b", 1, true)];
        let result = determine_order("t", &key, &order_by);
        assert_eq!(result.direction, SortDirection::Ascending);
    }

    #[test]
    fn mixed_directions_fail() {
        let key = col_key(&["a", "b"]);
        let order_by = vec![order_item("t", "a", 0, true), order_item("t", "b", 1, false)];
        let result = determine_order("t", &key, &order_by);
        assert_eq!(result.direction, SortDirection::None);
    }

    #[test]
    fn more_order_items_than_key_components_fails() {
        let key = col_key(&["a"]);
        let order_by = vec![order_item("t", "a", 0, true), order_item("t", "b", 1, true)];
        let result = determine_order("t", &key, &order_by);
        assert_eq!(result.direction, SortDirection::None);
    }

    #[test]
    fn wrong_column_in_key_order_fails() {
        let key = col_key(&["a", "b"]);
        let order_by = vec![order_item("t", "c", 2, true)];
        let result = determine_order("t", &key, &order_by);
        assert_eq!(result.direction, SortDirection::None);
    }
}
