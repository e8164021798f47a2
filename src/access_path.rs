//! Access-Path Builder (spec.md §4.4): the core of this crate. Per
//! (table, index) pair, walks the index's key components against the
//! table's filter list and assembles an equality prefix, a range bound,
//! residual post-filters, and — for SELECTs — a satisfied sort order.

use tracing::{debug, warn};

use crate::expr::{ComparisonOp, Expression};
use crate::matcher::{self, IndexableExpression};
use crate::normalizer::Coverage;
use crate::order::{self, SortDirection};
use crate::schema::{Index, ResolvedKeyComponent, Table};
use crate::statement::OrderByItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupType {
    Eq,
    Gt,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMode {
    CoveringUniqueEquality,
    IndexScan,
}

/// Where a residual filter came from — used only to decide whether it
/// also belongs in `join_exprs` once it lands in `other_exprs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOrigin {
    Table,
    Join,
}

/// A candidate way to read rows from one table: either a sequential scan
/// (`index = None`) or a scan over `index`'s key order.
pub struct AccessPath<'a> {
    pub index: Option<&'a Index>,
    pub lookup_type: LookupType,
    pub use_mode: UseMode,
    pub index_exprs: Vec<Expression>,
    pub end_exprs: Vec<Expression>,
    pub other_exprs: Vec<Expression>,
    /// Subset of `other_exprs` that originated from a join predicate
    /// rather than a single-table filter.
    pub join_exprs: Vec<Expression>,
    pub sort_direction: SortDirection,
    pub bindings: Vec<Expression>,
    pub key_iterate: bool,
}

/// The naive sequential scan. Always producible — this is what keeps the
/// planner from ever failing closed (spec.md §7).
pub fn build_sequential_path(filters: &[Expression]) -> AccessPath<'static> {
    AccessPath {
        index: None,
        lookup_type: LookupType::Eq,
        use_mode: UseMode::CoveringUniqueEquality,
        index_exprs: Vec::new(),
        end_exprs: Vec::new(),
        other_exprs: filters.to_vec(),
        join_exprs: Vec::new(),
        sort_direction: SortDirection::None,
        bindings: Vec::new(),
        key_iterate: false,
    }
}

/// Builds the access path for `index` against `table`'s filters, or
/// `None` when the index offers no usable path (spec.md §7
/// NOT-APPLICABLE / TYPE-MISMATCH / a non-scannable index with only
/// partial coverage).
pub fn build_access_path<'a>(
    table: &Table,
    index: &'a Index,
    table_filters: &[Expression],
    join_filters: &[Expression],
    order_by: &[OrderByItem],
) -> Option<AccessPath<'a>> {
    // Step 1: deserialize the key's expression payloads once (spec.md
    // §4.4 step 1). A malformed payload degrades to "no path for this
    // index" (spec.md §7 MALFORMED-INDEX) rather than failing the
    // statement.
    let key = match index.resolve_key() {
        Ok(key) => key,
        Err(err) => {
            warn!(table = %table.name, index = %index.name, error = %err, "malformed expression-index payload, skipping index");
            return None;
        }
    };
    let key = key.as_slice();
    let k = key.len();

    let mut remaining: Vec<(Expression, FilterOrigin)> = table_filters
        .iter()
        .cloned()
        .map(|e| (e, FilterOrigin::Table))
        .chain(join_filters.iter().cloned().map(|e| (e, FilterOrigin::Join)))
        .collect();

    let mut path = AccessPath {
        index: Some(index),
        lookup_type: LookupType::Eq,
        use_mode: UseMode::CoveringUniqueEquality,
        index_exprs: Vec::new(),
        end_exprs: Vec::new(),
        other_exprs: Vec::new(),
        join_exprs: Vec::new(),
        sort_direction: SortDirection::None,
        bindings: Vec::new(),
        key_iterate: false,
    };

    // Step 2: tentative order.
    let order_result = order::determine_order(&table.name, key, order_by);
    path.sort_direction = order_result.direction;
    let mut order_bindings = order_result.bindings;

    // Step 3: equality prefix.
    let mut covered = 0;
    while covered < k {
        let coverage = coverage_for(&key[covered]);
        match take_matching(&mut remaining, |f| matcher::match_filter(f, &table.name, &coverage, ComparisonOp::Eq)) {
            Some(m) => {
                path.index_exprs.push(m.comparison.clone());
                path.end_exprs.push(m.comparison);
                path.bindings.extend(m.bindings);
                covered += 1;
            }
            None => break,
        }
    }

    // Step 4: fully covered by equalities.
    if covered == k {
        drain_into_other(&mut remaining, &mut path);
        if path.sort_direction != SortDirection::None {
            path.bindings.append(&mut order_bindings);
        }
        debug!(table = %table.name, index = %index.name, "covering equality access path");
        return Some(path);
    }

    // Step 5: non-scannable indexes need full equality coverage.
    if !index.kind.is_scannable() {
        debug!(table = %table.name, index = %index.name, "non-scannable index has only partial coverage, skipping");
        return None;
    }

    // Step 6: range bound at the first uncovered position.
    let coverage = coverage_for(&key[covered]);
    let mut starting_bound: Option<IndexableExpression> = None;
    let mut ending_bound: Option<IndexableExpression> = None;

    if let Some(bounds) = take_like_bounds(&mut remaining, &table.name, &coverage) {
        starting_bound = Some(bounds.lower);
        ending_bound = bounds.upper;
    } else {
        starting_bound = take_matching(&mut remaining, |f| matcher::match_lower_bound(f, &table.name, &coverage));
        ending_bound = take_matching(&mut remaining, |f| matcher::match_upper_bound(f, &table.name, &coverage));
    }

    // Step 7: reverse-scan reconciliation. A two-sided range (both bounds
    // present) or a non-empty equality echo can't drive a reverse scan —
    // disable descending and fall through to treating this as a plain
    // (unordered) range path. A lower-bound-only match (e.g. "a > 5") is
    // reinterpreted as the scan's stop condition when walking backward,
    // so it moves into the ending slot. An upper-bound-only match
    // (e.g. "a < 10", spec.md §8 scenario 6) is already sitting in the
    // right slot — the executor reads it as the reverse scan's
    // initializer rather than its stop condition, so nothing moves.
    if path.sort_direction == SortDirection::Descending {
        if !path.end_exprs.is_empty() || (starting_bound.is_some() && ending_bound.is_some()) {
            path.sort_direction = SortDirection::None;
        } else if let Some(bound) = starting_bound.take() {
            ending_bound = Some(bound);
        }
    }

    // Step 8: apply starting bound.
    let mut applied_starting_comparator: Option<Expression> = None;
    if let Some(bound) = starting_bound {
        let (op, ..) = bound.comparison.as_comparison().expect("bound is a Comparison");
        path.lookup_type = if op.is_strict_gt() { LookupType::Gt } else { LookupType::Gte };
        path.use_mode = UseMode::IndexScan;
        path.bindings.extend(bound.bindings);
        path.index_exprs.push(bound.comparison.clone());
        applied_starting_comparator = Some(bound.comparison);
    }

    // Step 9: apply ending bound.
    if let Some(bound) = ending_bound {
        path.use_mode = UseMode::IndexScan;
        if path.lookup_type == LookupType::Eq {
            path.lookup_type = LookupType::Gte;
        }
        path.bindings.extend(bound.bindings);
        path.end_exprs.push(bound.comparison);
    }

    // A satisfied ORDER BY requires physically walking the index in key
    // order, never a point lookup, even when no range bound was applied
    // (spec.md §8 scenario 2: pure ordering, no filters at all).
    if path.sort_direction != SortDirection::None {
        path.use_mode = UseMode::IndexScan;
    }

    // Step 10: irrelevance check.
    if path.index_exprs.is_empty() && path.end_exprs.is_empty() && path.sort_direction == SortDirection::None {
        return None;
    }

    // Step 11: padding correction for partial equality coverage.
    if path.index_exprs.len() < k {
        if path.use_mode == UseMode::CoveringUniqueEquality {
            path.use_mode = UseMode::IndexScan;
            path.lookup_type = LookupType::Gte;
        } else if path.lookup_type == LookupType::Gt {
            if let Some(comparator) = applied_starting_comparator {
                path.other_exprs.push(comparator);
            }
        }
    }

    // Step 12: drain remainder, commit order bindings.
    drain_into_other(&mut remaining, &mut path);
    if path.sort_direction != SortDirection::None {
        path.bindings.append(&mut order_bindings);
    }

    debug!(
        table = %table.name,
        index = %index.name,
        lookup_type = ?path.lookup_type,
        sort_direction = ?path.sort_direction,
        "range/order access path"
    );
    Some(path)
}

fn coverage_for(component: &ResolvedKeyComponent) -> Coverage<'_> {
    match component {
        ResolvedKeyComponent::Column(col) => Coverage::Column { column_id: col.ordinal },
        ResolvedKeyComponent::Expression(expr) => Coverage::Expression(expr),
    }
}

/// Scans `remaining` left-to-right, removing and returning the first
/// entry `try_match` accepts.
fn take_matching(
    remaining: &mut Vec<(Expression, FilterOrigin)>,
    mut try_match: impl FnMut(&Expression) -> Option<IndexableExpression>,
) -> Option<IndexableExpression> {
    for i in 0..remaining.len() {
        if let Some(m) = try_match(&remaining[i].0) {
            remaining.remove(i);
            return Some(m);
        }
    }
    None
}

fn take_like_bounds(
    remaining: &mut Vec<(Expression, FilterOrigin)>,
    table_name: &str,
    coverage: &Coverage<'_>,
) -> Option<matcher::LikeBounds> {
    for i in 0..remaining.len() {
        if let Some(bounds) = matcher::match_like_bounds(&remaining[i].0, table_name, coverage) {
            remaining.remove(i);
            return Some(bounds);
        }
    }
    None
}

fn drain_into_other(remaining: &mut Vec<(Expression, FilterOrigin)>, path: &mut AccessPath<'_>) {
    for (expr, origin) in remaining.drain(..) {
        if origin == FilterOrigin::Join {
            path.join_exprs.push(expr.clone());
        }
        path.other_exprs.push(expr);
    }
}
