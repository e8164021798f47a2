//! Sub-plan assembly: single-table access-path enumeration and scan-node
//! emission for a relational query planner.
//!
//! Given a [`Statement`] and a [`Table`] from the catalog, [`plan_table`]
//! enumerates every viable way to read that table — a sequential scan
//! plus one access path per usable index — and leaves cost-based ranking
//! to a separate component. The planner never fails closed: a malformed
//! index, a type mismatch, or an unsatisfiable match degrade a single
//! index candidate to "no path for this index"; the sequential scan is
//! always present.

pub mod access_path;
pub mod error;
pub mod expr;
pub mod matcher;
pub mod normalizer;
pub mod order;
pub mod plan;
pub mod schema;
pub mod statement;
pub mod value;

pub use access_path::{AccessPath, LookupType, UseMode};
pub use error::{PlannerError, Result};
pub use expr::{ComparisonOp, Expression};
pub use order::SortDirection;
pub use plan::{IndexScanNode, PlanNode, Predicate, ScanNode, SequentialScanNode};
pub use schema::{Column, Index, IndexKind, KeyComponent, ResolvedKeyComponent, Table, TableBuilder};
pub use statement::{OrderByItem, Statement, TablePair};
pub use value::{Value, ValueType};

use tracing::debug;

/// Bounded-iteration guards. The source this planner is derived from has
/// no configuration surface of its own (catalog access is synchronous, in
/// memory, unbounded); these options exist so an embedding system can cap
/// per-statement planning work without touching this crate's logic.
#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    /// Upper bound on indexes considered per table. `0` means unbounded.
    pub max_indexes_per_table: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self { max_indexes_per_table: 0 }
    }
}

/// Enumerates every access path for `table` given `statement`: one
/// sequential scan, plus one path per usable index (in catalog
/// declaration order, per spec.md §9's determinism requirement).
pub fn plan_table<'a>(
    statement: &Statement,
    table: &'a Table,
    options: &PlannerOptions,
) -> Vec<AccessPath<'a>> {
    let table_filters = statement.table_filters.get(&table.name).cloned().unwrap_or_default();
    let join_filters: Vec<Expression> = statement.join_filters_for_table(&table.name);

    let mut all_filters = table_filters.clone();
    all_filters.extend(join_filters.iter().cloned());

    let mut paths = vec![access_path::build_sequential_path(&all_filters)];

    let indexes = if options.max_indexes_per_table == 0 {
        table.indexes.iter().collect::<Vec<_>>()
    } else {
        table.indexes.iter().take(options.max_indexes_per_table).collect()
    };

    for index in indexes {
        match access_path::build_access_path(
            table,
            index,
            &table_filters,
            &join_filters,
            statement.effective_order_by(),
        ) {
            Some(path) => paths.push(path),
            None => {
                debug!(table = %table.name, index = %index.name, "no usable access path for this index");
            }
        }
    }

    paths
}

#[cfg(test)]
mod tests;
