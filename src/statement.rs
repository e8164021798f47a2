//! The consumed statement shape (spec.md §6 "Consumed: ParsedStatement").
//!
//! This crate does not parse SQL; callers hand it an already-resolved
//! `Statement` built from whatever upstream parser they use. `BTreeMap`
//! is used (rather than a hash map) for per-table filters and join-pair
//! predicates so that enumeration over them is reproducible across runs,
//! per spec.md §9's determinism requirement.

use std::collections::BTreeMap;

use crate::expr::Expression;

/// One ORDER BY item: its expression (for a simple `ORDER BY col`, a
/// `TupleValue`; for `ORDER BY f(col)`, whatever expression tree the
/// upstream parser produced) and ascending/descending flag.
#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expression: Expression,
    pub ascending: bool,
}

/// An unordered pair of table names, canonicalized so `(a, b)` and
/// `(b, a)` compare equal and sort identically in a `BTreeMap`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TablePair(String, String);

impl TablePair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            TablePair(a, b)
        } else {
            TablePair(b, a)
        }
    }
}

/// A parsed statement, reduced to exactly what sub-plan assembly needs.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    /// True for SELECT; the order determinator only runs for SELECTs
    /// (spec.md §4.3 precondition).
    pub is_select: bool,
    /// Single-table filters, keyed by table name.
    pub table_filters: BTreeMap<String, Vec<Expression>>,
    /// Join predicates, keyed by the unordered pair of tables they relate.
    pub join_predicates: BTreeMap<TablePair, Vec<Expression>>,
    /// Optional scan-columns projection per table name; `None` for a
    /// table means "all columns".
    pub projections: BTreeMap<String, Vec<String>>,
    /// ORDER BY items, in clause order. Only meaningful when `is_select`.
    pub order_by: Vec<OrderByItem>,
}

impl Statement {
    pub fn new(is_select: bool) -> Self {
        Self { is_select, ..Default::default() }
    }

    pub fn add_table_filter(&mut self, table: impl Into<String>, filter: Expression) {
        self.table_filters.entry(table.into()).or_default().push(filter);
    }

    pub fn add_join_predicate(&mut self, left_table: &str, right_table: &str, predicate: Expression) {
        self.join_predicates.entry(TablePair::new(left_table, right_table)).or_default().push(predicate);
    }

    pub fn set_projection(&mut self, table: impl Into<String>, columns: Vec<String>) {
        self.projections.insert(table.into(), columns);
    }

    /// The full filter list a table's access paths should be built from:
    /// its single-table filters, plus every join predicate that mentions
    /// it (from any pair it participates in).
    pub fn filters_for_table(&self, table: &str) -> Vec<Expression> {
        let mut out = self.table_filters.get(table).cloned().unwrap_or_default();
        out.extend(self.join_filters_for_table(table));
        out
    }

    /// Just the join predicates that mention `table` (from any pair it
    /// participates in), kept separate from single-table filters so
    /// callers can tag provenance (e.g. the access-path builder's
    /// `join_exprs` bucket).
    pub fn join_filters_for_table(&self, table: &str) -> Vec<Expression> {
        self.join_predicates
            .iter()
            .filter(|(pair, _)| pair.0 == table || pair.1 == table)
            .flat_map(|(_, predicates)| predicates.iter().cloned())
            .collect()
    }

    /// Order determinator input: empty unless this is a SELECT.
    pub fn effective_order_by(&self) -> &[OrderByItem] {
        if self.is_select {
            &self.order_by
        } else {
            &[]
        }
    }

    pub fn projection_for(&self, table: &str) -> Option<&[String]> {
        self.projections.get(table).map(Vec::as_slice)
    }
}
