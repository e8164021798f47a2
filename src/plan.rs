//! Scan-Node Emitter (spec.md §4.5).
//!
//! Converts a chosen [`AccessPath`] into a scan plan node, optionally
//! wrapped in a distributed send/receive pair.

use crate::access_path::{AccessPath, LookupType};
use crate::expr::Expression;
use crate::order::SortDirection;
use crate::schema::{Column, Table};

/// A conjunction of zero or more expressions. `None` represents the
/// always-true predicate (no filtering needed); `Some` is the AND of its
/// members in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate(pub Option<Vec<Expression>>);

impl Predicate {
    fn from_exprs(exprs: Vec<Expression>) -> Self {
        if exprs.is_empty() {
            Predicate(None)
        } else {
            Predicate(Some(exprs))
        }
    }

    pub fn is_always_true(&self) -> bool {
        self.0.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct OutputSchema {
    pub columns: Vec<Column>,
}

impl OutputSchema {
    /// Projects `table`'s columns down to `projection` (column names), or
    /// keeps them all when there is no projection for this table.
    pub fn compute(table: &Table, projection: Option<&[String]>) -> Self {
        let columns = match projection {
            Some(names) => names.iter().filter_map(|n| table.find_column(n).cloned()).collect(),
            None => table.columns.clone(),
        };
        OutputSchema { columns }
    }
}

#[derive(Debug, Clone)]
pub struct SequentialScanNode {
    pub table: String,
    pub predicate: Predicate,
    pub output_schema_columns: Vec<Column>,
}

#[derive(Debug, Clone)]
pub struct IndexScanNode {
    pub table: String,
    pub index: String,
    /// Right-hand sides of each `index_exprs` comparison, in key order —
    /// the concrete search keys the scan positions itself with.
    pub search_keys: Vec<Expression>,
    pub lookup_type: LookupType,
    pub sort_direction: SortDirection,
    pub key_iterate: bool,
    pub bindings: Vec<Expression>,
    pub end_predicate: Predicate,
    pub predicate: Predicate,
    pub output_schema_columns: Vec<Column>,
}

#[derive(Debug, Clone)]
pub enum ScanNode {
    Sequential(SequentialScanNode),
    Index(IndexScanNode),
}

/// A scan node, optionally wrapped in a thin, non-filtering `Projection`
/// (attaching the statement's scan-columns projection so downstream
/// consumers can read it off the tree without inspecting leaf-node
/// internals) and/or for distributed execution: a `send` node (flagged
/// multi-partition) whose parent is a `receive` node carrying the scan's
/// output schema. Both wrappers are purely additive — neither touches the
/// matching logic that produced the scan underneath.
#[derive(Debug, Clone)]
pub enum PlanNode {
    Scan(ScanNode),
    Projection { columns: Vec<Column>, child: Box<PlanNode> },
    Receive { schema_columns: Vec<Column>, send: Box<PlanNode> },
    Send { multi_partition: bool, child: Box<ScanNode> },
}

/// Emits the scan node for `path` over `table`, per spec.md §4.5.
pub fn emit_scan_node(table: &Table, projection: Option<&[String]>, path: &AccessPath<'_>) -> ScanNode {
    let schema = OutputSchema::compute(table, projection);

    match path.index {
        None => ScanNode::Sequential(SequentialScanNode {
            table: table.name.clone(),
            predicate: Predicate::from_exprs(path.other_exprs.clone()),
            output_schema_columns: schema.columns,
        }),
        Some(index) => {
            let search_keys = path
                .index_exprs
                .iter()
                .map(|c| match c {
                    Expression::Comparison { right, .. } => (**right).clone(),
                    other => other.clone(),
                })
                .collect();
            ScanNode::Index(IndexScanNode {
                table: table.name.clone(),
                index: index.name.clone(),
                search_keys,
                lookup_type: path.lookup_type,
                sort_direction: path.sort_direction,
                key_iterate: path.key_iterate,
                bindings: path.bindings.clone(),
                end_predicate: Predicate::from_exprs(path.end_exprs.clone()),
                predicate: Predicate::from_exprs(path.other_exprs.clone()),
                output_schema_columns: schema.columns,
            })
        }
    }
}

/// Wraps `scan` in a send/receive pair for a multi-partition plan.
pub fn wrap_for_distribution(scan: ScanNode, schema_columns: Vec<Column>, multi_partition: bool) -> PlanNode {
    let send = PlanNode::Send { multi_partition, child: Box::new(scan) };
    PlanNode::Receive { schema_columns, send: Box::new(send) }
}

/// Wraps `scan` in a `Projection` carrying its already-computed output
/// schema. This is a thin, non-filtering wrapper — it performs no
/// execution, only lets a caller walk a uniform `PlanNode` tree without
/// reaching into `ScanNode` variants for schema.
pub fn wrap_with_projection(scan: ScanNode, columns: Vec<Column>) -> PlanNode {
    PlanNode::Projection { columns, child: Box::new(PlanNode::Scan(scan)) }
}
