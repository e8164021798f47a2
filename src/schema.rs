//! Catalog types: tables, columns, and indexes.
//!
//! Mirrors the teacher's `TableDef`/`IndexDef`/`SchemaBuilder` split
//! (kimberlite-query's `schema` module) but strips anything tied to
//! storage (table ids, MVCC versions) since catalog persistence is out
//! of scope here — this crate only needs enough catalog shape to
//! enumerate access paths.

use crate::error::{PlannerError, Result};
use crate::expr::Expression;
use crate::value::ValueType;

/// A column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Ordinal position within the table (0-based).
    pub ordinal: usize,
    pub value_type: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, ordinal: usize, value_type: ValueType) -> Self {
        Self { name: name.into(), ordinal, value_type }
    }
}

/// Index storage kind. Only tree-balanced indexes are scannable (support
/// range iteration); hash indexes only support full-key equality lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    TreeBalanced,
    Hash,
}

impl IndexKind {
    pub fn is_scannable(self) -> bool {
        matches!(self, IndexKind::TreeBalanced)
    }
}

/// One position in an index's ordered key.
#[derive(Debug, Clone)]
pub enum KeyComponent {
    /// A simple column reference.
    Column(Column),
    /// An arbitrary expression (expression index), already parsed — e.g.
    /// a catalog that keeps a warm in-memory cache of its index
    /// expressions rather than re-parsing them.
    Expression(Expression),
    /// An arbitrary expression stored as a serialized JSON payload, not
    /// yet deserialized (spec.md §3: "identified by a serialized
    /// expression string"). [`Index::resolve_key`] deserializes it.
    ExpressionJson(String),
}

/// One position in an index's key after [`Index::resolve_key`] has
/// deserialized any [`KeyComponent::ExpressionJson`] payloads (spec.md
/// §4.4 step 1: "deserialize the expression list once").
#[derive(Debug, Clone)]
pub enum ResolvedKeyComponent {
    Column(Column),
    Expression(Expression),
}

/// An index over a table.
#[derive(Debug, Clone)]
pub struct Index {
    pub name: String,
    pub kind: IndexKind,
    pub key: Vec<KeyComponent>,
}

impl Index {
    /// True if any key component is a general expression rather than a
    /// plain column reference.
    pub fn is_expression_index(&self) -> bool {
        self.key.iter().any(|c| matches!(c, KeyComponent::Expression(_) | KeyComponent::ExpressionJson(_)))
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    /// Resolves every key component, deserializing any
    /// `KeyComponent::ExpressionJson` payload exactly once (spec.md §4.4
    /// step 1). Per spec.md §7 MALFORMED-INDEX, a payload that fails to
    /// deserialize fails the *whole* resolution; the caller (the
    /// access-path builder) treats that as "skip this index", never as a
    /// hard error propagated to the statement.
    pub fn resolve_key(&self) -> Result<Vec<ResolvedKeyComponent>> {
        self.key
            .iter()
            .map(|component| match component {
                KeyComponent::Column(col) => Ok(ResolvedKeyComponent::Column(col.clone())),
                KeyComponent::Expression(expr) => Ok(ResolvedKeyComponent::Expression(expr.clone())),
                KeyComponent::ExpressionJson(raw) => serde_json::from_str::<Expression>(raw)
                    .map(ResolvedKeyComponent::Expression)
                    .map_err(|err| PlannerError::MalformedIndexExpression {
                        index: self.name.clone(),
                        reason: err.to_string(),
                    }),
            })
            .collect()
    }
}

/// A table and its indexes.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    /// Indexes in catalog-declaration order — enumeration over this Vec
    /// is deterministic (spec.md §9) because the catalog, not a hash map,
    /// owns the order.
    pub indexes: Vec<Index>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self { name: name.into(), columns, indexes: Vec::new() }
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn add_index(&mut self, index: Index) {
        self.indexes.push(index);
    }

    /// Indexes sorted by name, for callers that want a reproducible order
    /// independent of declaration order (spec.md §9).
    pub fn indexes_sorted_by_name(&self) -> Vec<&Index> {
        let mut out: Vec<&Index> = self.indexes.iter().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

/// Builder for a table, validating column/index references as they're
/// declared rather than deferring to first use.
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { table: Table::new(name, Vec::new()) }
    }

    pub fn column(mut self, name: impl Into<String>, value_type: ValueType) -> Result<Self> {
        let name = name.into();
        if self.table.find_column(&name).is_some() {
            return Err(PlannerError::DuplicateColumn { table: self.table.name.clone(), column: name });
        }
        let ordinal = self.table.columns.len();
        self.table.columns.push(Column::new(name, ordinal, value_type));
        Ok(self)
    }

    /// Adds a simple column index.
    pub fn column_index(
        mut self,
        name: impl Into<String>,
        kind: IndexKind,
        columns: &[&str],
    ) -> Result<Self> {
        let name = name.into();
        let mut key = Vec::with_capacity(columns.len());
        for &col_name in columns {
            let col = self.table.find_column(col_name).cloned().ok_or_else(|| {
                PlannerError::IndexColumnNotFound {
                    table: self.table.name.clone(),
                    index: name.clone(),
                    column: col_name.to_string(),
                }
            })?;
            key.push(KeyComponent::Column(col));
        }
        self.table.add_index(Index { name, kind, key });
        Ok(self)
    }

    /// Adds an expression index from already-parsed key expressions.
    pub fn expression_index(
        mut self,
        name: impl Into<String>,
        kind: IndexKind,
        expressions: Vec<Expression>,
    ) -> Self {
        let key = expressions.into_iter().map(KeyComponent::Expression).collect();
        self.table.add_index(Index { name: name.into(), kind, key });
        self
    }

    /// Adds an expression index from raw serialized-expression-string
    /// payloads, one per key component, mirroring a catalog that has just
    /// loaded index metadata off disk without eagerly parsing it.
    /// Malformed payloads are not rejected here — deserialization, and
    /// the decision to skip a malformed index, happens per spec.md §4.4
    /// step 1 / §7 at access-path build time via [`Index::resolve_key`].
    pub fn expression_index_from_json(
        mut self,
        name: impl Into<String>,
        kind: IndexKind,
        expression_json_payloads: Vec<String>,
    ) -> Self {
        let key = expression_json_payloads.into_iter().map(KeyComponent::ExpressionJson).collect();
        self.table.add_index(Index { name: name.into(), kind, key });
        self
    }

    pub fn build(self) -> Table {
        self.table
    }
}
