//! Error taxonomy for the sub-plan assembly stage.
//!
//! Per spec.md §7, the component never "fails closed": a malformed index,
//! a type mismatch, or an unsatisfiable match all degrade to "no access
//! path for this index", not an `Err`. `PlannerError` is reserved for
//! genuine caller misuse — an unknown table/column passed into catalog
//! construction, or an expression-index payload that won't deserialize.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error, PartialEq)]
pub enum PlannerError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column {column} on table {table}")]
    UnknownColumn { table: String, column: String },

    #[error("duplicate column {column} on table {table}")]
    DuplicateColumn { table: String, column: String },

    #[error("index {index} on table {table} references unknown column {column}")]
    IndexColumnNotFound {
        table: String,
        index: String,
        column: String,
    },

    /// Corresponds to spec.md §7 MALFORMED-INDEX. The index's serialized
    /// expression-list payload failed to deserialize. Callers building a
    /// catalog may surface this; the access-path builder itself never
    /// propagates it; it just skips the index.
    #[error("index {index} has a malformed expression payload: {reason}")]
    MalformedIndexExpression { index: String, reason: String },
}
