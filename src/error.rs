//! Error types for flatstore
//!
//! Provides a unified error type for all operations. Every error is
//! recoverable at the operation boundary — a failing operation aborts and
//! reports, it never takes the process down.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for flatstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("{table}: key {key:?} not found")]
    NotFound { table: &'static str, key: String },

    // -------------------------------------------------------------------------
    // Referential Integrity
    // -------------------------------------------------------------------------
    #[error("doctor {0:?} does not exist")]
    UnknownDoctor(String),

    // -------------------------------------------------------------------------
    // Slot / Format Errors
    // -------------------------------------------------------------------------
    #[error("record needs {needed} bytes but slot capacity is {capacity}")]
    CapacityExceeded { needed: usize, capacity: usize },

    #[error("corrupt store file: {0}")]
    Corrupt(String),

    // -------------------------------------------------------------------------
    // Collaborator-Facing Validation
    // -------------------------------------------------------------------------
    #[error("unknown field {0:?}")]
    UnknownField(String),

    #[error("invalid query: {0}")]
    Query(String),
}
