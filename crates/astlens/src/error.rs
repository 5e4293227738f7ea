//! Error types for astlens operations.
//!
//! Parse failures are deliberately absent here: adapters absorb them and turn
//! them into Error-kind nodes (see [`crate::native::ParseFailure`]). The
//! variants below cover the infrastructure around the engine: reading files,
//! loading configuration and resolving user-supplied names and identifiers.

use thiserror::Error;

/// Result type for astlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for astlens operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration file or value
    #[error("configuration error: {0}")]
    Config(String),

    /// No adapter is registered under this name
    #[error("unknown language: {0} (expected one of: lua, typescript)")]
    UnknownLanguage(String),

    /// The view mode name is not recognized
    #[error("unknown view mode: {0} (expected extended or collapsed)")]
    UnknownMode(String),

    /// A node identifier does not resolve in the requested view
    #[error("node #{id} not found ({mode} view has {count} nodes)")]
    NodeNotFound {
        /// The identifier that was looked up
        id: u32,
        /// The view the lookup ran against
        mode: crate::types::ViewMode,
        /// Number of nodes in that view
        count: usize,
    },

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
