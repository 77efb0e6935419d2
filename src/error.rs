//! Error types for the ambient (non-kernel-invariant) failure boundaries.
//!
//! Bounds violations, unknown vertex references, and ITL dimension
//! mismatches are programmer errors and panic instead of returning a
//! `Result` here — see the crate-level docs for the rationale.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration and I/O boundaries.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced at startup or during ITL table I/O.
#[derive(Debug, Error)]
pub enum SimError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config line was not of the form `key: value`.
    #[error("malformed config line {line_no} in {path}: {line:?}")]
    ConfigMalformed {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    /// A required config key was missing.
    #[error("missing required config key {0:?}")]
    ConfigMissingKey(String),

    /// A config value failed to parse as the expected type.
    #[error("config key {key:?} has invalid value {value:?}")]
    ConfigInvalidValue { key: String, value: String },

    /// The distribution-parameter file could not be read.
    #[error("failed to read distribution parameter file {path}: {source}")]
    DistParamsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic I/O failure (trace files, ITL cache).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An ITL cache row did not parse as comma-separated floats.
    #[error("malformed ITL cache row {row} in {path}: {detail}")]
    ItlCacheMalformed {
        path: PathBuf,
        row: usize,
        detail: String,
    },
}
