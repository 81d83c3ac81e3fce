//! Error types for the netdeck compiler and decoder.
//!
//! This module provides a unified error type [`NetdeckError`] for the
//! conditions that abort a simulation request. Per-component defects and
//! per-row decode defects are not errors: they are skipped and reported as
//! diagnostics by the stage that found them.

use thiserror::Error;

/// Result type alias using [`NetdeckError`].
pub type Result<T> = std::result::Result<T, NetdeckError>;

/// Unified error type for all netdeck operations.
#[derive(Error, Debug)]
pub enum NetdeckError {
    // ============ Input Errors ============
    /// The circuit document could not be deserialized
    #[error("Invalid circuit document: {message}")]
    InvalidCircuit { message: String },

    /// The configuration document could not be deserialized
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Engine Invocation Errors ============
    /// The engine executable could not be started
    #[error("Simulation engine '{executable}' could not be started: {message}")]
    EngineNotFound { executable: String, message: String },

    /// The engine exited with a failure status
    #[error("Simulation engine exited with {status}:\n{output}")]
    EngineFailed { status: String, output: String },

    /// The engine did not finish in time
    #[error("Simulation engine timed out after {seconds:.1} s")]
    EngineTimeout { seconds: f64 },

    /// The run was cancelled by the caller
    #[error("Simulation cancelled")]
    Cancelled,

    // ============ Result Errors ============
    /// Neither the engine output nor the analytic fallback produced a result
    #[error("No usable simulation result: {message}")]
    FallbackUnavailable { message: String },

    // ============ I/O Errors ============
    /// Error reading an input file
    #[error("Failed to read '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error preparing or collecting the engine's working area
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetdeckError {
    /// Create an engine failure error
    pub fn engine_failed(status: impl Into<String>, output: impl Into<String>) -> Self {
        Self::EngineFailed {
            status: status.into(),
            output: output.into(),
        }
    }

    /// Create a fallback failure error
    pub fn fallback_unavailable(message: impl Into<String>) -> Self {
        Self::FallbackUnavailable {
            message: message.into(),
        }
    }
}
