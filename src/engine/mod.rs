//! Simulation engine invocation.
//!
//! The pipeline only needs "deck text in, engine stdout out". Anything that
//! can do that implements [`SimulationEngine`]: the external batch process
//! ([`BatchEngine`], `engine` feature), or [`RecordedOutput`] for output that
//! was produced elsewhere.

#[cfg(feature = "engine")]
mod batch;

#[cfg(feature = "engine")]
pub use batch::BatchEngine;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{NetdeckError, Result};

/// Runs a deck and returns the engine's combined output.
pub trait SimulationEngine {
    /// Run `deck` to completion, or until `cancel` is set.
    fn run(&self, deck: &str, cancel: &CancelToken) -> Result<String>;
}

/// Shared cancellation flag for one simulation request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An engine that replays output captured from an earlier run.
#[derive(Debug, Clone)]
pub struct RecordedOutput {
    output: String,
}

impl RecordedOutput {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl SimulationEngine for RecordedOutput {
    fn run(&self, _deck: &str, cancel: &CancelToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(NetdeckError::Cancelled);
        }
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_recorded_output() {
        let engine = RecordedOutput::new("v(1) = 5.0\n");
        assert_eq!(engine.run("* deck\n.end\n", &CancelToken::new()).unwrap(), "v(1) = 5.0\n");

        let cancelled = CancelToken::new();
        cancelled.cancel();
        assert!(matches!(engine.run("", &cancelled), Err(NetdeckError::Cancelled)));
    }
}
