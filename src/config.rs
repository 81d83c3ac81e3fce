//! Configuration for deck generation, engine invocation and decoding.
//!
//! Each stage has its own config struct with `Default` values and `with_*`
//! setters. [`SimulationConfig`] bundles them and can be read from JSON; any
//! field left out keeps its default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NetdeckError, Result};

/// Default transient step in seconds.
pub const DEFAULT_TRAN_STEP: f64 = 1e-5;

/// Default transient stop time in seconds.
pub const DEFAULT_TRAN_STOP: f64 = 50e-3;

/// Fewest time points a decoded transient may have to be accepted.
pub const DEFAULT_MIN_TIME_POINTS: usize = 3;

/// Default engine timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 60.0;

/// Solver tolerances written to the `.options` directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub reltol: f64,
    pub abstol: f64,
    pub vntol: f64,
    pub gmin: f64,
    /// DC iteration limit
    pub itl1: u32,
    /// Transient per-timepoint iteration limit
    pub itl4: u32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            reltol: 1e-3,
            abstol: 1e-12,
            vntol: 1e-6,
            gmin: 1e-12,
            itl1: 500,
            itl4: 50,
        }
    }
}

impl SolverOptions {
    /// Render as an `.options` directive.
    pub fn directive(&self) -> String {
        format!(
            ".options reltol={:e} abstol={:e} vntol={:e} gmin={:e} itl1={} itl4={}",
            self.reltol, self.abstol, self.vntol, self.gmin, self.itl1, self.itl4
        )
    }
}

/// What the generated deck asks the engine to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Title used when the circuit has none
    pub title: String,
    /// Transient step (seconds)
    pub tran_step: f64,
    /// Transient stop time (seconds)
    pub tran_stop: f64,
    /// Solver tolerances
    pub options: SolverOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            title: "netdeck circuit".to_string(),
            tran_step: DEFAULT_TRAN_STEP,
            tran_stop: DEFAULT_TRAN_STOP,
            options: SolverOptions::default(),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transient step and stop time (seconds).
    pub fn with_transient(mut self, step: f64, stop: f64) -> Self {
        self.tran_step = step;
        self.tran_stop = stop;
        self
    }

    /// Set the fallback title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the solver tolerances.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }
}

/// How engine output is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Transient results with fewer points are treated as truncated
    pub min_time_points: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            min_time_points: DEFAULT_MIN_TIME_POINTS,
        }
    }
}

impl DecodeConfig {
    /// Set the minimum accepted number of time points.
    pub fn with_min_time_points(mut self, min_time_points: usize) -> Self {
        self.min_time_points = min_time_points;
        self
    }
}

/// How the external engine is started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable name or path
    pub executable: String,
    /// Arguments placed before the deck path
    pub args: Vec<String>,
    /// Wall-clock limit for one run (seconds)
    pub timeout_secs: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: "ngspice".to_string(),
            args: vec!["-b".to_string()],
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for an arbitrary executable.
    pub fn new(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
            ..Self::default()
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }

    /// The timeout as a [`Duration`]; negative or NaN values mean zero.
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs).unwrap_or(Duration::ZERO)
    }
}

/// Configuration for a whole simulation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub analysis: AnalysisConfig,
    pub decode: DecodeConfig,
    pub engine: EngineConfig,
}

impl SimulationConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| NetdeckError::InvalidConfig {
            message: e.to_string(),
        })
    }
}
