//! One simulation request from circuit to labeled result.
//!
//! ```text
//! Circuit ──compile──▶ SimulationDeck ──engine──▶ stdout ──decode──▶ DecodedOutput
//!                           │                                          │ (nothing usable)
//!                           └───────────── analytic fallback ◀─────────┘
//!                                                  │
//!                                   label (NodeMap inverse) ──▶ SimulationOutcome
//! ```
//!
//! Engine failures end the request with `success = false`; the fallback is
//! never consulted for them. A decode that finds nothing tries the fallback,
//! and when that refuses too the request still completes normally.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::circuit::{Circuit, NodeId};
use crate::config::{DecodeConfig, SimulationConfig};
use crate::decode;
use crate::engine::{CancelToken, SimulationEngine};
use crate::error::NetdeckError;
use crate::fallback;
use crate::label::{self, LabeledResult, NetSeries, ProbeReading};
use crate::netlist::{self, SimulationDeck};

/// Where a successful result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Engine,
    AnalyticFallback,
}

/// The product of one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub success: bool,
    /// Net-named transient samples
    pub series: Option<NetSeries>,
    /// `V(<net>)` / `I(<reference>)` steady-state values
    pub operating_point: Option<BTreeMap<String, f64>>,
    /// Why the request failed
    pub error: Option<String>,
    /// Skipped components, unmapped nodes and other non-fatal findings
    pub diagnostics: Vec<String>,
    pub source: Option<ResultSource>,
    /// Decoded node indices the node map has no name for
    pub unmapped: Vec<NodeId>,
    /// Values seen by display-only components
    pub probes: Vec<ProbeReading>,
}

impl SimulationOutcome {
    fn failed(error: &NetdeckError, diagnostics: Vec<String>) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            diagnostics,
            ..Self::default()
        }
    }

    fn labeled(
        source: ResultSource,
        result: LabeledResult,
        probes: Vec<ProbeReading>,
        mut diagnostics: Vec<String>,
    ) -> Self {
        diagnostics.extend(result.report.diagnostics);
        Self {
            success: true,
            series: result.series,
            operating_point: result.operating_point,
            error: None,
            diagnostics,
            source: Some(source),
            unmapped: result.report.unmapped,
            probes,
        }
    }
}

/// Compile `circuit`, run it on `engine` and label the result.
pub fn simulate(
    circuit: &Circuit,
    engine: &dyn SimulationEngine,
    config: &SimulationConfig,
    cancel: &CancelToken,
) -> SimulationOutcome {
    let deck = netlist::compile(circuit, &config.analysis);

    let output = engine.run(&deck.to_text(), cancel).and_then(|output| {
        if cancel.is_cancelled() {
            Err(NetdeckError::Cancelled)
        } else {
            Ok(output)
        }
    });

    match output {
        Ok(output) => interpret(circuit, &deck, &output, &config.decode),
        Err(err) => {
            warn!(error = %err, "engine invocation failed");
            SimulationOutcome::failed(&err, deck.diagnostics())
        }
    }
}

/// Decode and label engine output for an already compiled deck.
///
/// Falls back to the analytic solver when the output holds nothing usable.
pub fn interpret(
    circuit: &Circuit,
    deck: &SimulationDeck,
    output: &str,
    config: &DecodeConfig,
) -> SimulationOutcome {
    let mut diagnostics = deck.diagnostics();

    if let Some(decoded) = decode::decode(output, config) {
        info!(strategy = decoded.strategy, "engine result decoded");
        let result = label::label(decoded.transient.as_ref(), decoded.operating_point.as_ref(), deck);
        let probes = label::probe_readings(circuit, deck, &result);
        return SimulationOutcome::labeled(ResultSource::Engine, result, probes, diagnostics);
    }

    match fallback::solve(&deck.to_text()) {
        Ok(solution) => {
            diagnostics.push("engine output held no usable result; analytic fallback used".to_string());
            let result = label::label(Some(&solution.series), Some(&solution.operating_point), deck);
            let probes = label::probe_readings(circuit, deck, &result);
            SimulationOutcome::labeled(ResultSource::AnalyticFallback, result, probes, diagnostics)
        }
        Err(err) => {
            info!(error = %err, "no result available");
            SimulationOutcome::failed(&err, diagnostics)
        }
    }
}
