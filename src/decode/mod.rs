//! Engine output decoding.
//!
//! The engine's stdout is free-form text. Transient data is located by an
//! ordered list of strategies, tried first to last; the first result with
//! enough time points is taken. Operating-point lines are always collected
//! as well, since one run prints both.
//!
//! Every strategy is total: a line or row that cannot be read is skipped and
//! never invalidates the rest of the output.

pub mod op;
pub mod tabular;
pub mod tokenizer;
pub mod vectors;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::circuit::NodeId;
use crate::config::DecodeConfig;

/// Node-indexed transient samples.
///
/// `time` is non-decreasing and every voltage vector has its length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedSeries {
    /// Sample times (seconds)
    pub time: Vec<f64>,
    /// One voltage column per node, aligned with `time`
    pub voltages: BTreeMap<NodeId, Vec<f64>>,
}

impl DecodedSeries {
    /// An empty series with a column for each node.
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            time: Vec::new(),
            voltages: nodes.into_iter().map(|n| (n, Vec::new())).collect(),
        }
    }

    /// Append one time point. Columns absent from `values` get NaN.
    pub fn push(&mut self, time: f64, values: &BTreeMap<NodeId, f64>) {
        self.time.push(time);
        for (node, column) in self.voltages.iter_mut() {
            column.push(values.get(node).copied().unwrap_or(f64::NAN));
        }
    }

    /// Number of time points.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// True when no time point has been pushed.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// A steady-state solution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatingPoint {
    /// Node voltages
    pub voltages: BTreeMap<NodeId, f64>,
    /// Branch currents keyed by lowercase engine device name
    pub currents: BTreeMap<String, f64>,
}

impl OperatingPoint {
    /// True when neither a voltage nor a current was found.
    pub fn is_empty(&self) -> bool {
        self.voltages.is_empty() && self.currents.is_empty()
    }
}

/// Everything recovered from one engine run.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedOutput {
    /// Accepted transient result
    pub transient: Option<DecodedSeries>,
    /// Non-empty operating point
    pub operating_point: Option<OperatingPoint>,
    /// Name of the strategy that produced `transient`
    pub strategy: Option<&'static str>,
}

/// A transient decoding strategy.
#[derive(Clone, Copy)]
pub struct Strategy {
    /// Name reported in logs and in [`DecodedOutput::strategy`]
    pub name: &'static str,
    /// Parser over the whole engine output
    pub parse: fn(&str) -> Option<DecodedSeries>,
}

/// Transient strategies in the order they are tried.
pub const TRANSIENT_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "tabular",
        parse: tabular::parse,
    },
    Strategy {
        name: "vectors",
        parse: vectors::parse,
    },
];

/// Decode the first acceptable transient result.
///
/// A result with fewer than `min_time_points` samples is treated as
/// truncated and the next strategy is tried.
pub fn decode_transient(output: &str, min_time_points: usize) -> Option<(&'static str, DecodedSeries)> {
    TRANSIENT_STRATEGIES.iter().find_map(|strategy| {
        let series = (strategy.parse)(output)?;
        if series.len() < min_time_points {
            debug!(
                strategy = strategy.name,
                points = series.len(),
                min_time_points,
                "transient result rejected"
            );
            return None;
        }
        Some((strategy.name, series))
    })
}

/// Decode an engine run.
///
/// Returns `None` when there is neither an accepted transient result nor a
/// non-empty operating point.
pub fn decode(output: &str, config: &DecodeConfig) -> Option<DecodedOutput> {
    let transient = decode_transient(output, config.min_time_points);
    let op = op::parse(output);
    let operating_point = (!op.is_empty()).then_some(op);

    if transient.is_none() && operating_point.is_none() {
        debug!("no usable result in engine output");
        return None;
    }

    let (strategy, transient) = match transient {
        Some((name, series)) => (Some(name), Some(series)),
        None => (None, None),
    };
    debug!(strategy, has_op = operating_point.is_some(), "engine output decoded");
    Some(DecodedOutput {
        transient,
        operating_point,
        strategy,
    })
}

/// Node of a `v(<index>)` name, any case. Ground is never a column.
pub(crate) fn parse_voltage_name(name: &str) -> Option<NodeId> {
    let inner = name
        .strip_prefix("v(")
        .or_else(|| name.strip_prefix("V("))?
        .strip_suffix(')')?;
    let index: usize = inner.trim().parse().ok()?;
    (index != 0).then_some(NodeId(index))
}
