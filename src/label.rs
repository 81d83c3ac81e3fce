//! Node-indexed results → net-named results.
//!
//! The node map is inverted so that every net name compiled into the deck,
//! junction aliases included, receives its node's signal. A node index the
//! map does not know is kept under a `node_<i>` label and reported; it means
//! the engine output and the deck disagree.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::circuit::{normalize_net, Circuit, ComponentKind, NodeId};
use crate::decode::{DecodedSeries, OperatingPoint};
use crate::netlist::{NodeMap, SimulationDeck};

/// Net-named transient samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetSeries {
    pub time: Vec<f64>,
    pub signals: BTreeMap<String, Vec<f64>>,
}

/// Inconsistencies found while labeling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelReport {
    /// Node indices with no net name, ascending, each once
    pub unmapped: Vec<NodeId>,
    pub diagnostics: Vec<String>,
}

impl LabelReport {
    fn unmapped_node(&mut self, node: NodeId) -> String {
        let label = format!("node_{node}");
        if !self.unmapped.contains(&node) {
            warn!(node = node.0, "decoded node has no net name");
            self.unmapped.push(node);
            self.unmapped.sort();
            self.diagnostics
                .push(format!("node {node} has no net name; reported as {label}"));
        }
        label
    }
}

/// Output of [`label`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledResult {
    pub series: Option<NetSeries>,
    /// `V(<net>)` and `I(<reference>)` entries
    pub operating_point: Option<BTreeMap<String, f64>>,
    pub report: LabelReport,
}

/// Label a transient series and an operating point against `deck`.
pub fn label(
    transient: Option<&DecodedSeries>,
    operating_point: Option<&OperatingPoint>,
    deck: &SimulationDeck,
) -> LabeledResult {
    let mut report = LabelReport::default();
    let series = transient.map(|s| label_series(s, &deck.node_map, &mut report));
    let operating_point = operating_point.map(|op| label_operating_point(op, deck, &mut report));
    LabeledResult {
        series,
        operating_point,
        report,
    }
}

/// Re-key a series by net name.
pub fn label_series(series: &DecodedSeries, node_map: &NodeMap, report: &mut LabelReport) -> NetSeries {
    let mut signals = BTreeMap::new();
    for (node, values) in &series.voltages {
        let nets = node_map.nets_at(*node);
        if nets.is_empty() {
            signals.insert(report.unmapped_node(*node), values.clone());
            continue;
        }
        for net in nets {
            signals.insert(net.to_string(), values.clone());
        }
    }
    NetSeries {
        time: series.time.clone(),
        signals,
    }
}

/// Re-key an operating point: voltages as `V(<net>)`, currents as
/// `I(<reference>)`.
pub fn label_operating_point(
    op: &OperatingPoint,
    deck: &SimulationDeck,
    report: &mut LabelReport,
) -> BTreeMap<String, f64> {
    let mut labeled = BTreeMap::new();
    for (node, value) in &op.voltages {
        let nets = deck.node_map.nets_at(*node);
        if nets.is_empty() {
            let label = report.unmapped_node(*node);
            labeled.insert(format!("V({label})"), *value);
            continue;
        }
        for net in nets {
            labeled.insert(format!("V({net})"), *value);
        }
    }
    for (device, value) in &op.currents {
        match deck.reference_of(device) {
            Some(reference) => {
                labeled.insert(format!("I({reference})"), *value);
            }
            None => {
                report
                    .diagnostics
                    .push(format!("current for unknown device '{device}'"));
                labeled.insert(format!("I({device})"), *value);
            }
        }
    }
    labeled
}

/// What one display-only component sees on one of its pins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReading {
    /// Display component reference
    pub probe: String,
    /// Pin label
    pub pin: String,
    /// Canonical net name
    pub net: String,
    /// Node of the net, when the net reached the deck
    pub node: Option<NodeId>,
    /// Final transient value, else the operating-point value
    pub value: Option<f64>,
}

/// Resolve every display component's pins through the node map.
///
/// Display components are never compiled, so a probe on a net no emitted
/// device touches has no node and no value.
pub fn probe_readings(circuit: &Circuit, deck: &SimulationDeck, result: &LabeledResult) -> Vec<ProbeReading> {
    let mut readings = Vec::new();
    for component in circuit
        .components
        .iter()
        .filter(|c| c.kind == ComponentKind::Display)
    {
        for pin in &component.pins {
            let net = normalize_net(&pin.net);
            if net.is_empty() {
                continue;
            }
            let node = deck.node_map.get(&net);
            let value = match node {
                Some(n) if n.is_ground() => Some(0.0),
                Some(_) => final_value(&net, result),
                None => None,
            };
            readings.push(ProbeReading {
                probe: component.display_name().to_string(),
                pin: pin.label.clone(),
                net,
                node,
                value,
            });
        }
    }
    readings
}

fn final_value(net: &str, result: &LabeledResult) -> Option<f64> {
    result
        .series
        .as_ref()
        .and_then(|s| s.signals.get(net))
        .and_then(|v| v.last().copied())
        .or_else(|| {
            result
                .operating_point
                .as_ref()
                .and_then(|op| op.get(&format!("V({net})")).copied())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Component;
    use crate::config::AnalysisConfig;
    use crate::netlist::compile;

    fn circuit() -> Circuit {
        Circuit::new(vec![
            Component::new("j", "J1", ComponentKind::Junction)
                .with_pin("1", "A")
                .with_pin("2", "B"),
            Component::new("r", "R1", ComponentKind::Resistor)
                .with_pin("1", "A")
                .with_pin("2", "GND"),
            Component::new("v", "BAT1", ComponentKind::VoltageSource)
                .with_pin("1", "GND")
                .with_pin("2", "B"),
            Component::new("s", "SCOPE", ComponentKind::Display)
                .with_pin("probe", "B")
                .with_pin("ref", "GND")
                .with_pin("aux", "FLOATING"),
        ])
    }

    fn two_node_series() -> DecodedSeries {
        let mut series = DecodedSeries::with_nodes([NodeId(1), NodeId(7)]);
        let values: BTreeMap<NodeId, f64> = [(NodeId(1), 5.0), (NodeId(7), 1.0)].into_iter().collect();
        series.push(0.0, &values);
        series.push(1e-3, &values);
        series
    }

    #[test]
    fn test_aliases_share_signal_and_unmapped_is_flagged() {
        let deck = compile(&circuit(), &AnalysisConfig::default());
        let result = label(Some(&two_node_series()), None, &deck);
        let series = result.series.unwrap();

        assert_eq!(series.signals["A"], vec![5.0, 5.0]);
        assert_eq!(series.signals["B"], vec![5.0, 5.0]);
        assert_eq!(series.signals["node_7"], vec![1.0, 1.0]);
        assert_eq!(result.report.unmapped, vec![NodeId(7)]);
        assert_eq!(result.report.diagnostics.len(), 1);
    }

    #[test]
    fn test_operating_point_keys() {
        let deck = compile(&circuit(), &AnalysisConfig::default());
        let mut op = OperatingPoint::default();
        op.voltages.insert(NodeId(1), 5.0);
        op.currents.insert("vbat1".to_string(), -5e-3);
        op.currents.insert("xghost".to_string(), 1.0);

        let result = label(None, Some(&op), &deck);
        let labeled = result.operating_point.unwrap();
        assert_eq!(labeled["V(A)"], 5.0);
        assert_eq!(labeled["V(B)"], 5.0);
        assert_eq!(labeled["I(BAT1)"], -5e-3);
        assert_eq!(labeled["I(xghost)"], 1.0);
        assert!(result.report.unmapped.is_empty());
        assert_eq!(result.report.diagnostics, vec!["current for unknown device 'xghost'"]);
    }

    #[test]
    fn test_probe_readings() {
        let circuit = circuit();
        let deck = compile(&circuit, &AnalysisConfig::default());
        let result = label(Some(&two_node_series()), None, &deck);
        let readings = probe_readings(&circuit, &deck, &result);

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].net, "B");
        assert_eq!(readings[0].value, Some(5.0));
        assert_eq!(readings[1].node, Some(NodeId::GROUND));
        assert_eq!(readings[1].value, Some(0.0));
        assert_eq!(readings[2].node, None);
        assert_eq!(readings[2].value, None);
        assert!(deck.node_map.get("FLOATING").is_none());
    }
}
