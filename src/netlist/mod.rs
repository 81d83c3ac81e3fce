//! Circuit → simulation deck compilation.
//!
//! [`compile`] runs one pass over the components in editor order:
//!
//! 1. Junction groups are merged up front ([`JunctionResolver`]).
//! 2. Each component is emitted ([`DeviceEmitter`]), touching its pins in the
//!    kind's fixed order. Nodes are allocated on first touch.
//! 3. The deck is assembled around the device lines ([`SimulationDeck`]).
//!
//! The allocator lives only for the duration of one call, so concurrent
//! compilations never share numbering.
//!
//! # Example
//!
//! ```text
//! * divider
//! R1 1 2 10k
//! R2 2 0 10k
//! V1 1 0 DC 9
//! * device models
//! .model D1N4148 D(...)
//! .options reltol=1e-3 ...
//! .op
//! .tran 10u 50m
//! .print tran v(1) v(2)
//! .end
//! ```

mod allocator;
mod deck;
mod emit;
mod junction;
pub mod models;

pub use allocator::{NodeAllocator, NodeMap};
pub use deck::{SimulationDeck, END_MARKER};
pub use emit::{
    DeviceEmitter, DeviceLine, Emission, SkipReason, Skipped, DEFAULT_CAPACITANCE,
    DEFAULT_RESISTANCE, DEFAULT_SOURCE_VOLTAGE,
};
pub use junction::JunctionResolver;

use tracing::{debug, info};

use crate::circuit::Circuit;
use crate::config::AnalysisConfig;

/// Compile a circuit into a deck.
pub fn compile(circuit: &Circuit, config: &AnalysisConfig) -> SimulationDeck {
    let junctions = JunctionResolver::from_circuit(circuit);
    let mut allocator = NodeAllocator::with_aliases(junctions.aliases());
    let mut emitter = DeviceEmitter::new();

    let mut devices = Vec::new();
    let mut skipped = Vec::new();
    for component in &circuit.components {
        match emitter.emit(component, &mut allocator, &junctions) {
            Emission::Line(line) => devices.push(line),
            Emission::Skipped(skip) => skipped.push(skip),
            Emission::Merged | Emission::Observed => {
                debug!(component = component.display_name(), "no device line");
            }
        }
    }

    let node_map = allocator.finish();
    info!(
        devices = devices.len(),
        nodes = node_map.node_ids().len(),
        skipped = skipped.len(),
        "compiled deck"
    );

    let title = circuit
        .title
        .as_deref()
        .map(single_line)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| single_line(&config.title));

    SimulationDeck {
        title,
        devices,
        analysis: config.clone(),
        node_map,
        skipped,
    }
}

/// Title text safe for the `*` comment line: control characters become
/// spaces and whitespace runs collapse to one.
fn single_line(title: &str) -> String {
    title
        .split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Component, ComponentKind, NodeId};

    fn divider() -> Circuit {
        Circuit::new(vec![
            Component::new("c1", "R1", ComponentKind::Resistor)
                .with_value("10k")
                .with_pin("1", "VIN")
                .with_pin("2", "MID"),
            Component::new("c2", "R2", ComponentKind::Resistor)
                .with_value("10k")
                .with_pin("1", "MID")
                .with_pin("2", "GND"),
            Component::new("c3", "V1", ComponentKind::VoltageSource)
                .with_value("9")
                .with_pin("1", "gnd")
                .with_pin("2", "VIN"),
        ])
    }

    #[test]
    fn test_deck_section_order() {
        let deck = compile(&divider(), &AnalysisConfig::default());
        let text = deck.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "* netdeck circuit");
        assert_eq!(&lines[1..4], &["R1 1 2 10k", "R2 2 0 10k", "V1 1 0 DC 9"]);
        assert_eq!(lines[4], "* device models");

        let pos = |needle: &str| lines.iter().position(|l| l.starts_with(needle)).unwrap();
        assert!(pos(".model") < pos(".options"));
        let op = lines.iter().position(|l| *l == ".op").unwrap();
        assert!(pos(".options") < op);
        assert!(op < pos(".tran"));
        assert!(pos(".tran") < pos(".print"));
        assert_eq!(lines.last(), Some(&".end"));
        assert_eq!(lines.iter().filter(|l| **l == ".end").count(), 1);
        assert!(text.contains(".tran 10u 50m\n"));
        assert!(text.contains(".print tran v(1) v(2)\n"));
    }

    #[test]
    fn test_title_from_circuit() {
        let mut circuit = divider();
        circuit.title = Some("  divider  ".to_string());
        assert_eq!(compile(&circuit, &AnalysisConfig::default()).title, "divider");
    }

    #[test]
    fn test_title_stays_on_one_line() {
        let mut circuit = divider();
        circuit.title = Some("demo\n.end\r\nV9 1 0 DC 100\t\u{7}x".to_string());
        let deck = compile(&circuit, &AnalysisConfig::default());
        let text = deck.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "* demo .end V9 1 0 DC 100 x");
        assert_eq!(lines.iter().filter(|l| **l == END_MARKER).count(), 1);
        assert!(!lines.iter().any(|l| l.starts_with("V9")));

        let config = AnalysisConfig::default().with_title("line one\n.control");
        let deck = compile(&Circuit::default(), &config);
        assert_eq!(deck.title, "line one .control");
    }

    #[test]
    fn test_empty_circuit_has_no_print() {
        let deck = compile(&Circuit::default(), &AnalysisConfig::default());
        let text = deck.to_text();
        assert!(!text.contains(".print"));
        assert!(text.ends_with(".op\n.tran 10u 50m\n.end\n"));
    }

    #[test]
    fn test_ground_only_at_zero() {
        let deck = compile(&divider(), &AnalysisConfig::default());
        assert_eq!(deck.node_map.get("GND"), Some(NodeId::GROUND));
        let zeros: Vec<&str> = deck
            .node_map
            .iter()
            .filter(|(_, id)| id.is_ground())
            .map(|(name, _)| name)
            .collect();
        assert_eq!(zeros, vec!["0"]);
    }

    #[test]
    fn test_device_lookup() {
        let deck = compile(&divider(), &AnalysisConfig::default());
        assert_eq!(deck.reference_of("v1"), Some("V1"));
        assert_eq!(deck.reference_of("R2"), Some("R2"));
        assert_eq!(deck.reference_of("x1"), None);
        assert!(deck.diagnostics().is_empty());
    }

    #[test]
    fn test_skips_are_reported() {
        let mut circuit = divider();
        circuit
            .components
            .push(Component::new("c4", "R3", ComponentKind::Resistor).with_pin("1", "MID"));
        let deck = compile(&circuit, &AnalysisConfig::default());
        assert_eq!(deck.devices.len(), 3);
        assert_eq!(deck.diagnostics(), vec!["R3: skipped, pin '2' is not connected"]);
    }
}
