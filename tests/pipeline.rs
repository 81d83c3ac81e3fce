//! End-to-end compile → decode → label behaviour with recorded engine output.

use approx::assert_relative_eq;
use netdeck_core::circuit::{Component, ComponentKind, NodeId};
use netdeck_core::config::{AnalysisConfig, SimulationConfig};
use netdeck_core::decode::tabular;
use netdeck_core::simulation::ResultSource;
use netdeck_core::{compile, simulate, CancelToken, Circuit, RecordedOutput};

fn resistor(reference: &str, a: &str, b: &str) -> Component {
    Component::new(reference.to_lowercase(), reference, ComponentKind::Resistor)
        .with_value("1k")
        .with_pin("1", a)
        .with_pin("2", b)
}

fn source(reference: &str, volts: &str, pos: &str, neg: &str) -> Component {
    Component::new(reference.to_lowercase(), reference, ComponentKind::VoltageSource)
        .with_value(volts)
        .with_pin("1", neg)
        .with_pin("2", pos)
}

fn junction(reference: &str, nets: &[&str]) -> Component {
    nets.iter().enumerate().fold(
        Component::new(reference.to_lowercase(), reference, ComponentKind::Junction),
        |c, (i, net)| c.with_pin((i + 1).to_string(), *net),
    )
}

fn run(circuit: &Circuit, output: &str) -> netdeck_core::SimulationOutcome {
    simulate(
        circuit,
        &RecordedOutput::new(output),
        &SimulationConfig::default(),
        &CancelToken::new(),
    )
}

#[test]
fn ground_is_zero_and_only_ground_is_zero() {
    let circuit = Circuit::new(vec![
        source("V1", "9", "VIN", "gnd"),
        resistor("R1", "VIN", "MID"),
        resistor("R2", "MID", "AGND"),
        resistor("R3", "MID", "0"),
        resistor("R4", "MID", "Ground"),
    ]);
    let deck = compile(&circuit, &AnalysisConfig::default());
    for alias in ["0", "GND", "gnd", "AGND", "DGND", "ground"] {
        assert_eq!(deck.node_map.get(alias), Some(NodeId::GROUND));
    }
    for (name, node) in deck.node_map.iter() {
        assert_eq!(node.is_ground(), name == "0", "{name}");
    }
}

#[test]
fn every_wired_net_gets_a_unique_index() {
    let circuit = Circuit::new(vec![
        source("V1", "5", "A", "GND"),
        resistor("R1", "A", "B"),
        resistor("R2", "B", "C"),
        resistor("R3", "C", "GND"),
        resistor("R4", "A", "C"),
    ]);
    let deck = compile(&circuit, &AnalysisConfig::default());
    let ids: Vec<NodeId> = ["A", "B", "C"]
        .iter()
        .map(|n| deck.node_map.get(n).unwrap())
        .collect();
    assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3)]);
    assert_eq!(deck.node_map.len(), 4);
    assert!(deck.to_text().contains(".print tran v(1) v(2) v(3)\n"));
}

#[test]
fn compilation_is_deterministic() {
    let circuit = Circuit::new(vec![
        junction("J1", &["X", "Y"]),
        source("V1", "3.3", "Y", "GND"),
        resistor("R1", "X", "Z"),
        resistor("R2", "Z", "GND"),
    ]);
    let first = compile(&circuit, &AnalysisConfig::default());
    let second = compile(&circuit, &AnalysisConfig::default());
    assert_eq!(first.node_map, second.node_map);
    assert_eq!(first.to_text(), second.to_text());
}

#[test]
fn junction_merges_both_nets() {
    let circuit = Circuit::new(vec![junction("J1", &["A", "B"]), resistor("R1", "A", "GND")]);
    let deck = compile(&circuit, &AnalysisConfig::default());
    let a = deck.node_map.get("A").unwrap();
    assert_eq!(deck.node_map.get("B"), Some(a));
    assert!(!a.is_ground());
}

#[test]
fn junction_after_devices_keeps_lines_consistent() {
    // The source touches B before the junction is reached.
    let circuit = Circuit::new(vec![
        resistor("R1", "A", "GND"),
        source("V1", "5", "B", "GND"),
        junction("J1", &["A", "B"]),
    ]);
    let deck = compile(&circuit, &AnalysisConfig::default());
    let text = deck.to_text();
    assert!(text.contains("R1 1 0 1k\n"));
    assert!(text.contains("V1 1 0 DC 5\n"));
    assert_eq!(deck.node_map.node_ids(), vec![NodeId(1)]);
}

#[test]
fn lone_oscilloscope_is_invisible() {
    let circuit = Circuit::new(vec![Component::new("s", "SCOPE1", ComponentKind::Display)
        .with_pin("ch1", "PROBE")
        .with_pin("gnd", "GND")]);
    let deck = compile(&circuit, &AnalysisConfig::default());
    assert!(deck.devices.is_empty());
    assert!(deck.node_map.is_empty());
    assert_eq!(deck.node_map.get("PROBE"), None);
    assert!(!deck.to_text().contains("SCOPE1"));
}

#[test]
fn run_together_row_is_split() {
    let output = "\
Index   time            v(1)            v(2)
--------------------------------------------------------------------------------
4999994.999830e-024.999830e-025.000000e+00
";
    let series = tabular::parse(output).unwrap();
    assert_eq!(series.len(), 1);
    assert_relative_eq!(series.time[0], 4.999830e-02);
    assert_relative_eq!(series.voltages[&NodeId(1)][0], 4.999830e-02);
    assert_relative_eq!(series.voltages[&NodeId(2)][0], 5.0);
}

#[test]
fn five_volts_across_one_kilohm_falls_back_to_ohms_law() {
    let circuit = Circuit::new(vec![source("V1", "5V", "VCC", "GND"), resistor("R1", "VCC", "GND")]);
    let outcome = run(&circuit, "ngspice: fatal error, no output\n");

    assert!(outcome.success);
    assert_eq!(outcome.source, Some(ResultSource::AnalyticFallback));
    let op = outcome.operating_point.unwrap();
    assert_relative_eq!(op["I(R1)"], 0.005);
    let series = outcome.series.unwrap();
    assert_eq!(series.time.len(), 2);
    assert_eq!(series.signals["VCC"], vec![5.0, 5.0]);
}

#[test]
fn two_point_transient_is_not_a_result() {
    let circuit = Circuit::new(vec![
        source("V1", "5", "VCC", "GND"),
        resistor("R1", "VCC", "OUT"),
        resistor("R2", "OUT", "GND"),
    ]);
    let two_points = "\
Index   time            v(1)            v(2)
0       0.000000e+00    5.000000e+00    2.500000e+00
1       1.000000e-05    5.000000e+00    2.500000e+00
";
    let outcome = run(&circuit, two_points);
    assert!(!outcome.success);
    assert!(outcome.series.is_none());

    // With an operating point present the run succeeds but still has no transient.
    let outcome = run(&circuit, &format!("{two_points}V(2)  2.5\n"));
    assert!(outcome.success);
    assert!(outcome.series.is_none());
    assert_eq!(outcome.operating_point.unwrap()["V(OUT)"], 2.5);
}

#[test]
fn engine_table_is_labeled_by_net() {
    let circuit = Circuit::new(vec![
        source("V1", "5", "VCC", "GND"),
        resistor("R1", "VCC", "OUT"),
        resistor("R2", "OUT", "GND"),
        Component::new("scope", "SCOPE", ComponentKind::Display).with_pin("ch1", "OUT"),
        Component::new("u1", "U1", ComponentKind::from_keyword("555"))
            .with_pin("1", "VCC")
            .with_pin("8", "GND"),
    ]);
    let output = "\
Index   time            v(1)            v(2)            v(3)
0       0.000000e+00    5.000000e+00    2.500000e+00    0.0
1       1.000000e-05    5.000000e+00    2.500000e+00    0.0
2       2.000000e-05    5.000000e+00    2.500000e+00    0.0
";
    let outcome = run(&circuit, output);
    assert!(outcome.success);
    assert_eq!(outcome.source, Some(ResultSource::Engine));

    let series = outcome.series.unwrap();
    assert_eq!(series.signals["VCC"], vec![5.0; 3]);
    assert_eq!(series.signals["OUT"], vec![2.5; 3]);
    assert_eq!(series.signals["node_3"], vec![0.0; 3]);
    assert_eq!(outcome.unmapped, vec![NodeId(3)]);

    assert!(outcome.diagnostics.iter().any(|d| d.starts_with("U1: skipped")));
    assert!(outcome.diagnostics.iter().any(|d| d.contains("node 3")));
    assert_eq!(outcome.probes.len(), 1);
    assert_eq!(outcome.probes[0].value, Some(2.5));
}

#[test]
fn outcome_serializes_for_the_editor() {
    let circuit = Circuit::new(vec![source("V1", "5", "VCC", "GND"), resistor("R1", "VCC", "GND")]);
    let outcome = run(&circuit, "");
    let json: serde_json::Value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["source"], "analytic_fallback");
    assert_eq!(json["series"]["signals"]["VCC"][1], 5.0);
    assert!(json["error"].is_null());
}
