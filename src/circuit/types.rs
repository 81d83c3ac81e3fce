//! Core types for circuit representation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A node index in a simulation deck.
/// Node 0 is always ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The ground node (always index 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Component kinds understood by the netlist compiler.
///
/// The editor sends a free-form kind keyword; anything not listed here is
/// carried as [`ComponentKind::Unsupported`] and skipped at emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    /// Resistor
    Resistor,
    /// Capacitor
    Capacitor,
    /// Diode
    Diode,
    /// Light-emitting diode
    Led,
    /// Bipolar junction transistor
    Transistor,
    /// DC voltage source (battery, supply)
    VoltageSource,
    /// Breadboard junction or splitter: all pins are one net
    Junction,
    /// Oscilloscope, probe, label: observation only, never emitted
    Display,
    /// Anything else, including parts that need an unavailable subcircuit
    Unsupported(String),
}

impl ComponentKind {
    /// Parse a kind from the editor's keyword.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "resistor" | "r" => Self::Resistor,
            "capacitor" | "c" => Self::Capacitor,
            "diode" | "d" => Self::Diode,
            "led" => Self::Led,
            "transistor" | "bjt" | "npn" | "pnp" | "q" => Self::Transistor,
            "voltage_source" | "voltagesource" | "dc_source" | "battery" | "supply" | "v" => {
                Self::VoltageSource
            }
            "junction" | "splitter" | "breadboard_junction" | "node" => Self::Junction,
            "oscilloscope" | "scope" | "probe" | "label" | "voltmeter" | "multimeter" => {
                Self::Display
            }
            _ => Self::Unsupported(keyword.trim().to_string()),
        }
    }

    /// The editor keyword for this kind.
    pub fn keyword(&self) -> &str {
        match self {
            Self::Resistor => "resistor",
            Self::Capacitor => "capacitor",
            Self::Diode => "diode",
            Self::Led => "led",
            Self::Transistor => "transistor",
            Self::VoltageSource => "voltage_source",
            Self::Junction => "junction",
            Self::Display => "oscilloscope",
            Self::Unsupported(k) => k,
        }
    }

    /// SPICE element letter for kinds that become a device line.
    pub fn spice_prefix(&self) -> Option<char> {
        match self {
            Self::Resistor => Some('R'),
            Self::Capacitor => Some('C'),
            Self::Diode | Self::Led => Some('D'),
            Self::Transistor => Some('Q'),
            Self::VoltageSource => Some('V'),
            Self::Junction | Self::Display | Self::Unsupported(_) => None,
        }
    }
}

impl From<String> for ComponentKind {
    fn from(keyword: String) -> Self {
        Self::from_keyword(&keyword)
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.keyword().to_string()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Optional polarity tag on a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Anode,
    Cathode,
}

/// One pin of a component and the net it is wired to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Kind-specific label ("1", "2", "C", "B", "E", ...)
    pub label: String,
    /// Net name; empty means unconnected
    #[serde(default)]
    pub net: String,
    /// Optional polarity tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polarity: Option<Polarity>,
}

impl Pin {
    /// Create an untagged pin.
    pub fn new(label: impl Into<String>, net: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            net: net.into(),
            polarity: None,
        }
    }

    /// Attach a polarity tag.
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }
}

/// A component as supplied by the editor. The compiler only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Stable identifier
    pub id: String,
    /// Human reference designator ("R1", "Q2")
    #[serde(default)]
    pub reference: String,
    /// Component kind
    pub kind: ComponentKind,
    /// Declared value as free text ("15kΩ")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Declared device model name ("2N3904")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Pin table in declaration order
    #[serde(default)]
    pub pins: Vec<Pin>,
}

impl Component {
    /// Create a component with no value, model or pins.
    pub fn new(id: impl Into<String>, reference: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            reference: reference.into(),
            kind,
            value: None,
            model: None,
            pins: Vec::new(),
        }
    }

    /// Set the declared value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the declared model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Append a pin.
    pub fn with_pin(mut self, label: impl Into<String>, net: impl Into<String>) -> Self {
        self.pins.push(Pin::new(label, net));
        self
    }

    /// Append a tagged pin.
    pub fn with_tagged_pin(mut self, pin: Pin) -> Self {
        self.pins.push(pin);
        self
    }

    /// Find a pin by label.
    pub fn pin(&self, label: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.label == label)
    }

    /// Reference designator, or the id when the designator is blank.
    pub fn display_name(&self) -> &str {
        if self.reference.trim().is_empty() {
            &self.id
        } else {
            &self.reference
        }
    }
}

/// A circuit snapshot: the components in editor order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Optional document title, used for the deck title line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// All components, in insertion order
    #[serde(default)]
    pub components: Vec<Component>,
}

impl Circuit {
    /// Create a circuit from components.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            title: None,
            components,
        }
    }

    /// Parse a circuit from the editor's JSON document.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text).map_err(|e| crate::NetdeckError::InvalidCircuit {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keywords() {
        assert_eq!(ComponentKind::from_keyword("Resistor"), ComponentKind::Resistor);
        assert_eq!(ComponentKind::from_keyword("battery"), ComponentKind::VoltageSource);
        assert_eq!(ComponentKind::from_keyword("splitter"), ComponentKind::Junction);
        assert_eq!(ComponentKind::from_keyword("oscilloscope"), ComponentKind::Display);
        assert_eq!(
            ComponentKind::from_keyword("opamp"),
            ComponentKind::Unsupported("opamp".to_string())
        );
    }

    #[test]
    fn test_circuit_from_json() {
        let json = r#"{
            "title": "divider",
            "components": [
                {
                    "id": "c1",
                    "reference": "R1",
                    "kind": "resistor",
                    "value": "10k",
                    "pins": [
                        {"label": "1", "net": "VCC"},
                        {"label": "2", "net": "OUT", "polarity": "positive"}
                    ]
                },
                {"id": "c2", "kind": "555_timer"}
            ]
        }"#;
        let circuit = Circuit::from_json(json).unwrap();
        assert_eq!(circuit.title.as_deref(), Some("divider"));
        assert_eq!(circuit.components.len(), 2);

        let r1 = &circuit.components[0];
        assert_eq!(r1.kind, ComponentKind::Resistor);
        assert_eq!(r1.pin("2").unwrap().polarity, Some(Polarity::Positive));

        let timer = &circuit.components[1];
        assert_eq!(timer.kind, ComponentKind::Unsupported("555_timer".to_string()));
        assert_eq!(timer.display_name(), "c2");
    }

    #[test]
    fn test_invalid_json() {
        assert!(Circuit::from_json("{ not json").is_err());
    }
}
