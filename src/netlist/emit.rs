//! Device line emission.
//!
//! Each component becomes at most one device line. Pins are visited in a
//! fixed order per kind, and that order is what numbers the nodes:
//!
//! | Kind | Touch order | Line |
//! |------|-------------|------|
//! | R, C | "1", "2" | `R<name> <1> <2> <value>` |
//! | Diode, LED | "1", "2" | `D<name> <anode> <cathode> <model>` |
//! | Voltage source | "2" (+), "1" (-) | `V<name> <+> <-> DC <value>` |
//! | Transistor | "C", "B", "E" | `Q<name> <c> <b> <e> <model>` |
//!
//! Required pins are checked before anything is touched, so a skipped
//! component never allocates a node.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::allocator::NodeAllocator;
use super::junction::JunctionResolver;
use super::models::{
    self, DEFAULT_DIODE, DEFAULT_LED, DEFAULT_TRANSISTOR, DIODE_MODELS, LED_MODELS,
    TRANSISTOR_MODELS,
};
use crate::circuit::{normalize_net, Component, ComponentKind, Pin, Polarity};
use crate::quantity::{format_quantity, parse_quantity};

/// Default resistance (ohms).
pub const DEFAULT_RESISTANCE: f64 = 1e3;

/// Default capacitance (farads).
pub const DEFAULT_CAPACITANCE: f64 = 1e-6;

/// Default source voltage (volts).
pub const DEFAULT_SOURCE_VOLTAGE: f64 = 5.0;

/// One emitted device line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceLine {
    /// Deck device name ("R1")
    pub name: String,
    /// Reference designator of the source component
    pub reference: String,
    /// Full line text
    pub text: String,
}

/// Why a component produced no line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// A required pin is absent or unconnected
    MissingPin { pin: String },
    /// The kind cannot be simulated
    Unsupported { kind: String },
}

/// A skipped component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    /// Reference designator (or id)
    pub component: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::MissingPin { pin } => {
                write!(f, "{}: skipped, pin '{}' is not connected", self.component, pin)
            }
            SkipReason::Unsupported { kind } => {
                write!(f, "{}: skipped, kind '{}' is not supported", self.component, kind)
            }
        }
    }
}

/// Result of emitting one component.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// A device line
    Line(DeviceLine),
    /// A junction merged its nets; no line
    Merged,
    /// A display-only component; nothing touched
    Observed,
    /// Skipped with a diagnostic
    Skipped(Skipped),
}

/// Converts components to device lines, allocating nodes as it goes.
#[derive(Debug, Default)]
pub struct DeviceEmitter {
    used_names: HashSet<String>,
}

impl DeviceEmitter {
    /// Create an emitter with no names taken.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one component.
    pub fn emit(
        &mut self,
        component: &Component,
        allocator: &mut NodeAllocator,
        junctions: &JunctionResolver,
    ) -> Emission {
        match &component.kind {
            ComponentKind::Resistor => self.two_terminal(
                component,
                allocator,
                format_quantity(parse_value(component, DEFAULT_RESISTANCE)),
            ),
            ComponentKind::Capacitor => self.two_terminal(
                component,
                allocator,
                format_quantity(parse_value(component, DEFAULT_CAPACITANCE)),
            ),
            ComponentKind::Diode => {
                let model = models::select_model(DIODE_MODELS, component.model.as_deref(), DEFAULT_DIODE);
                self.diode(component, allocator, model)
            }
            ComponentKind::Led => {
                let declared = component.model.as_deref().or(component.value.as_deref());
                let model = models::select_model(LED_MODELS, declared, DEFAULT_LED);
                self.diode(component, allocator, model)
            }
            ComponentKind::VoltageSource => self.voltage_source(component, allocator),
            ComponentKind::Transistor => self.transistor(component, allocator),
            ComponentKind::Junction => {
                junctions.resolve(component, allocator);
                Emission::Merged
            }
            ComponentKind::Display => Emission::Observed,
            ComponentKind::Unsupported(kind) => {
                warn!(component = component.display_name(), kind = %kind, "unsupported component skipped");
                Emission::Skipped(Skipped {
                    component: component.display_name().to_string(),
                    reason: SkipReason::Unsupported { kind: kind.clone() },
                })
            }
        }
    }

    fn two_terminal(&mut self, component: &Component, allocator: &mut NodeAllocator, value: String) -> Emission {
        let nets = match required_nets(component, &["1", "2"]) {
            Ok(nets) => nets,
            Err(skipped) => return skipped,
        };
        let n1 = allocator.touch(&nets[0]);
        let n2 = allocator.touch(&nets[1]);
        self.line(component, format!("{n1} {n2} {value}"))
    }

    fn diode(&mut self, component: &Component, allocator: &mut NodeAllocator, model: &str) -> Emission {
        let nets = match required_nets(component, &["1", "2"]) {
            Ok(nets) => nets,
            Err(skipped) => return skipped,
        };
        let n1 = allocator.touch(&nets[0]);
        let n2 = allocator.touch(&nets[1]);
        let (anode, cathode) = if is_reversed(component, Polarity::Cathode, Polarity::Anode) {
            (n2, n1)
        } else {
            (n1, n2)
        };
        self.line(component, format!("{anode} {cathode} {model}"))
    }

    fn voltage_source(&mut self, component: &Component, allocator: &mut NodeAllocator) -> Emission {
        let reversed = is_reversed(component, Polarity::Positive, Polarity::Negative);
        let order: &[&str] = if reversed { &["1", "2"] } else { &["2", "1"] };
        let nets = match required_nets(component, order) {
            Ok(nets) => nets,
            Err(skipped) => return skipped,
        };
        let pos = allocator.touch(&nets[0]);
        let neg = allocator.touch(&nets[1]);
        let value = format_quantity(parse_value(component, DEFAULT_SOURCE_VOLTAGE));
        self.line(component, format!("{pos} {neg} DC {value}"))
    }

    fn transistor(&mut self, component: &Component, allocator: &mut NodeAllocator) -> Emission {
        let nets = match required_nets(component, &["C", "B", "E"]) {
            Ok(nets) => nets,
            Err(skipped) => return skipped,
        };
        let c = allocator.touch(&nets[0]);
        let b = allocator.touch(&nets[1]);
        let e = allocator.touch(&nets[2]);
        let model = models::select_model(TRANSISTOR_MODELS, component.model.as_deref(), DEFAULT_TRANSISTOR);
        self.line(component, format!("{c} {b} {e} {model}"))
    }

    fn line(&mut self, component: &Component, body: String) -> Emission {
        let name = self.device_name(component);
        debug!(device = %name, "emitted");
        Emission::Line(DeviceLine {
            text: format!("{name} {body}"),
            name,
            reference: component.display_name().to_string(),
        })
    }

    /// SPICE type letter plus the sanitized designator, unique within the deck.
    fn device_name(&mut self, component: &Component) -> String {
        let prefix = component.kind.spice_prefix().unwrap_or('X');
        let sanitized: String = component
            .display_name()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        let base = if sanitized
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&prefix))
        {
            sanitized
        } else {
            format!("{prefix}{sanitized}")
        };

        let mut name = base.clone();
        let mut suffix = 2;
        while !self.used_names.insert(name.to_ascii_lowercase()) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        name
    }
}

/// Parse the declared value, or the kind default.
fn parse_value(component: &Component, default: f64) -> f64 {
    component
        .value
        .as_deref()
        .map(|v| parse_quantity(v, default))
        .unwrap_or(default)
}

/// Nets of the required pins, in `labels` order, or the skip diagnostic.
fn required_nets(component: &Component, labels: &[&str]) -> Result<Vec<String>, Emission> {
    labels
        .iter()
        .map(|label| {
            component
                .pin(label)
                .map(|pin| normalize_net(&pin.net))
                .filter(|net| !net.is_empty())
                .ok_or_else(|| {
                    debug!(component = component.display_name(), pin = label, "required pin not connected");
                    Emission::Skipped(Skipped {
                        component: component.display_name().to_string(),
                        reason: SkipReason::MissingPin {
                            pin: label.to_string(),
                        },
                    })
                })
        })
        .collect()
}

/// True when polarity tags put `first` on pin "2" or `second` on pin "1".
///
/// Pin "1" is the anode / negative terminal only by convention; tags win.
fn is_reversed(component: &Component, on_pin1_means_swap: Polarity, on_pin2_means_swap: Polarity) -> bool {
    let tag = |label: &str| component.pin(label).and_then(|p: &Pin| p.polarity);
    tag("1") == Some(on_pin1_means_swap) || tag("2") == Some(on_pin2_means_swap)
}
