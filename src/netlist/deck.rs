//! Assembled simulation decks.

use serde::Serialize;

use super::allocator::NodeMap;
use super::emit::{DeviceLine, Skipped};
use super::models;
use crate::config::AnalysisConfig;
use crate::quantity::format_quantity;

/// End-of-deck marker.
pub const END_MARKER: &str = ".end";

/// A complete deck and the node numbering it was built with.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationDeck {
    /// Title line text (without the leading `*`)
    pub title: String,
    /// Device lines in component order
    pub devices: Vec<DeviceLine>,
    /// Analysis settings the control section was rendered from
    #[serde(skip)]
    pub analysis: AnalysisConfig,
    /// Net name → node index for this compilation
    pub node_map: NodeMap,
    /// Components that produced no line
    pub skipped: Vec<Skipped>,
}

impl SimulationDeck {
    /// Render the deck text.
    ///
    /// Sections always appear in the same order: title, devices, model
    /// library, options, `.op`, `.tran`, `.print`, `.end`.
    pub fn to_text(&self) -> String {
        let mut text = format!("* {}\n", self.title);
        for device in &self.devices {
            text.push_str(&device.text);
            text.push('\n');
        }
        text.push_str(&models::library_text());
        text.push_str(&self.analysis.options.directive());
        text.push('\n');
        text.push_str(".op\n");
        text.push_str(&format!(
            ".tran {} {}\n",
            format_quantity(self.analysis.tran_step),
            format_quantity(self.analysis.tran_stop)
        ));
        if let Some(print) = self.print_directive() {
            text.push_str(&print);
            text.push('\n');
        }
        text.push_str(END_MARKER);
        text.push('\n');
        text
    }

    /// `.print tran v(i)…` over the nodes actually present in the map.
    fn print_directive(&self) -> Option<String> {
        let nodes = self.node_map.node_ids();
        if nodes.is_empty() {
            return None;
        }
        let columns: Vec<String> = nodes.iter().map(|n| format!("v({n})")).collect();
        Some(format!(".print tran {}", columns.join(" ")))
    }

    /// The component reference for an engine device name, any case.
    pub fn reference_of(&self, device: &str) -> Option<&str> {
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(device))
            .map(|d| d.reference.as_str())
    }

    /// Skip diagnostics as display strings.
    pub fn diagnostics(&self) -> Vec<String> {
        self.skipped.iter().map(ToString::to_string).collect()
    }
}
