//! WASM bindings for Netdeck Core.
//!
//! The browser editor cannot spawn processes, so the engine runs elsewhere
//! (a worker, a server). These bindings cover the two ends around it:
//! compiling a circuit into a deck, and decoding the engine's output against
//! the same compilation.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmNetlist } from 'netdeck_core';
//!
//! await init();
//!
//! const netlist = new WasmNetlist(JSON.stringify(circuit));
//! const stdout = await runEngine(netlist.deck());
//! const outcome = JSON.parse(netlist.decode(stdout));
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Circuit;
use crate::config::SimulationConfig;
use crate::netlist::{self, SimulationDeck};
use crate::simulation;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// One compiled circuit.
///
/// The node numbering is fixed at construction, so the output of the deck
/// returned by [`WasmNetlist::deck`] must be decoded by the same instance.
#[wasm_bindgen]
pub struct WasmNetlist {
    circuit: Circuit,
    config: SimulationConfig,
    deck: SimulationDeck,
}

#[wasm_bindgen]
impl WasmNetlist {
    /// Compile a circuit JSON document with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new(circuit_json: &str) -> Result<WasmNetlist, JsValue> {
        Self::with_config(circuit_json, "{}")
    }

    /// Compile with a JSON configuration; omitted fields keep their defaults.
    #[wasm_bindgen]
    pub fn with_config(circuit_json: &str, config_json: &str) -> Result<WasmNetlist, JsValue> {
        let circuit = Circuit::from_json(circuit_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let config = SimulationConfig::from_json(config_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let deck = netlist::compile(&circuit, &config.analysis);
        Ok(WasmNetlist { circuit, config, deck })
    }

    /// The deck text to hand to the engine.
    #[wasm_bindgen]
    pub fn deck(&self) -> String {
        self.deck.to_text()
    }

    /// The node map as a JSON object (net name → node index).
    #[wasm_bindgen]
    pub fn node_map(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.deck.node_map).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Skipped-component diagnostics from compilation.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Vec<String> {
        self.deck.diagnostics()
    }

    /// Decode engine output and return the outcome as JSON.
    #[wasm_bindgen]
    pub fn decode(&self, engine_output: &str) -> Result<String, JsValue> {
        let outcome = simulation::interpret(&self.circuit, &self.deck, engine_output, &self.config.decode);
        serde_json::to_string(&outcome).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
