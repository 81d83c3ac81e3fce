//! # Netdeck Core
//!
//! Netlist compiler and simulation-result decoder for a browser circuit
//! editor.
//!
//! This library provides:
//! - Compilation of a component graph into a SPICE-style simulation deck
//! - Batch invocation of an external engine (ngspice by default)
//! - Decoding of the engine's free-form text output
//! - Labeling of node-indexed results back to the editor's net names
//!
//! ## Architecture
//!
//! - [`quantity`] - SI-prefixed value parsing and formatting
//! - [`circuit`] - Editor-facing circuit types and net name normalization
//! - [`netlist`] - Node allocation, junctions, device lines, deck assembly
//! - [`engine`] - The engine seam and the batch process runner
//! - [`decode`] - Ordered decoding strategies for engine output
//! - [`fallback`] - Analytic answer for the lone source + resistor case
//! - [`label`] - Node index → net name re-keying
//! - [`simulation`] - The request pipeline tying it together
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! netdeck circuit.json --timeout-secs 30 > outcome.json
//! netdeck circuit.json --emit-deck > circuit.cir
//! ```
//!
//! ### Library
//!
//! ```no_run
//! use netdeck_core::{simulate, BatchEngine, CancelToken, Circuit, SimulationConfig};
//!
//! let circuit = Circuit::from_json(r#"{"components": []}"#)?;
//! let config = SimulationConfig::default();
//! let engine = BatchEngine::new(config.engine.clone());
//! let outcome = simulate(&circuit, &engine, &config, &CancelToken::new());
//! println!("{}", outcome.success);
//! # Ok::<(), netdeck_core::NetdeckError>(())
//! ```
//!
//! ## Node numbering
//!
//! Ground is always node 0. Every other net gets the next free index the
//! first time an emitted device touches it, so numbering depends only on
//! component order and each kind's pin order. Display-only components never
//! touch a net, and junctions merge their nets before anything is numbered.

pub mod circuit;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod label;
pub mod netlist;
pub mod quantity;
pub mod simulation;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use config::SimulationConfig;
#[cfg(feature = "engine")]
pub use engine::BatchEngine;
pub use engine::{CancelToken, RecordedOutput, SimulationEngine};
pub use error::{NetdeckError, Result};
pub use netlist::{compile, NodeMap, SimulationDeck};
pub use simulation::{simulate, SimulationOutcome};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmNetlist;
