//! Circuit snapshot as supplied by the editor.
//!
//! This module holds the read-only input of the compiler: components with
//! their kind, declared value and model, and a pin table naming the net each
//! pin is wired to.

pub mod net;
mod types;

pub use net::{is_ground, normalize_net};
pub use types::*;
