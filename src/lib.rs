//! Particle life: typed particles on a wrapped plane pulling and pushing
//! each other through a per-species rule matrix.
//!
//! [`SimulationState`] owns everything and is driven one [`SimulationState::step`]
//! per frame. Rendering and input live in the `particle-life` binary and only
//! read what the state exposes.

pub mod config;
pub mod constants;
pub mod energy;
pub mod force;
pub mod layout;
pub mod mutation;
pub mod simulation;
pub mod spatial;
pub mod utils;

pub use config::{ColorMode, SimulationConfig};
pub use layout::Layout;
pub use simulation::{Particle, PointerForce, SimRng, SimulationState};
