//! Dig-and-chase action game core.
//!
//!   - `domain`: tiles, grids, cadence, rules and enemy targeting
//!   - `sim`: stage state, actors, the per-tick stepper and sessions
//!   - `ui`: terminal host (key capture and rendering)

pub mod config;
pub mod domain;
pub mod error;
pub mod sim;
pub mod ui;
