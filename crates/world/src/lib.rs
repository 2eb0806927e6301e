//! World assembly and session loop on top of the physics core.
//!
//! This crate owns everything the physics core deliberately does not:
//! obstacle catalogs and their validation, index construction, the spawn
//! point, raw-input mapping, and the fixed-rate session that drives one
//! avatar through the world.

pub mod input;
pub mod session;
pub mod world;

pub use input::{InputMapper, RawInput};
pub use session::{Session, SessionConfig};
pub use world::{IndexKind, World, WorldError, WorldSpec};
