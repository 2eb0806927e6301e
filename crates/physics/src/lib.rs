//! Canopy Physics Core
//!
//! Real-time collision and movement resolution for a single avatar moving
//! through a large, mostly-static scene of typed obstacles (cave gates,
//! mushrooms, clouds, vines), accelerated by a uniform spatial hash so that
//! per-frame cost scales with local obstacle density rather than total
//! scene population.
//!
//! # Architecture
//!
//! - **Index**: spatial hash grid (or linear baseline) mapping world XZ
//!   cells to obstacle handles
//! - **Resolve**: per-type contact policies run against grid query results
//! - **Vine**: pendulum state machine that owns avatar motion while attached
//! - **Step**: per-frame scheduler gluing input, audio features, gravity,
//!   wind, contact resolution, and world-bounds clamping together
//!
//! The core consumes audio-derived scalars (groove, BPM) and static obstacle
//! catalogs, and exposes an updated avatar pose plus transient contact
//! events. It performs no rendering, audio decoding, or asset loading.

pub mod audio;
pub mod config;
pub mod events;
pub mod index;
pub mod math;
pub mod obstacles;
pub mod particles;
pub mod random;
pub mod resolve;
pub mod state;
pub mod step;
pub mod terrain;
pub mod vine;

// Re-export commonly used types
pub use audio::AudioFeatures;
pub use config::{ClampPolicy, ConfigError, PhysicsConfig};
pub use events::{ContactEvent, EventBuffer};
pub use index::{IndexStats, InvalidCellSize, LinearIndex, ObstacleIndex, SpatialHashGrid};
pub use obstacles::{
    CaveGate, Cloud, CloudTier, Mushroom, ObstacleError, ObstacleId, VineAnchor,
};
pub use particles::{Particle, ParticleSystem};
pub use random::SeededRandom;
pub use resolve::{ContactResolver, ObstacleSet, ResolveStats};
pub use state::{AvatarCommand, AvatarId, AvatarSnapshot, AvatarState, MotionMode, VineId};
pub use step::{StepReport, Stepper, Wind};
pub use terrain::{FlatTerrain, RollingTerrain, TerrainSampler};
pub use vine::VineSwing;
