//! Typed obstacle records placed into the spatial indices at world load.
//!
//! Records are owned by the world layer; the physics core reads them
//! through slices and per-type indices. All records are static for the
//! lifetime of a built world.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle for an obstacle within its per-type catalog.
///
/// The value is the record's position in the catalog slice, so index
/// queries can return handles without touching the records themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

impl ObstacleId {
    /// Catalog slice position for this handle.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Validation failure for a single obstacle record.
#[derive(Debug, Error, PartialEq)]
pub enum ObstacleError {
    #[error("position is not finite: ({0}, {1}, {2})")]
    NonFinitePosition(f32, f32, f32),

    #[error("{name} must be positive, got {value}")]
    NonPositiveExtent { name: &'static str, value: f32 },
}

fn check_position(p: Vec3) -> Result<(), ObstacleError> {
    if p.is_finite() {
        Ok(())
    } else {
        Err(ObstacleError::NonFinitePosition(p.x, p.y, p.z))
    }
}

fn check_extent(name: &'static str, value: f32) -> Result<(), ObstacleError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ObstacleError::NonPositiveExtent { name, value })
    }
}

/// A cave mouth guarded by a water gate.
///
/// While `flooded` is set, the gate pushes the avatar back out with a
/// force proportional to penetration depth. A dry gate is passable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaveGate {
    /// Gate point in world space.
    pub position: Vec3,
    /// Horizontal radius of the gate's push field.
    pub radius: f32,
    /// Whether the cave is currently flooded (gate active).
    pub flooded: bool,
}

impl CaveGate {
    pub fn validate(&self) -> Result<(), ObstacleError> {
        check_position(self.position)?;
        check_extent("cave gate radius", self.radius)
    }
}

/// A mushroom with a landable cap.
///
/// Trampoline variants launch a descending avatar upward; plain variants
/// act as solid platforms the avatar is displaced onto.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mushroom {
    /// Stem base in world space.
    pub position: Vec3,
    /// Horizontal radius of the cap.
    pub cap_radius: f32,
    /// Cap top height above `position.y`.
    pub cap_height: f32,
    /// Trampoline caps bounce; plain caps are solid.
    pub trampoline: bool,
}

impl Mushroom {
    /// World-space height of the cap's top surface.
    #[inline]
    pub fn cap_top(&self) -> f32 {
        self.position.y + self.cap_height
    }

    pub fn validate(&self) -> Result<(), ObstacleError> {
        check_position(self.position)?;
        check_extent("mushroom cap radius", self.cap_radius)?;
        check_extent("mushroom cap height", self.cap_height)
    }
}

/// Classification of a cloud's solidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudTier {
    /// Tier 1: a solid platform the avatar can stand on.
    Walkable,
    /// Tier 2: decorative mist, fully passable.
    Mist,
}

/// A cloud the avatar may be able to stand on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cloud {
    /// Cloud center in world space.
    pub position: Vec3,
    /// Horizontal radius of the walkable surface.
    pub radius: f32,
    /// World-space height of the top surface.
    pub top: f32,
    /// Walkable platform or passable mist.
    pub tier: CloudTier,
}

impl Cloud {
    pub fn validate(&self) -> Result<(), ObstacleError> {
        check_position(self.position)?;
        if !self.top.is_finite() {
            return Err(ObstacleError::NonFinitePosition(
                self.position.x,
                self.top,
                self.position.z,
            ));
        }
        check_extent("cloud radius", self.radius)
    }
}

/// Static description of a hanging vine: anchor point and rope length.
///
/// The dynamic pendulum state lives in [`crate::vine::VineSwing`], built
/// from this record at world load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VineAnchor {
    /// Fixed top of the vine in world space.
    pub anchor: Vec3,
    /// Pendulum length from anchor to grab point.
    pub length: f32,
}

impl VineAnchor {
    pub fn validate(&self) -> Result<(), ObstacleError> {
        check_position(self.anchor)?;
        check_extent("vine length", self.length)
    }
}
