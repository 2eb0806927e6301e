//! Physics configuration constants.
//!
//! All tuning parameters are grouped here. Values use world units and
//! seconds unless otherwise noted.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens when the vine swing reaches its angular limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Clamp the angle and zero the outward angular velocity.
    Inelastic,
    /// Clamp the angle and reverse the angular velocity.
    Reflective,
}

/// Rejected configuration value.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
}

/// Configuration for avatar movement and contact resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    // ========================================================================
    // Free Movement
    // ========================================================================
    /// Gravity acceleration (units/second²), before groove scaling.
    pub gravity: f32,

    /// Maximum horizontal movement speed (units/second).
    pub move_speed: f32,

    /// Rate at which horizontal velocity approaches the input target.
    pub move_accel: f32,

    /// Fraction of movement control retained while airborne.
    pub air_control: f32,

    /// Upward velocity applied on jump (units/second).
    pub jump_velocity: f32,

    // ========================================================================
    // Spatial Index
    // ========================================================================
    /// Grid cell width (world units). Chosen so every obstacle
    /// interaction radius fits well inside one cell.
    pub cell_size: f32,

    // ========================================================================
    // Contact Resolution
    // ========================================================================
    /// Exact upward velocity set by a trampoline cap (units/second).
    pub bounce_velocity: f32,

    /// Push-back force scale for flooded cave gates.
    pub gate_push_strength: f32,

    /// Vertical tolerance above a cloud top that still counts as landing.
    pub cloud_landing_tolerance: f32,

    // ========================================================================
    // Vine Swing
    // ========================================================================
    /// Distance from a vine anchor within which a free avatar attaches.
    pub attach_radius: f32,

    /// Per-vine cooldown after a detach before re-attachment (ms).
    pub detach_cooldown_ms: u32,

    /// Angular velocity retained each step (1.0 = lossless).
    pub pendulum_damping: f32,

    /// Angular impulse per second of held pump input (rad/s²).
    pub pump_impulse: f32,

    /// Hard limit on swing excursion (radians).
    pub max_swing_angle: f32,

    /// Behavior at the swing limit.
    pub clamp_policy: ClampPolicy,

    // ========================================================================
    // Audio Reaction
    // ========================================================================
    /// How far full groove lowers the gravity scale (1.0 − depth floor).
    pub groove_gravity_depth: f32,

    /// Lowest permitted gravity scale.
    pub min_gravity_scale: f32,

    /// Rate for gravity-scale smoothing (multiplied by delta time).
    pub gravity_lerp_rate: f32,

    /// Rate for wind-strength smoothing (multiplied by delta time).
    pub wind_lerp_rate: f32,

    /// Wind strength per unit of normalized tempo (BPM / 120).
    pub wind_bpm_scale: f32,

    // ========================================================================
    // World
    // ========================================================================
    /// Half-extent of the playable square on the XZ plane.
    pub world_half_extent: f32,

    /// Contact events retained per frame; extras are dropped.
    pub max_events: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // Free movement
            gravity: 9.8,
            move_speed: 6.0,
            move_accel: 8.0,
            air_control: 0.35,
            jump_velocity: 7.0,

            // Spatial index: all interaction radii are < 3, well under one cell
            cell_size: 10.0,

            // Contact resolution
            bounce_velocity: 15.0,
            gate_push_strength: 8.0,
            cloud_landing_tolerance: 0.75,

            // Vine swing
            attach_radius: 2.5,
            detach_cooldown_ms: 500,
            pendulum_damping: 0.99,
            pump_impulse: 0.8,
            max_swing_angle: FRAC_PI_4,
            clamp_policy: ClampPolicy::Inelastic,

            // Audio reaction
            groove_gravity_depth: 0.4,
            min_gravity_scale: 0.6,
            gravity_lerp_rate: 5.0,
            wind_lerp_rate: 2.0,
            wind_bpm_scale: 0.6,

            // World
            world_half_extent: 240.0,
            max_events: 256,
        }
    }
}

impl PhysicsConfig {
    /// Dreamier tuning: lower gravity, springier bounces, wider swings.
    pub fn floaty() -> Self {
        Self {
            gravity: 6.5,
            jump_velocity: 8.0,
            bounce_velocity: 18.0,
            air_control: 0.6,
            groove_gravity_depth: 0.4,
            ..Default::default()
        }
    }

    /// Check every parameter at world-load time. A degenerate value here
    /// would otherwise surface as silent misbehavior frames later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &'static str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::NonPositive { name, value })
            }
        };
        let in_range = |name: &'static str, value: f32, min: f32, max: f32| {
            if value.is_finite() && value >= min && value <= max {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    name,
                    min,
                    max,
                    value,
                })
            }
        };

        positive("gravity", self.gravity)?;
        positive("move_speed", self.move_speed)?;
        positive("move_accel", self.move_accel)?;
        positive("jump_velocity", self.jump_velocity)?;
        positive("cell_size", self.cell_size)?;
        positive("bounce_velocity", self.bounce_velocity)?;
        positive("gate_push_strength", self.gate_push_strength)?;
        positive("cloud_landing_tolerance", self.cloud_landing_tolerance)?;
        positive("attach_radius", self.attach_radius)?;
        positive("world_half_extent", self.world_half_extent)?;
        in_range("air_control", self.air_control, 0.0, 1.0)?;
        in_range("pendulum_damping", self.pendulum_damping, 0.0, 1.0)?;
        in_range("max_swing_angle", self.max_swing_angle, 0.01, FRAC_PI_2)?;
        in_range("groove_gravity_depth", self.groove_gravity_depth, 0.0, 1.0)?;
        in_range("min_gravity_scale", self.min_gravity_scale, 0.1, 1.0)?;

        // The 3x3 query is only provably complete while interaction radii
        // stay under one cell width.
        if self.attach_radius >= self.cell_size {
            return Err(ConfigError::OutOfRange {
                name: "attach_radius",
                min: 0.0,
                max: self.cell_size,
                value: self.attach_radius,
            });
        }

        Ok(())
    }
}
