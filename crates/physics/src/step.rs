//! Per-frame physics scheduler.
//!
//! One call to [`Stepper::step`] advances the avatar by one frame, in a
//! fixed order: clamp inputs, ease audio-driven parameters, integrate free
//! motion, resolve contacts, run the vine override, clamp to world bounds
//! and terrain, then sanitize. The order matters: contact resolution must
//! see the post-integration position, and the vine override must run after
//! resolution so a same-frame attach is honored immediately.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::audio::AudioFeatures;
use crate::config::PhysicsConfig;
use crate::events::{ContactEvent, EventBuffer};
use crate::math::lerp_toward;
use crate::resolve::{ContactResolver, ObstacleSet, ResolveStats};
use crate::state::{AvatarCommand, AvatarId, AvatarState, MotionMode};
use crate::terrain::TerrainSampler;

/// Frames longer than this are integrated as if they were this long.
/// Keeps a debugger pause or GC hitch from tunneling the avatar through
/// obstacles.
const MAX_DELTA_TIME: f32 = 0.066;

/// Ambient wind, eased toward a tempo-derived strength.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Wind {
    /// Unit direction on the XZ plane.
    pub direction: Vec3,
    /// Current strength (units/second² applied to the avatar).
    pub strength: f32,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            direction: Vec3::X,
            strength: 0.0,
        }
    }
}

impl Wind {
    /// Acceleration the wind applies this frame.
    #[inline]
    pub fn acceleration(&self) -> Vec3 {
        self.direction * self.strength
    }
}

/// Outcome of one scheduler step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepReport {
    pub resolve: ResolveStats,
    /// A non-finite component was repaired this frame.
    pub repaired: bool,
}

/// Owns the per-frame pipeline state: the contact resolver, the wind, and
/// the frame's event buffer.
#[derive(Debug)]
pub struct Stepper {
    resolver: ContactResolver,
    wind: Wind,
    events: EventBuffer,
}

impl Stepper {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            resolver: ContactResolver::new(),
            wind: Wind::default(),
            events: EventBuffer::new(config.max_events),
        }
    }

    #[inline]
    pub fn wind(&self) -> &Wind {
        &self.wind
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        self.events.drain()
    }

    /// Advance the avatar by one frame.
    pub fn step(
        &mut self,
        avatar: &mut AvatarState,
        avatar_id: AvatarId,
        command: &AvatarCommand,
        audio: AudioFeatures,
        set: &mut ObstacleSet<'_>,
        terrain: &dyn TerrainSampler,
        config: &PhysicsConfig,
        delta_time: f32,
    ) -> StepReport {
        let dt = delta_time.clamp(0.0, MAX_DELTA_TIME);
        let audio = audio.clamped();

        let dt_ms = (dt * 1000.0).round() as u32;
        for vine in set.vine_swings.iter_mut() {
            vine.tick_cooldown(dt_ms);
        }

        self.ease_audio_targets(avatar, &audio, config, dt);

        if avatar.is_free() {
            self.integrate_free(avatar, command, config, dt);
        }

        let resolve = self
            .resolver
            .resolve(avatar, avatar_id, set, config, dt, &mut self.events);

        if let MotionMode::VineAttached(vine_id) = avatar.mode {
            self.run_vine_override(avatar, avatar_id, vine_id, command, set, config, dt);
        }

        clamp_to_bounds(avatar, config.world_half_extent);
        clamp_to_terrain(avatar, terrain);

        let repaired = avatar.sanitize();
        if repaired {
            log::warn!(
                "non-finite avatar state repaired at {:?}",
                avatar.position
            );
        }
        avatar.commit_good();

        StepReport { resolve, repaired }
    }

    /// Ease gravity scale toward the groove target and wind strength
    /// toward the tempo target. Both use rate-limited lerps so a sudden
    /// audio jump reads as a swell, not a snap.
    fn ease_audio_targets(
        &mut self,
        avatar: &mut AvatarState,
        audio: &AudioFeatures,
        config: &PhysicsConfig,
        dt: f32,
    ) {
        let gravity_target = (1.0 - audio.groove * config.groove_gravity_depth)
            .clamp(config.min_gravity_scale, 1.0);
        avatar.gravity_scale = lerp_toward(
            avatar.gravity_scale,
            gravity_target,
            config.gravity_lerp_rate * dt,
        );

        let wind_target = (audio.bpm / 120.0) * config.wind_bpm_scale;
        self.wind.strength =
            lerp_toward(self.wind.strength, wind_target, config.wind_lerp_rate * dt);
    }

    fn integrate_free(
        &self,
        avatar: &mut AvatarState,
        command: &AvatarCommand,
        config: &PhysicsConfig,
        dt: f32,
    ) {
        // Horizontal control, reduced while airborne
        let control = if avatar.grounded {
            1.0
        } else {
            config.air_control
        };
        let target = command.movement_direction() * config.move_speed;
        let t = config.move_accel * control * dt;
        avatar.velocity.x = lerp_toward(avatar.velocity.x, target.x, t);
        avatar.velocity.z = lerp_toward(avatar.velocity.z, target.z, t);

        if command.jump && avatar.grounded {
            avatar.velocity.y = config.jump_velocity;
            avatar.grounded = false;
        }

        avatar.velocity.y -= config.gravity * avatar.gravity_scale * dt;
        avatar.velocity += self.wind.acceleration() * dt;

        avatar.position += avatar.velocity * dt;

        // Contacts and terrain re-establish groundedness below
        avatar.grounded = false;
    }

    /// While attached, the pendulum owns position and velocity. Jump
    /// detaches, handing the tangential velocity back to the avatar.
    #[allow(clippy::too_many_arguments)]
    fn run_vine_override(
        &mut self,
        avatar: &mut AvatarState,
        avatar_id: AvatarId,
        vine_id: crate::state::VineId,
        command: &AvatarCommand,
        set: &mut ObstacleSet<'_>,
        config: &PhysicsConfig,
        dt: f32,
    ) {
        let Some(vine) = set.vine_swings.get_mut(vine_id.index()) else {
            log::warn!("avatar attached to missing vine {:?}, releasing", vine_id);
            avatar.mode = MotionMode::Free;
            return;
        };

        if vine.attached_to() != Some(avatar_id) {
            log::warn!(
                "occupancy mismatch on vine {:?} (expected {:?}), releasing",
                vine_id,
                avatar_id
            );
            avatar.mode = MotionMode::Free;
            return;
        }

        if command.jump {
            let velocity = vine.detach(config.detach_cooldown_ms);
            avatar.velocity = velocity;
            avatar.mode = MotionMode::Free;
            avatar.grounded = false;
            self.events.push(ContactEvent::VineDetached {
                vine: vine_id,
                velocity,
            });
            return;
        }

        vine.step(command.forward_move, config, dt);
        avatar.position = vine.avatar_position();
        avatar.velocity = vine.tangential_velocity();
        avatar.grounded = false;
    }
}

/// Keep the avatar inside the playable square, zeroing outward velocity
/// at the fence.
fn clamp_to_bounds(avatar: &mut AvatarState, half_extent: f32) {
    if avatar.position.x.abs() > half_extent {
        avatar.position.x = avatar.position.x.clamp(-half_extent, half_extent);
        avatar.velocity.x = 0.0;
    }
    if avatar.position.z.abs() > half_extent {
        avatar.position.z = avatar.position.z.clamp(-half_extent, half_extent);
        avatar.velocity.z = 0.0;
    }
}

/// Never let the avatar end a frame underground.
fn clamp_to_terrain(avatar: &mut AvatarState, terrain: &dyn TerrainSampler) {
    let ground = terrain.ground_height(avatar.position.x, avatar.position.z);
    if avatar.position.y < ground {
        avatar.position.y = ground;
        if avatar.velocity.y < 0.0 {
            avatar.velocity.y = 0.0;
        }
        avatar.grounded = true;
    }
}
