//! Vine-swing pendulum state machine.
//!
//! Each world vine owns one `VineSwing`. While an avatar is attached the
//! pendulum is the authoritative motion source: the avatar's position is
//! derived from anchor, length, and swing angle every step, and normal
//! gravity integration is skipped entirely. Detaching hands the pendulum's
//! tangential velocity back to the avatar, which is the slingshot mechanic
//! the whole interaction exists for.
//!
//! The pendulum swings in a single vertical plane chosen from the avatar's
//! approach direction at attach time. A spherical (two-angle) pendulum was
//! considered and rejected: the gameplay reads identically and the planar
//! math keeps the clamp policy trivial to reason about.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::{ClampPolicy, PhysicsConfig};
use crate::obstacles::VineAnchor;
use crate::state::AvatarId;

/// Pendulum state for one vine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VineSwing {
    /// Fixed top of the vine in world space.
    pub anchor: Vec3,

    /// Pendulum length.
    pub length: f32,

    /// Angular displacement from vertical (radians), positive along
    /// `swing_plane`.
    pub swing_angle: f32,

    /// Angular velocity (radians/second).
    pub angular_velocity: f32,

    /// Unit XZ direction of the swing plane.
    pub swing_plane: Vec2,

    /// Occupying avatar, if any. Non-owning: the avatar lives in the
    /// session; this only records occupancy.
    attached: Option<AvatarId>,

    /// Remaining re-attach cooldown after a detach (ms).
    cooldown_ms: u32,
}

impl VineSwing {
    /// Create a resting vine hanging straight down.
    pub fn new(anchor: Vec3, length: f32) -> Self {
        Self {
            anchor,
            length,
            swing_angle: 0.0,
            angular_velocity: 0.0,
            swing_plane: Vec2::X,
            attached: None,
            cooldown_ms: 0,
        }
    }

    /// Build the dynamic state from a static catalog record.
    pub fn from_record(record: &VineAnchor) -> Self {
        Self::new(record.anchor, record.length)
    }

    /// Occupying avatar, if any.
    #[inline]
    pub fn attached_to(&self) -> Option<AvatarId> {
        self.attached
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Free and past its re-attach cooldown.
    #[inline]
    pub fn ready(&self) -> bool {
        self.attached.is_none() && self.cooldown_ms == 0
    }

    /// Advance the re-attach cooldown.
    pub fn tick_cooldown(&mut self, delta_time_ms: u32) {
        self.cooldown_ms = self.cooldown_ms.saturating_sub(delta_time_ms);
    }

    /// Attempt to attach an avatar approaching from `avatar_pos`.
    ///
    /// Fails if the vine is occupied or cooling down. On success the swing
    /// plane and initial angle are taken from the approach geometry, so
    /// the grab does not teleport the avatar across the anchor.
    pub fn try_attach(&mut self, avatar: AvatarId, avatar_pos: Vec3, max_angle: f32) -> bool {
        if !self.ready() {
            return false;
        }

        let offset = Vec2::new(avatar_pos.x - self.anchor.x, avatar_pos.z - self.anchor.z);
        let horizontal = offset.length();
        self.swing_plane = if horizontal > 1e-4 {
            offset / horizontal
        } else {
            Vec2::X
        };

        // Angle from vertical toward the avatar; the drop below the anchor
        // can be small or negative if the avatar grabs near anchor height.
        let drop = (self.anchor.y - avatar_pos.y).max(0.01);
        self.swing_angle = horizontal.atan2(drop).min(max_angle);
        self.angular_velocity = 0.0;
        self.attached = Some(avatar);

        log::debug!(
            "vine attach: avatar={:?} angle={:.3} plane=({:.2}, {:.2})",
            avatar,
            self.swing_angle,
            self.swing_plane.x,
            self.swing_plane.y
        );
        true
    }

    /// Release the avatar, returning the velocity it carries away and
    /// starting the re-attach cooldown.
    pub fn detach(&mut self, cooldown_ms: u32) -> Vec3 {
        let velocity = self.tangential_velocity();
        self.attached = None;
        self.cooldown_ms = cooldown_ms;
        velocity
    }

    /// Recovery path for a stale attachment (avatar gone without a proper
    /// detach). Logged, never fatal.
    pub fn force_detach(&mut self) {
        log::warn!("vine attachment went stale, force-detaching");
        self.attached = None;
        self.cooldown_ms = 0;
        self.angular_velocity = 0.0;
    }

    /// World-space position of the attached avatar, derived from the
    /// pendulum state.
    pub fn avatar_position(&self) -> Vec3 {
        let (sin_a, cos_a) = self.swing_angle.sin_cos();
        self.anchor
            + Vec3::new(
                self.swing_plane.x * sin_a * self.length,
                -cos_a * self.length,
                self.swing_plane.y * sin_a * self.length,
            )
    }

    /// Instantaneous velocity of the swing bob. Its magnitude is
    /// `|angular_velocity| * length`.
    pub fn tangential_velocity(&self) -> Vec3 {
        let (sin_a, cos_a) = self.swing_angle.sin_cos();
        let speed = self.angular_velocity * self.length;
        Vec3::new(
            self.swing_plane.x * cos_a * speed,
            sin_a * speed,
            self.swing_plane.y * cos_a * speed,
        )
    }

    /// Integrate one step of pendulum dynamics.
    ///
    /// `pump` is the forward/backward input in [-1, 1]; holding it injects
    /// a small angular impulse so the player can build amplitude.
    pub fn step(&mut self, pump: f32, config: &PhysicsConfig, delta_time: f32) {
        let angular_accel = -(config.gravity / self.length) * self.swing_angle.sin();
        self.angular_velocity += angular_accel * delta_time;
        self.angular_velocity *= config.pendulum_damping;

        if pump.abs() > 0.01 {
            self.angular_velocity += pump.signum() * config.pump_impulse * delta_time;
        }

        self.swing_angle += self.angular_velocity * delta_time;

        let max = config.max_swing_angle;
        if self.swing_angle > max {
            self.swing_angle = max;
            self.apply_clamp_policy(config.clamp_policy, true);
        } else if self.swing_angle < -max {
            self.swing_angle = -max;
            self.apply_clamp_policy(config.clamp_policy, false);
        }
    }

    fn apply_clamp_policy(&mut self, policy: ClampPolicy, outward_positive: bool) {
        match policy {
            ClampPolicy::Inelastic => {
                // Zero only the component still driving past the limit
                let driving = if outward_positive {
                    self.angular_velocity > 0.0
                } else {
                    self.angular_velocity < 0.0
                };
                if driving {
                    self.angular_velocity = 0.0;
                }
            }
            ClampPolicy::Reflective => {
                self.angular_velocity = -self.angular_velocity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    const DT: f32 = 1.0 / 60.0;

    fn vine() -> VineSwing {
        VineSwing::new(Vec3::new(0.0, 12.0, 0.0), 6.0)
    }

    #[test]
    fn test_attach_from_approach_geometry() {
        let mut swing = vine();
        let attached = swing.try_attach(
            AvatarId(0),
            Vec3::new(3.0, 7.0, 0.0),
            FRAC_PI_4,
        );
        assert!(attached);
        assert_eq!(swing.attached_to(), Some(AvatarId(0)));
        // Plane points toward the avatar
        assert!((swing.swing_plane.x - 1.0).abs() < 1e-5);
        // atan2(3, 5) ~ 0.54 rad
        assert!((swing.swing_angle - (3.0f32).atan2(5.0)).abs() < 1e-5);
    }

    #[test]
    fn test_occupied_vine_rejects_second_avatar() {
        let mut swing = vine();
        assert!(swing.try_attach(AvatarId(0), Vec3::new(1.0, 7.0, 0.0), FRAC_PI_4));
        assert!(!swing.try_attach(AvatarId(1), Vec3::new(-1.0, 7.0, 0.0), FRAC_PI_4));
        assert_eq!(swing.attached_to(), Some(AvatarId(0)));
    }

    #[test]
    fn test_cooldown_blocks_reattach() {
        let mut swing = vine();
        swing.try_attach(AvatarId(0), Vec3::new(1.0, 7.0, 0.0), FRAC_PI_4);
        swing.detach(500);

        assert!(!swing.try_attach(AvatarId(0), Vec3::new(1.0, 7.0, 0.0), FRAC_PI_4));

        swing.tick_cooldown(499);
        assert!(!swing.ready());
        swing.tick_cooldown(1);
        assert!(swing.ready());
        assert!(swing.try_attach(AvatarId(0), Vec3::new(1.0, 7.0, 0.0), FRAC_PI_4));
    }

    #[test]
    fn test_angle_never_exceeds_limit_under_pumping() {
        let config = PhysicsConfig::default();
        let mut swing = vine();
        swing.try_attach(AvatarId(0), Vec3::new(2.0, 7.0, 0.0), config.max_swing_angle);

        // Pump hard in the swing direction for a long time
        for step in 0..5000 {
            let pump = if swing.angular_velocity >= 0.0 { 1.0 } else { -1.0 };
            swing.step(pump, &config, DT);
            assert!(
                swing.swing_angle.abs() <= config.max_swing_angle + 1e-4,
                "angle escaped the clamp at step {}: {}",
                step,
                swing.swing_angle
            );
        }
    }

    #[test]
    fn test_reflective_clamp_reverses_velocity() {
        let mut config = PhysicsConfig::default();
        config.clamp_policy = ClampPolicy::Reflective;

        let mut swing = vine();
        swing.swing_angle = config.max_swing_angle - 0.01;
        swing.angular_velocity = 5.0;
        swing.step(0.0, &config, DT);

        assert_eq!(swing.swing_angle, config.max_swing_angle);
        assert!(swing.angular_velocity < 0.0, "velocity should reverse");
    }

    #[test]
    fn test_detach_momentum_magnitude() {
        let mut swing = vine();
        swing.try_attach(AvatarId(0), Vec3::new(2.0, 7.0, 0.0), FRAC_PI_4);
        swing.swing_angle = 0.3;
        swing.angular_velocity = 1.5;

        let velocity = swing.detach(500);
        let expected = 1.5 * swing.length;
        assert!(
            (velocity.length() - expected).abs() < 1e-4,
            "tangential speed should be |w|*L: got {} want {}",
            velocity.length(),
            expected
        );
        assert!(!swing.is_attached());
    }

    #[test]
    fn test_avatar_position_on_rope() {
        let mut swing = vine();
        swing.swing_angle = 0.0;
        // Hanging straight down
        let pos = swing.avatar_position();
        assert!((pos - Vec3::new(0.0, 6.0, 0.0)).length() < 1e-5);

        // Always exactly `length` from the anchor
        swing.swing_angle = 0.6;
        let pos = swing.avatar_position();
        assert!(((pos - swing.anchor).length() - swing.length).abs() < 1e-4);
    }

    #[test]
    fn test_pendulum_settles_toward_rest() {
        let config = PhysicsConfig::default();
        let mut swing = vine();
        swing.swing_angle = 0.5;

        for _ in 0..20_000 {
            swing.step(0.0, &config, DT);
        }
        assert!(
            swing.swing_angle.abs() < 0.05 && swing.angular_velocity.abs() < 0.05,
            "damped pendulum should settle: angle={} vel={}",
            swing.swing_angle,
            swing.angular_velocity
        );
    }

    #[test]
    fn test_force_detach_clears_occupancy() {
        let mut swing = vine();
        swing.try_attach(AvatarId(0), Vec3::new(1.0, 7.0, 0.0), FRAC_PI_4);
        swing.force_detach();
        assert!(swing.ready());
    }
}
