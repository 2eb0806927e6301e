//! Avatar motion state and per-frame input command.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier for an avatar. The world runs a single avatar today; the
/// id exists so vine occupancy can tell would-be grabbers apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvatarId(pub u32);

/// Handle into the world's vine catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VineId(pub u32);

impl VineId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which integration path owns the avatar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    /// Normal gravity/input integration.
    Free,
    /// A vine pendulum fully owns position and velocity.
    VineAttached(VineId),
}

/// Complete motion state for the avatar.
///
/// Mutated exactly once per physics step by the scheduler; renderers
/// receive an [`AvatarSnapshot`] copy, never a shared reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarState {
    /// Position in world space.
    pub position: Vec3,

    /// Velocity in world space (units/second).
    pub velocity: Vec3,

    /// Standing on terrain, a cloud, or a mushroom cap.
    pub grounded: bool,

    /// Authoritative integration path for this step.
    pub mode: MotionMode,

    /// Gravity multiplier in [min_gravity_scale, 1.0], eased toward the
    /// groove-derived target each frame.
    pub gravity_scale: f32,

    // Last values known to be finite, for NaN recovery.
    last_good_position: Vec3,
    last_good_velocity: Vec3,
}

impl AvatarState {
    /// Create a new avatar state at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            mode: MotionMode::Free,
            gravity_scale: 1.0,
            last_good_position: position,
            last_good_velocity: Vec3::ZERO,
        }
    }

    /// Whether the avatar is in free motion (not attached to a vine).
    #[inline]
    pub fn is_free(&self) -> bool {
        self.mode == MotionMode::Free
    }

    /// Replace any non-finite position/velocity component with its
    /// last-known-good value. Returns true if anything was repaired.
    ///
    /// A NaN that survives one frame poisons every frame after it, so the
    /// scheduler calls this at the end of each step.
    pub fn sanitize(&mut self) -> bool {
        let fixed_pos = sanitize_vec(&mut self.position, self.last_good_position);
        let fixed_vel = sanitize_vec(&mut self.velocity, self.last_good_velocity);
        if !self.gravity_scale.is_finite() {
            self.gravity_scale = 1.0;
            return true;
        }
        fixed_pos || fixed_vel
    }

    /// Record the current (finite) pose as the recovery target.
    pub fn commit_good(&mut self) {
        self.last_good_position = self.position;
        self.last_good_velocity = self.velocity;
    }
}

fn sanitize_vec(v: &mut Vec3, good: Vec3) -> bool {
    let mut fixed = false;
    if !v.x.is_finite() {
        v.x = good.x;
        fixed = true;
    }
    if !v.y.is_finite() {
        v.y = good.y;
        fixed = true;
    }
    if !v.z.is_finite() {
        v.z = good.z;
        fixed = true;
    }
    fixed
}

/// Published copy of the avatar pose for renderers and reaction systems.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AvatarSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub grounded: bool,
    pub mode: MotionMode,
    pub gravity_scale: f32,
}

impl From<&AvatarState> for AvatarSnapshot {
    fn from(state: &AvatarState) -> Self {
        Self {
            position: state.position,
            velocity: state.velocity,
            grounded: state.grounded,
            mode: state.mode,
            gravity_scale: state.gravity_scale,
        }
    }
}

/// Input command for a single physics step.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AvatarCommand {
    /// Forward/backward movement in [-1, 1]. Also drives vine pumping.
    pub forward_move: f32,

    /// Strafe right/left in [-1, 1].
    pub strafe_move: f32,

    /// Jump while grounded; detach while swinging.
    pub jump: bool,

    /// Facing yaw in radians, defining the movement basis.
    pub yaw: f32,
}

impl AvatarCommand {
    /// World-space movement direction from the yaw basis, capped at
    /// unit length so diagonals are not faster.
    pub fn movement_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let forward = Vec3::new(cos_yaw, 0.0, sin_yaw);
        let right = Vec3::new(-sin_yaw, 0.0, cos_yaw);

        let dir = forward * self.forward_move + right * self.strafe_move;
        if dir.length_squared() > 1.0 {
            dir.normalize()
        } else {
            dir
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_restores_last_good() {
        let mut state = AvatarState::new(Vec3::new(1.0, 2.0, 3.0));
        state.commit_good();

        state.position.y = f32::NAN;
        state.velocity.x = f32::INFINITY;

        assert!(state.sanitize());
        assert_eq!(state.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(state.velocity.x, 0.0);

        // Finite state needs no repair
        assert!(!state.sanitize());
    }

    #[test]
    fn test_sanitize_only_touches_bad_components() {
        let mut state = AvatarState::new(Vec3::ZERO);
        state.commit_good();

        state.position = Vec3::new(5.0, f32::NAN, -2.0);
        assert!(state.sanitize());
        // Healthy components survive, only y resets
        assert_eq!(state.position, Vec3::new(5.0, 0.0, -2.0));
    }

    #[test]
    fn test_movement_direction_yaw_basis() {
        let cmd = AvatarCommand {
            forward_move: 1.0,
            yaw: 0.0,
            ..Default::default()
        };
        let dir = cmd.movement_direction();
        assert!((dir.x - 1.0).abs() < 1e-6);
        assert!(dir.z.abs() < 1e-6);

        let cmd = AvatarCommand {
            forward_move: 1.0,
            yaw: std::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        let dir = cmd.movement_direction();
        assert!(dir.x.abs() < 1e-5);
        assert!((dir.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_input_not_faster() {
        let cmd = AvatarCommand {
            forward_move: 1.0,
            strafe_move: 1.0,
            ..Default::default()
        };
        assert!(cmd.movement_direction().length() <= 1.0 + 1e-6);
    }

    #[test]
    fn test_snapshot_copies_pose() {
        let mut state = AvatarState::new(Vec3::new(0.0, 4.0, 0.0));
        state.velocity = Vec3::new(1.0, 0.0, 0.0);
        state.grounded = true;

        let snap = AvatarSnapshot::from(&state);
        assert_eq!(snap.position, state.position);
        assert_eq!(snap.velocity, state.velocity);
        assert!(snap.grounded);
    }
}
