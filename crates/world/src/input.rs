//! Raw device input to physics command mapping.
//!
//! Whatever the frontend is (keyboard, gamepad, a scripted driver), it
//! reduces its state to a [`RawInput`] each frame. The mapper turns held
//! keys into movement axes and edge-triggers the jump so holding the key
//! produces exactly one jump per press.

use canopy_physics::AvatarCommand;
use serde::{Deserialize, Serialize};

/// Held-key snapshot for one frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RawInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump_held: bool,
    /// Facing yaw in radians, owned by the camera.
    pub yaw: f32,
}

/// Stateful mapper from raw key snapshots to per-frame commands.
#[derive(Debug, Default)]
pub struct InputMapper {
    jump_was_held: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's command. Opposite held keys cancel.
    pub fn command(&mut self, raw: &RawInput) -> AvatarCommand {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;

        let jump = raw.jump_held && !self.jump_was_held;
        self.jump_was_held = raw.jump_held;

        AvatarCommand {
            forward_move: axis(raw.forward, raw.back),
            strafe_move: axis(raw.right, raw.left),
            jump,
            yaw: raw.yaw,
        }
    }
}
