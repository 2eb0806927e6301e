//! Transient contact notifications for visual consumers.
//!
//! Events are fire-and-forget: the resolver pushes them during a step,
//! the session drains them after, and renderers use them for squash,
//! splash, and flash effects. Nothing in the physics core reads them back.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::state::VineId;

/// One contact resolved during a physics step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactEvent {
    /// Trampoline cap launched the avatar.
    Bounce {
        /// Cap contact point.
        position: Vec3,
        /// Upward velocity applied.
        velocity: f32,
    },

    /// Flooded cave gate pushed the avatar back.
    PushBack {
        position: Vec3,
        /// Force applied this frame.
        force: Vec3,
    },

    /// Avatar landed on a walkable cloud.
    CloudLanding {
        position: Vec3,
        /// Cloud top height the avatar was clamped to.
        surface: f32,
    },

    /// Avatar grabbed a vine.
    VineAttached { vine: VineId, position: Vec3 },

    /// Avatar released a vine, carrying its tangential velocity.
    VineDetached { vine: VineId, velocity: Vec3 },
}

/// Frame-local event buffer with a hard cap.
///
/// The cap keeps a pathological frame (avatar embedded in a pile of
/// obstacles) from growing the buffer without bound; overflow events are
/// dropped and counted, not an error.
#[derive(Debug, Clone)]
pub struct EventBuffer {
    events: Vec<ContactEvent>,
    max_events: usize,
    dropped: usize,
}

impl EventBuffer {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::with_capacity(max_events.min(64)),
            max_events,
            dropped: 0,
        }
    }

    /// Queue an event, dropping it if the frame cap is reached.
    pub fn push(&mut self, event: ContactEvent) {
        if self.events.len() < self.max_events {
            self.events.push(event);
        } else {
            self.dropped += 1;
        }
    }

    /// Take all queued events, leaving the buffer empty for the next frame.
    pub fn drain(&mut self) -> Vec<ContactEvent> {
        if self.dropped > 0 {
            log::debug!("event buffer dropped {} events this frame", self.dropped);
            self.dropped = 0;
        }
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContactEvent> {
        self.events.iter()
    }
}
