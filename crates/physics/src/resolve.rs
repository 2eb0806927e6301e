//! Per-frame contact detection and resolution.
//!
//! The resolver never walks a full obstacle list. Each phase queries the
//! corresponding spatial index around the avatar's current XZ position and
//! only inspects the handles that come back, so cost tracks local density.
//!
//! Phases run in a fixed order (caves, mushrooms, clouds, vines) so that
//! colocated obstacles resolve deterministically. Only the vine phase can
//! change the motion mode; a successful attach ends further attach checks
//! for the frame, while the earlier bounce/push phases always run against
//! the transient free-mode state.

use glam::Vec3;

use crate::config::PhysicsConfig;
use crate::events::{ContactEvent, EventBuffer};
use crate::index::ObstacleIndex;
use crate::math::horizontal_distance;
use crate::obstacles::{CaveGate, Cloud, CloudTier, Mushroom, ObstacleId};
use crate::state::{AvatarId, AvatarState, MotionMode, VineId};
use crate::vine::VineSwing;

/// Read-only obstacle catalogs plus their indices, with mutable access to
/// vine dynamics for attachment. Built fresh each step by the world layer;
/// a `None` index means the world has no obstacles of that type, which is
/// an empty query result rather than an error.
pub struct ObstacleSet<'a> {
    pub caves: &'a [CaveGate],
    pub cave_index: Option<&'a dyn ObstacleIndex>,

    pub mushrooms: &'a [Mushroom],
    pub mushroom_index: Option<&'a dyn ObstacleIndex>,

    pub clouds: &'a [Cloud],
    pub cloud_index: Option<&'a dyn ObstacleIndex>,

    pub vine_swings: &'a mut [VineSwing],
    pub vine_index: Option<&'a dyn ObstacleIndex>,
}

/// Instrumentation for one resolver invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Total candidates returned by index queries across all phases.
    pub candidates: usize,
    /// Contacts that actually mutated the avatar.
    pub contacts: usize,
}

/// Resolves avatar contacts against the obstacle set.
///
/// Owns a scratch buffer reused across phases and frames so the hot path
/// allocates nothing after warmup.
#[derive(Debug, Default)]
pub struct ContactResolver {
    scratch: Vec<ObstacleId>,
}

impl ContactResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run all contact phases for this frame.
    pub fn resolve(
        &mut self,
        avatar: &mut AvatarState,
        avatar_id: AvatarId,
        set: &mut ObstacleSet<'_>,
        config: &PhysicsConfig,
        delta_time: f32,
        events: &mut EventBuffer,
    ) -> ResolveStats {
        let mut stats = ResolveStats::default();

        self.resolve_caves(avatar, set, config, delta_time, events, &mut stats);
        self.resolve_mushrooms(avatar, set, config, events, &mut stats);
        self.resolve_clouds(avatar, set, config, events, &mut stats);
        self.resolve_vines(avatar, avatar_id, set, config, events, &mut stats);

        stats
    }

    fn query<'s>(
        scratch: &'s mut Vec<ObstacleId>,
        index: Option<&dyn ObstacleIndex>,
        position: Vec3,
        stats: &mut ResolveStats,
    ) -> &'s [ObstacleId] {
        scratch.clear();
        if let Some(index) = index {
            index.query_into(position.x, position.z, scratch);
        }
        stats.candidates += scratch.len();
        scratch
    }

    /// Flooded cave gates push the avatar back out, harder the deeper the
    /// penetration. Dry gates are passable.
    fn resolve_caves(
        &mut self,
        avatar: &mut AvatarState,
        set: &ObstacleSet<'_>,
        config: &PhysicsConfig,
        delta_time: f32,
        events: &mut EventBuffer,
        stats: &mut ResolveStats,
    ) {
        for &id in Self::query(&mut self.scratch, set.cave_index, avatar.position, stats) {
            let gate = &set.caves[id.index()];
            if !gate.flooded {
                continue;
            }

            let dist = horizontal_distance(avatar.position, gate.position);
            if dist >= gate.radius {
                continue;
            }

            let penetration = gate.radius - dist;
            let outward = if dist > 1e-4 {
                Vec3::new(
                    (avatar.position.x - gate.position.x) / dist,
                    0.0,
                    (avatar.position.z - gate.position.z) / dist,
                )
            } else {
                Vec3::X
            };

            let force = outward * penetration * config.gate_push_strength;
            avatar.velocity += force * delta_time;
            stats.contacts += 1;
            events.push(ContactEvent::PushBack {
                position: avatar.position,
                force,
            });
        }
    }

    /// Trampoline caps launch a descending avatar at the exact configured
    /// bounce velocity regardless of impact speed; plain caps displace the
    /// avatar onto the surface.
    fn resolve_mushrooms(
        &mut self,
        avatar: &mut AvatarState,
        set: &ObstacleSet<'_>,
        config: &PhysicsConfig,
        events: &mut EventBuffer,
        stats: &mut ResolveStats,
    ) {
        for &id in Self::query(&mut self.scratch, set.mushroom_index, avatar.position, stats) {
            let shroom = &set.mushrooms[id.index()];

            if horizontal_distance(avatar.position, shroom.position) >= shroom.cap_radius {
                continue;
            }

            let cap_top = shroom.cap_top();
            let inside_cap =
                avatar.position.y <= cap_top && avatar.position.y >= shroom.position.y;
            if !inside_cap {
                continue;
            }

            if shroom.trampoline {
                if avatar.velocity.y < 0.0 {
                    avatar.velocity.y = config.bounce_velocity;
                    avatar.grounded = false;
                    stats.contacts += 1;
                    events.push(ContactEvent::Bounce {
                        position: Vec3::new(avatar.position.x, cap_top, avatar.position.z),
                        velocity: config.bounce_velocity,
                    });
                }
            } else {
                // Solid cap: stand on it
                avatar.position.y = cap_top;
                if avatar.velocity.y < 0.0 {
                    avatar.velocity.y = 0.0;
                }
                avatar.grounded = true;
                stats.contacts += 1;
            }
        }
    }

    /// Walkable clouds act as ground when the avatar is settling onto
    /// their top surface; mist-tier clouds are purely decorative.
    fn resolve_clouds(
        &mut self,
        avatar: &mut AvatarState,
        set: &ObstacleSet<'_>,
        config: &PhysicsConfig,
        events: &mut EventBuffer,
        stats: &mut ResolveStats,
    ) {
        for &id in Self::query(&mut self.scratch, set.cloud_index, avatar.position, stats) {
            let cloud = &set.clouds[id.index()];
            if cloud.tier != CloudTier::Walkable {
                continue;
            }
            if horizontal_distance(avatar.position, cloud.position) >= cloud.radius {
                continue;
            }

            let offset = avatar.position.y - cloud.top;
            let settling = avatar.velocity.y <= 0.0;
            if settling && offset.abs() <= config.cloud_landing_tolerance {
                let landing = !avatar.grounded;
                avatar.position.y = cloud.top;
                avatar.velocity.y = 0.0;
                avatar.grounded = true;
                stats.contacts += 1;
                if landing {
                    events.push(ContactEvent::CloudLanding {
                        position: avatar.position,
                        surface: cloud.top,
                    });
                }
            }
        }
    }

    /// A free avatar near an unoccupied, cooled-down vine anchor grabs it.
    /// The first successful attach ends attach checks for the frame.
    fn resolve_vines(
        &mut self,
        avatar: &mut AvatarState,
        avatar_id: AvatarId,
        set: &mut ObstacleSet<'_>,
        config: &PhysicsConfig,
        events: &mut EventBuffer,
        stats: &mut ResolveStats,
    ) {
        if avatar.mode != MotionMode::Free {
            return;
        }

        self.scratch.clear();
        if let Some(index) = set.vine_index {
            index.query_into(avatar.position.x, avatar.position.z, &mut self.scratch);
        }
        stats.candidates += self.scratch.len();

        for &id in &self.scratch {
            let vine = &mut set.vine_swings[id.index()];
            let dist = (avatar.position - vine.anchor).length();
            if dist >= config.attach_radius {
                continue;
            }

            if vine.try_attach(avatar_id, avatar.position, config.max_swing_angle) {
                avatar.mode = MotionMode::VineAttached(VineId(id.0));
                stats.contacts += 1;
                events.push(ContactEvent::VineAttached {
                    vine: VineId(id.0),
                    position: avatar.position,
                });
                break;
            }
        }
    }
}
