//! Fixed-rate session driving one avatar through a built world.
//!
//! The session owns the avatar, the scheduler, the input mapper, and the
//! decorative spore field. Frontends call [`Session::tick`] once per frame
//! with the raw input and the frame's audio features, then read the
//! snapshot and drained events back out.

use glam::Vec3;

use canopy_physics::{
    AudioFeatures, AvatarCommand, AvatarId, AvatarSnapshot, AvatarState, ContactEvent,
    MotionMode, Particle, ParticleSystem, PhysicsConfig, StepReport, Stepper,
};

use crate::input::{InputMapper, RawInput};
use crate::world::World;

/// Session tuning. The tick rate only sets the integration step; the
/// caller is responsible for actually calling at that cadence.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_rate: f32,
    pub particle_count: usize,
    pub particle_seed: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            particle_count: 192,
            particle_seed: 1,
        }
    }
}

/// One running game session.
pub struct Session {
    world: World,
    physics: PhysicsConfig,
    stepper: Stepper,
    mapper: InputMapper,
    avatar: AvatarState,
    avatar_id: AvatarId,
    particles: ParticleSystem,
    dt: f32,
    ticks: u64,
}

impl Session {
    pub fn new(world: World, config: SessionConfig) -> Self {
        let physics = world.config().clone();
        let spawn = world.spawn_position();
        let stepper = Stepper::new(&physics);
        let particles = ParticleSystem::new(
            config.particle_count,
            config.particle_seed,
            30.0,
            spawn.y + 10.0,
        );

        log::info!("session start: spawn at {:?}", spawn);

        Self {
            world,
            physics,
            stepper,
            mapper: InputMapper::new(),
            avatar: AvatarState::new(spawn),
            avatar_id: AvatarId(0),
            particles,
            dt: 1.0 / config.tick_rate,
            ticks: 0,
        }
    }

    /// Advance one frame from a raw input snapshot.
    pub fn tick(&mut self, input: &RawInput, audio: AudioFeatures) -> StepReport {
        let command = self.mapper.command(input);
        self.tick_with(&command, audio)
    }

    /// Advance one frame from an already-mapped command.
    pub fn tick_with(&mut self, command: &AvatarCommand, audio: AudioFeatures) -> StepReport {
        let (mut set, terrain) = self.world.physics_view();
        let report = self.stepper.step(
            &mut self.avatar,
            self.avatar_id,
            command,
            audio,
            &mut set,
            terrain,
            &self.physics,
            self.dt,
        );

        self.particles
            .set_emitter_target(self.avatar.position.y + 10.0);
        self.particles.update(self.dt);
        self.ticks += 1;
        report
    }

    /// Move the avatar somewhere at rest. Used by scripted drivers and
    /// debug commands. If the outgoing avatar was on a vine, the vine is
    /// released so it does not stay occupied by an avatar that no longer
    /// exists.
    pub fn place_avatar(&mut self, position: Vec3) {
        if let MotionMode::VineAttached(vine) = self.avatar.mode {
            self.world.force_release_vine(vine);
        }
        self.avatar = AvatarState::new(position);
    }

    #[inline]
    pub fn snapshot(&self) -> AvatarSnapshot {
        AvatarSnapshot::from(&self.avatar)
    }

    /// Take the contact events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<ContactEvent> {
        self.stepper.drain_events()
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        self.particles.particles()
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time since session start.
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.ticks as f32 * self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{IndexKind, WorldSpec};
    use canopy_physics::{FlatTerrain, MotionMode, Mushroom};

    fn flat_session(spec: WorldSpec) -> Session {
        let world = World::build_on(spec, Box::new(FlatTerrain(0.0))).unwrap();
        Session::new(world, SessionConfig::default())
    }

    #[test]
    fn test_avatar_settles_on_spawn_ground() {
        let mut session = flat_session(WorldSpec::empty());
        session.place_avatar(Vec3::new(0.0, 5.0, 0.0));

        for _ in 0..600 {
            session.tick(&RawInput::default(), AudioFeatures::default());
        }

        let snap = session.snapshot();
        assert!(snap.grounded);
        assert_eq!(snap.position.y, 0.0);
    }

    #[test]
    fn test_trampoline_drop_produces_exact_bounce() {
        let mut spec = WorldSpec::empty();
        spec.mushrooms.push(Mushroom {
            position: Vec3::new(0.0, 0.0, 0.0),
            cap_radius: 3.0,
            cap_height: 3.0,
            trampoline: true,
        });
        let bounce_velocity = spec.config.bounce_velocity;

        let mut session = flat_session(spec);
        session.place_avatar(Vec3::new(0.0, 8.0, 0.0));

        let mut bounced = false;
        for _ in 0..600 {
            session.tick(&RawInput::default(), AudioFeatures::default());
            if session
                .drain_events()
                .iter()
                .any(|e| matches!(e, ContactEvent::Bounce { .. }))
            {
                assert_eq!(session.snapshot().velocity.y, bounce_velocity);
                bounced = true;
                break;
            }
        }
        assert!(bounced, "drop over a trampoline never bounced");
    }

    #[test]
    fn test_demo_grove_session_is_deterministic() {
        let run = || {
            let world = World::build(WorldSpec::demo_grove(5)).unwrap();
            let mut session = Session::new(world, SessionConfig::default());

            for tick in 0..900 {
                let input = RawInput {
                    forward: true,
                    jump_held: tick % 120 < 10,
                    yaw: tick as f32 * 0.01,
                    ..Default::default()
                };
                let audio = AudioFeatures {
                    groove: 0.6,
                    bpm: 150.0,
                    beat_phase: (tick as f32 / 30.0).fract(),
                    kick: if tick % 30 == 0 { 1.0 } else { 0.0 },
                };
                session.tick(&input, audio);
            }
            let snap = session.snapshot();
            (snap.position, snap.velocity, snap.gravity_scale)
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_grid_and_linear_worlds_agree() {
        // The index is an accelerator, not a semantic choice: identical
        // inputs over identical catalogs must produce bit-identical
        // trajectories under either implementation.
        let run = |kind: IndexKind| {
            let mut spec = WorldSpec::demo_grove(11);
            spec.index_kind = kind;
            let world = World::build(spec).unwrap();
            let mut session = Session::new(world, SessionConfig::default());

            for tick in 0..600 {
                let input = RawInput {
                    forward: tick % 200 < 150,
                    right: tick % 90 < 45,
                    jump_held: tick % 75 < 8,
                    yaw: tick as f32 * 0.02,
                    ..Default::default()
                };
                session.tick(&input, AudioFeatures::default());
            }
            let snap = session.snapshot();
            (snap.position, snap.velocity)
        };

        assert_eq!(run(IndexKind::Grid), run(IndexKind::Linear));
    }

    #[test]
    fn test_vine_grab_owns_avatar_motion() {
        let mut spec = WorldSpec::empty();
        spec.vines.push(canopy_physics::VineAnchor {
            anchor: Vec3::new(0.0, 10.0, 0.0),
            length: 6.0,
        });

        let mut session = flat_session(spec);
        session.place_avatar(Vec3::new(1.5, 9.0, 0.0));

        session.tick(&RawInput::default(), AudioFeatures::default());
        assert!(matches!(
            session.snapshot().mode,
            MotionMode::VineAttached(_)
        ));

        // While attached the avatar stays exactly one rope length from
        // the anchor
        for _ in 0..120 {
            session.tick(
                &RawInput {
                    forward: true,
                    ..Default::default()
                },
                AudioFeatures::default(),
            );
            let rope = (session.snapshot().position - Vec3::new(0.0, 10.0, 0.0)).length();
            assert!((rope - 6.0).abs() < 1e-3);
        }

        // Jump lets go
        session.tick(
            &RawInput {
                jump_held: true,
                ..Default::default()
            },
            AudioFeatures::default(),
        );
        assert_eq!(session.snapshot().mode, MotionMode::Free);
    }

    #[test]
    fn test_reset_while_attached_releases_the_vine() {
        let mut spec = WorldSpec::empty();
        spec.vines.push(canopy_physics::VineAnchor {
            anchor: Vec3::new(0.0, 10.0, 0.0),
            length: 6.0,
        });

        let mut session = flat_session(spec);
        session.place_avatar(Vec3::new(1.5, 9.0, 0.0));
        session.tick(&RawInput::default(), AudioFeatures::default());
        assert!(matches!(
            session.snapshot().mode,
            MotionMode::VineAttached(_)
        ));

        // A position reset replaces the avatar mid-swing; the vine must
        // not stay occupied by the discarded one
        session.place_avatar(Vec3::new(50.0, 0.0, 50.0));
        assert!(!session.world().vine_swings()[0].is_attached());

        // And the new avatar can grab it again
        session.place_avatar(Vec3::new(1.5, 9.0, 0.0));
        session.tick(&RawInput::default(), AudioFeatures::default());
        assert!(matches!(
            session.snapshot().mode,
            MotionMode::VineAttached(_)
        ));
    }

    #[test]
    fn test_particles_tick_with_session() {
        let mut session = flat_session(WorldSpec::empty());
        let count = session.particles().len();
        for _ in 0..300 {
            session.tick(&RawInput::default(), AudioFeatures::default());
        }
        assert_eq!(session.particles().len(), count);
    }
}
