//! Drifting spore particles.
//!
//! Purely decorative, but simulated here so the renderer stays a dumb
//! consumer. Particles fall under a gentle gravity, fade over time, and
//! respawn near the emitter once expired. The emitter height eases toward
//! its target with a critically-damped spring so moving it (say, to follow
//! the avatar) reads as a drift rather than a snap.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::smooth_damp;
use crate::random::SeededRandom;

/// Downward drift applied to every spore (units/second²).
const SPORE_GRAVITY: f32 = 2.0;

/// Life drained per second; a fresh spore lives five seconds.
const LIFE_DECAY: f32 = 0.2;

/// Seconds for the emitter spring to mostly reach a new target.
const EMITTER_SMOOTH_TIME: f32 = 1.5;

/// One spore.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining life in [0, 1]; renderers use it as alpha.
    pub life: f32,
}

/// Fixed-population spore field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: SeededRandom,
    /// Horizontal respawn spread around the emitter.
    spread: f32,
    emitter_height: f32,
    emitter_target: f32,
    emitter_spring_vel: f32,
}

impl ParticleSystem {
    /// Spawn `count` spores with staggered lifetimes so they do not all
    /// expire on the same frame.
    pub fn new(count: usize, seed: u32, spread: f32, emitter_height: f32) -> Self {
        let mut rng = SeededRandom::new(seed);
        let particles = (0..count)
            .map(|_| {
                let mut p = spawn(&mut rng, spread, emitter_height);
                p.life = rng.next();
                p.position.y = emitter_height * rng.next();
                p
            })
            .collect();

        Self {
            particles,
            rng,
            spread,
            emitter_height,
            emitter_target: emitter_height,
            emitter_spring_vel: 0.0,
        }
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn emitter_height(&self) -> f32 {
        self.emitter_height
    }

    /// Move the respawn height; the emitter eases there over a second or so.
    pub fn set_emitter_target(&mut self, height: f32) {
        self.emitter_target = height;
    }

    /// Advance every spore by one frame.
    pub fn update(&mut self, delta_time: f32) {
        self.emitter_height = smooth_damp(
            self.emitter_height,
            self.emitter_target,
            &mut self.emitter_spring_vel,
            EMITTER_SMOOTH_TIME,
            delta_time,
        );

        for particle in &mut self.particles {
            particle.velocity.y -= SPORE_GRAVITY * delta_time;
            particle.position += particle.velocity * delta_time;
            particle.life -= LIFE_DECAY * delta_time;

            if particle.life <= 0.0 || particle.position.y < 0.0 {
                *particle = spawn(&mut self.rng, self.spread, self.emitter_height);
            }
        }
    }
}

fn spawn(rng: &mut SeededRandom, spread: f32, height: f32) -> Particle {
    Particle {
        position: Vec3::new(
            rng.next_range(-spread, spread),
            height,
            rng.next_range(-spread, spread),
        ),
        velocity: Vec3::new(
            rng.next_range(-0.3, 0.3),
            rng.next_range(-0.2, 0.0),
            rng.next_range(-0.3, 0.3),
        ),
        life: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_population_is_fixed() {
        let mut system = ParticleSystem::new(64, 7, 20.0, 10.0);
        for _ in 0..2000 {
            system.update(DT);
        }
        assert_eq!(system.particles().len(), 64);
    }

    #[test]
    fn test_expired_spores_respawn_at_emitter() {
        let mut system = ParticleSystem::new(32, 7, 20.0, 10.0);
        // Ten simulated seconds outlives every initial lifetime
        for _ in 0..600 {
            system.update(DT);
        }
        for p in system.particles() {
            assert!(p.life > 0.0);
            assert!(p.position.y >= 0.0);
            assert!(p.position.x.abs() <= 20.0 + 10.0, "strayed: {}", p.position.x);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let mut a = ParticleSystem::new(16, 42, 20.0, 10.0);
        let mut b = ParticleSystem::new(16, 42, 20.0, 10.0);
        for _ in 0..500 {
            a.update(DT);
            b.update(DT);
        }
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.position, pb.position);
            assert_eq!(pa.life, pb.life);
        }
    }

    #[test]
    fn test_emitter_eases_toward_target() {
        let mut system = ParticleSystem::new(1, 1, 5.0, 10.0);
        system.set_emitter_target(20.0);

        system.update(DT);
        let after_one = system.emitter_height();
        assert!(after_one > 10.0 && after_one < 20.0, "should ease, not snap");

        for _ in 0..600 {
            system.update(DT);
        }
        assert!((system.emitter_height() - 20.0).abs() < 0.1);
    }
}
