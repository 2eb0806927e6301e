//! Terrain height seam.
//!
//! Ground height is owned by the world-generation collaborator; the
//! physics core only asks "how high is the ground here". The trait keeps
//! the scheduler testable against a flat floor.

/// Ground-height provider for the XZ plane.
pub trait TerrainSampler {
    /// World-space ground height at `(x, z)`.
    fn ground_height(&self, x: f32, z: f32) -> f32;
}

/// Three-octave rolling hills matching the shipped world's heightfield.
#[derive(Debug, Clone, Copy, Default)]
pub struct RollingTerrain;

impl TerrainSampler for RollingTerrain {
    fn ground_height(&self, x: f32, z: f32) -> f32 {
        let mut h = 0.0;
        h += (x * 0.05).sin() * 2.0 + (z * 0.05).cos() * 2.0;
        h += (x * 0.1).sin() * 0.8 + (z * 0.1).cos() * 0.8;
        h += (x * 0.2).sin() * 0.3 + (z * 0.2).cos() * 0.3;
        h
    }
}

/// Constant-height floor for tests.
#[derive(Debug, Clone, Copy)]
pub struct FlatTerrain(pub f32);

impl TerrainSampler for FlatTerrain {
    fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_terrain_is_bounded() {
        // Octave amplitudes sum to 3.1 per axis term pair
        let terrain = RollingTerrain;
        for i in 0..100 {
            for j in 0..100 {
                let h = terrain.ground_height(i as f32 * 7.3, j as f32 * 5.1);
                assert!((-6.2..=6.2).contains(&h), "height out of range: {}", h);
            }
        }
    }

    #[test]
    fn test_rolling_terrain_is_deterministic() {
        let terrain = RollingTerrain;
        assert_eq!(
            terrain.ground_height(12.5, -40.0),
            terrain.ground_height(12.5, -40.0)
        );
    }

    #[test]
    fn test_flat_terrain() {
        let terrain = FlatTerrain(2.0);
        assert_eq!(terrain.ground_height(100.0, -100.0), 2.0);
    }
}
