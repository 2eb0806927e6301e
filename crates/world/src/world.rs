//! World catalog assembly and index construction.
//!
//! A [`WorldSpec`] is plain data: a physics config plus per-type obstacle
//! catalogs. [`World::build`] validates everything up front and constructs
//! one spatial index per obstacle type, so that by the time a session
//! starts ticking nothing can fail anymore.

use glam::Vec3;
use thiserror::Error;

use canopy_physics::{
    CaveGate, Cloud, CloudTier, ConfigError, IndexStats, InvalidCellSize, LinearIndex, Mushroom,
    ObstacleError, ObstacleId, ObstacleIndex, ObstacleSet, PhysicsConfig, RollingTerrain,
    SeededRandom, SpatialHashGrid, TerrainSampler, VineAnchor, VineId, VineSwing,
};

/// Which index implementation a world is built with.
///
/// `Linear` exists for side-by-side comparison against the grid; both
/// produce identical contact results on the same catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Grid,
    Linear,
}

/// World construction failure.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("physics config rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("bad {kind} record at index {index}: {source}")]
    Obstacle {
        kind: &'static str,
        index: usize,
        source: ObstacleError,
    },

    #[error(transparent)]
    Index(#[from] InvalidCellSize),
}

/// Plain-data description of a world, consumed by [`World::build`].
#[derive(Debug, Clone)]
pub struct WorldSpec {
    pub config: PhysicsConfig,
    pub caves: Vec<CaveGate>,
    pub mushrooms: Vec<Mushroom>,
    pub clouds: Vec<Cloud>,
    pub vines: Vec<VineAnchor>,
    pub index_kind: IndexKind,
}

impl WorldSpec {
    /// An empty world with default tuning, mostly for tests.
    pub fn empty() -> Self {
        Self {
            config: PhysicsConfig::default(),
            caves: Vec::new(),
            mushrooms: Vec::new(),
            clouds: Vec::new(),
            vines: Vec::new(),
            index_kind: IndexKind::Grid,
        }
    }

    /// The shipped demo layout: a grove of mushrooms around the spawn,
    /// vines on the inner ring, walkable clouds overhead, and cave mouths
    /// on the outskirts. Deterministic for a given seed.
    pub fn demo_grove(seed: u32) -> Self {
        let terrain = RollingTerrain;
        let mut rng = SeededRandom::new(seed);
        let mut spec = Self::empty();

        // Mushroom ring, every third cap a trampoline
        for i in 0..12 {
            let angle = i as f32 / 12.0 * std::f32::consts::TAU;
            let r = 18.0 + rng.next_range(-3.0, 3.0);
            let (x, z) = (angle.cos() * r, angle.sin() * r);
            spec.mushrooms.push(Mushroom {
                position: Vec3::new(x, terrain.ground_height(x, z), z),
                cap_radius: rng.next_range(1.5, 2.5),
                cap_height: rng.next_range(2.0, 4.0),
                trampoline: i % 3 == 0,
            });
        }

        // Inner ring of vines
        for i in 0..8 {
            let angle = (i as f32 + 0.5) / 8.0 * std::f32::consts::TAU;
            let r = 10.0 + rng.next_range(-2.0, 2.0);
            let (x, z) = (angle.cos() * r, angle.sin() * r);
            spec.vines.push(VineAnchor {
                anchor: Vec3::new(x, terrain.ground_height(x, z) + 12.0, z),
                length: rng.next_range(5.0, 7.0),
            });
        }

        // Cave mouths on the outskirts, half of them flooded
        for i in 0..6 {
            let angle = i as f32 / 6.0 * std::f32::consts::TAU;
            let (x, z) = (angle.cos() * 60.0, angle.sin() * 60.0);
            spec.caves.push(CaveGate {
                position: Vec3::new(x, terrain.ground_height(x, z), z),
                radius: 2.5,
                flooded: i % 2 == 0,
            });
        }

        // Cloud deck: walkable stepping stones plus decorative mist
        for i in 0..10 {
            let x = rng.next_range(-80.0, 80.0);
            let z = rng.next_range(-80.0, 80.0);
            let base = rng.next_range(16.0, 24.0);
            spec.clouds.push(Cloud {
                position: Vec3::new(x, base, z),
                radius: rng.next_range(3.0, 5.0),
                top: base + 2.0,
                tier: if i % 2 == 0 {
                    CloudTier::Walkable
                } else {
                    CloudTier::Mist
                },
            });
        }

        spec
    }
}

/// A built, validated world: static catalogs, per-type indices, vine
/// dynamics, and the terrain sampler.
pub struct World {
    config: PhysicsConfig,
    terrain: Box<dyn TerrainSampler>,

    caves: Vec<CaveGate>,
    mushrooms: Vec<Mushroom>,
    clouds: Vec<Cloud>,
    vine_anchors: Vec<VineAnchor>,
    vine_swings: Vec<VineSwing>,

    cave_index: Box<dyn ObstacleIndex>,
    mushroom_index: Box<dyn ObstacleIndex>,
    cloud_index: Box<dyn ObstacleIndex>,
    vine_index: Box<dyn ObstacleIndex>,
}

impl World {
    /// Validate the spec and build all indices.
    pub fn build(spec: WorldSpec) -> Result<Self, WorldError> {
        Self::build_on(spec, Box::new(RollingTerrain))
    }

    /// Build with an explicit terrain sampler (tests use a flat floor).
    pub fn build_on(
        spec: WorldSpec,
        terrain: Box<dyn TerrainSampler>,
    ) -> Result<Self, WorldError> {
        spec.config.validate()?;

        validate_catalog("cave gate", &spec.caves, CaveGate::validate)?;
        validate_catalog("mushroom", &spec.mushrooms, Mushroom::validate)?;
        validate_catalog("cloud", &spec.clouds, Cloud::validate)?;
        validate_catalog("vine", &spec.vines, VineAnchor::validate)?;

        let cell = spec.config.cell_size;
        let kind = spec.index_kind;
        let cave_index = build_index(kind, cell, spec.caves.iter().map(|c| c.position))?;
        let mushroom_index = build_index(kind, cell, spec.mushrooms.iter().map(|m| m.position))?;
        let cloud_index = build_index(kind, cell, spec.clouds.iter().map(|c| c.position))?;
        let vine_index = build_index(kind, cell, spec.vines.iter().map(|v| v.anchor))?;

        let vine_swings = spec.vines.iter().map(VineSwing::from_record).collect();

        log::info!(
            "world built: {} caves, {} mushrooms, {} clouds, {} vines ({:?} index)",
            spec.caves.len(),
            spec.mushrooms.len(),
            spec.clouds.len(),
            spec.vines.len(),
            kind
        );

        Ok(Self {
            config: spec.config,
            terrain,
            caves: spec.caves,
            mushrooms: spec.mushrooms,
            clouds: spec.clouds,
            vine_anchors: spec.vines,
            vine_swings,
            cave_index,
            mushroom_index,
            cloud_index,
            vine_index,
        })
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    #[inline]
    pub fn vine_anchors(&self) -> &[VineAnchor] {
        &self.vine_anchors
    }

    #[inline]
    pub fn vine_swings(&self) -> &[VineSwing] {
        &self.vine_swings
    }

    /// Spawn pose: on the ground at the world origin.
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::new(0.0, self.terrain.ground_height(0.0, 0.0), 0.0)
    }

    /// Re-derive every index from the catalogs. Obstacle records are
    /// static today; this exists for editors that mutate catalogs in
    /// place and then want the indices to match again.
    pub fn rebuild_indices(&mut self) {
        let entries = |positions: &mut dyn Iterator<Item = Vec3>| {
            positions
                .enumerate()
                .map(|(i, p)| (ObstacleId(i as u32), p.x, p.z))
                .collect::<Vec<_>>()
        };
        self.cave_index
            .rebuild(&entries(&mut self.caves.iter().map(|c| c.position)));
        self.mushroom_index
            .rebuild(&entries(&mut self.mushrooms.iter().map(|m| m.position)));
        self.cloud_index
            .rebuild(&entries(&mut self.clouds.iter().map(|c| c.position)));
        self.vine_index
            .rebuild(&entries(&mut self.vine_anchors.iter().map(|v| v.anchor)));
    }

    /// Clear a vine's occupancy without a normal detach. Called when the
    /// attached avatar is replaced out from under it, so the vine does
    /// not stay occupied by an avatar that no longer exists.
    pub fn force_release_vine(&mut self, vine: VineId) {
        if let Some(swing) = self.vine_swings.get_mut(vine.index()) {
            swing.force_detach();
        }
    }

    /// Per-type index diagnostics, labeled for logging.
    pub fn index_stats(&self) -> [(&'static str, IndexStats); 4] {
        [
            ("caves", self.cave_index.stats()),
            ("mushrooms", self.mushroom_index.stats()),
            ("clouds", self.cloud_index.stats()),
            ("vines", self.vine_index.stats()),
        ]
    }

    /// Total candidates a point query returns across all four indices.
    /// Used to compare index implementations on identical catalogs.
    pub fn probe_candidates(&self, x: f32, z: f32) -> usize {
        let mut out = Vec::new();
        for index in [
            &self.cave_index,
            &self.mushroom_index,
            &self.cloud_index,
            &self.vine_index,
        ] {
            index.query_into(x, z, &mut out);
        }
        out.len()
    }

    /// Split the world into the borrow shape the scheduler wants: the
    /// obstacle view (vine dynamics mutable, everything else shared) plus
    /// the terrain sampler.
    pub fn physics_view(&mut self) -> (ObstacleSet<'_>, &dyn TerrainSampler) {
        let set = ObstacleSet {
            caves: &self.caves,
            cave_index: Some(self.cave_index.as_ref()),
            mushrooms: &self.mushrooms,
            mushroom_index: Some(self.mushroom_index.as_ref()),
            clouds: &self.clouds,
            cloud_index: Some(self.cloud_index.as_ref()),
            vine_swings: &mut self.vine_swings,
            vine_index: Some(self.vine_index.as_ref()),
        };
        (set, self.terrain.as_ref())
    }
}

fn validate_catalog<T>(
    kind: &'static str,
    records: &[T],
    validate: impl Fn(&T) -> Result<(), ObstacleError>,
) -> Result<(), WorldError> {
    for (index, record) in records.iter().enumerate() {
        validate(record).map_err(|source| WorldError::Obstacle {
            kind,
            index,
            source,
        })?;
    }
    Ok(())
}

fn build_index(
    kind: IndexKind,
    cell_size: f32,
    positions: impl Iterator<Item = Vec3>,
) -> Result<Box<dyn ObstacleIndex>, InvalidCellSize> {
    let mut index: Box<dyn ObstacleIndex> = match kind {
        IndexKind::Grid => Box::new(SpatialHashGrid::new(cell_size)?),
        IndexKind::Linear => Box::new(LinearIndex::new()),
    };
    for (i, p) in positions.enumerate() {
        index.insert(ObstacleId(i as u32), p.x, p.z);
    }
    Ok(index)
}
