//! Spatial indexing of static obstacles.
//!
//! One index is built per obstacle type at world load and then treated as
//! read-only for the lifetime of the world; "rebuild" replaces the whole
//! structure. Queries fill a caller-owned scratch buffer so the per-frame
//! hot path performs no heap allocation.

use std::collections::HashMap;

use thiserror::Error;

use crate::obstacles::ObstacleId;

/// Diagnostic counters for a built index. Not used for correctness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexStats {
    /// Total inserted obstacle handles.
    pub objects: usize,
    /// Occupied cells (always 1 for the linear baseline).
    pub cells: usize,
    /// Mean handles per occupied cell.
    pub avg_per_cell: f32,
}

/// Lookup structure for obstacles near a world-space XZ point.
///
/// Two interchangeable implementations exist: [`SpatialHashGrid`] (the
/// production structure) and [`LinearIndex`] (a full-scan baseline kept
/// for performance comparison). Selection happens at world build time.
pub trait ObstacleIndex {
    /// Place a handle into the index at its world XZ position.
    fn insert(&mut self, id: ObstacleId, x: f32, z: f32);

    /// Append every candidate near `(x, z)` to `out`.
    ///
    /// Over-fetching is allowed; missing a candidate within one cell width
    /// of the query point is not. `out` is not cleared by the callee.
    fn query_into(&self, x: f32, z: f32, out: &mut Vec<ObstacleId>);

    /// Empty the index without changing its configuration.
    fn clear(&mut self);

    /// Replace the entire contents with the given `(id, x, z)` entries.
    fn rebuild(&mut self, entries: &[(ObstacleId, f32, f32)]) {
        self.clear();
        for &(id, x, z) in entries {
            self.insert(id, x, z);
        }
    }

    /// Number of inserted handles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diagnostic counters.
    fn stats(&self) -> IndexStats;
}

/// Rejected grid configuration.
#[derive(Debug, Error, PartialEq)]
#[error("cell size must be a positive finite number, got {0}")]
pub struct InvalidCellSize(pub f32);

/// Uniform hash grid over the world's XZ plane.
///
/// Each obstacle lives in exactly one cell, keyed by
/// `(floor(x / cell_size), floor(z / cell_size))`. A query unions the 3×3
/// block of cells around the query point, which guarantees no false
/// negatives for any interaction radius up to one cell width. With the
/// design cell size of 10 world units every obstacle radius in the game
/// (caves ~2.5, mushrooms ~2.0, vines ~2.5) is comfortably below that
/// bound, so no per-type tuning is needed.
///
/// Out-of-range coordinates are not an error; they simply hash to new
/// cells, positive or negative.
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<ObstacleId>>,
    objects: usize,
}

impl SpatialHashGrid {
    /// Create an empty grid. Fails fast on a degenerate cell size rather
    /// than silently producing a single-cell index.
    pub fn new(cell_size: f32) -> Result<Self, InvalidCellSize> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            objects: 0,
        })
    }

    /// Configured cell width in world units.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, x: f32, z: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (z / self.cell_size).floor() as i32,
        )
    }
}

impl ObstacleIndex for SpatialHashGrid {
    fn insert(&mut self, id: ObstacleId, x: f32, z: f32) {
        let cell = self.cell_of(x, z);
        self.cells.entry(cell).or_default().push(id);
        self.objects += 1;
    }

    fn query_into(&self, x: f32, z: f32, out: &mut Vec<ObstacleId>) {
        let (cx, cz) = self.cell_of(x, z);
        for dz in -1..=1 {
            for dx in -1..=1 {
                if let Some(ids) = self.cells.get(&(cx + dx, cz + dz)) {
                    out.extend_from_slice(ids);
                }
            }
        }
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.objects = 0;
    }

    fn len(&self) -> usize {
        self.objects
    }

    fn stats(&self) -> IndexStats {
        let cells = self.cells.len();
        IndexStats {
            objects: self.objects,
            cells,
            avg_per_cell: self.objects as f32 / cells.max(1) as f32,
        }
    }
}

/// Full-scan baseline implementing the same contract as the grid.
///
/// Every query returns every inserted handle, which is trivially complete
/// and maximally over-fetching. Kept so the grid's locality win can be
/// measured against the naive approach on identical worlds.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    entries: Vec<ObstacleId>,
}

impl LinearIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObstacleIndex for LinearIndex {
    fn insert(&mut self, id: ObstacleId, _x: f32, _z: f32) {
        self.entries.push(id);
    }

    fn query_into(&self, _x: f32, _z: f32, out: &mut Vec<ObstacleId>) {
        out.extend_from_slice(&self.entries);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            objects: self.entries.len(),
            cells: 1,
            avg_per_cell: self.entries.len() as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;

    const CELL: f32 = 10.0;

    fn scatter(rng: &mut SeededRandom, n: usize, half_extent: f32) -> Vec<(ObstacleId, f32, f32)> {
        (0..n)
            .map(|i| {
                (
                    ObstacleId(i as u32),
                    rng.next_range(-half_extent, half_extent),
                    rng.next_range(-half_extent, half_extent),
                )
            })
            .collect()
    }

    #[test]
    fn test_invalid_cell_size_rejected() {
        assert!(matches!(
            SpatialHashGrid::new(0.0),
            Err(InvalidCellSize(v)) if v == 0.0
        ));
        assert!(SpatialHashGrid::new(-3.0).is_err());
        assert!(SpatialHashGrid::new(f32::NAN).is_err());
        assert!(SpatialHashGrid::new(CELL).is_ok());
    }

    #[test]
    fn test_query_complete_within_one_cell_width() {
        // Every object within cell_size of the query point must appear in
        // the 3x3 result, including across negative-coordinate cells.
        let mut rng = SeededRandom::new(99);
        let entries = scatter(&mut rng, 500, 100.0);
        let mut grid = SpatialHashGrid::new(CELL).unwrap();
        grid.rebuild(&entries);

        let mut out = Vec::new();
        for qi in 0..50 {
            let qx = rng.next_range(-100.0, 100.0);
            let qz = rng.next_range(-100.0, 100.0);
            out.clear();
            grid.query_into(qx, qz, &mut out);

            for &(id, x, z) in &entries {
                let dist = ((x - qx).powi(2) + (z - qz).powi(2)).sqrt();
                if dist <= CELL {
                    assert!(
                        out.contains(&id),
                        "query {} missed object {:?} at distance {}",
                        qi,
                        id,
                        dist
                    );
                }
            }
        }
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let mut rng = SeededRandom::new(5);
        let entries = scatter(&mut rng, 200, 80.0);
        let mut grid = SpatialHashGrid::new(CELL).unwrap();

        grid.rebuild(&entries);
        let first = grid.stats();
        grid.rebuild(&entries);
        let second = grid.stats();

        assert_eq!(first, second);
        assert_eq!(first.objects, 200);
    }

    #[test]
    fn test_clear_preserves_cell_size() {
        let mut grid = SpatialHashGrid::new(CELL).unwrap();
        grid.insert(ObstacleId(0), 1.0, 1.0);
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.cell_size(), CELL);
    }

    #[test]
    fn test_negative_coordinates_hash_to_distinct_cells() {
        let mut grid = SpatialHashGrid::new(CELL).unwrap();
        grid.insert(ObstacleId(0), -5.0, -5.0);
        grid.insert(ObstacleId(1), 5.0, 5.0);

        let mut out = Vec::new();
        grid.query_into(-5.0, -5.0, &mut out);
        assert!(out.contains(&ObstacleId(0)));
        // (5,5) lies in cell (0,0), a direct neighbor of (-1,-1)
        assert!(out.contains(&ObstacleId(1)));

        out.clear();
        grid.query_into(-55.0, -55.0, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_query_locality_independent_of_population() {
        // Constant density: 100 objects over 100x100 vs 10,000 over
        // 1000x1000. Expected per-query candidate count is O(N/K) and
        // should not grow with total population.
        let mut avg_counts = Vec::new();
        for &(n, half) in &[(100usize, 50.0f32), (10_000usize, 500.0f32)] {
            let mut rng = SeededRandom::new(1234);
            let entries = scatter(&mut rng, n, half);
            let mut grid = SpatialHashGrid::new(CELL).unwrap();
            grid.rebuild(&entries);

            let mut out = Vec::new();
            let mut total = 0usize;
            let queries = 200;
            for _ in 0..queries {
                let qx = rng.next_range(-half, half);
                let qz = rng.next_range(-half, half);
                out.clear();
                grid.query_into(qx, qz, &mut out);
                total += out.len();
            }
            avg_counts.push(total as f32 / queries as f32);
        }

        // Same density, so the 100x-larger world should cost about the
        // same per query. Allow generous slack for edge effects.
        assert!(
            avg_counts[1] < avg_counts[0] * 3.0 + 5.0,
            "query cost grew with population: {:?}",
            avg_counts
        );
    }

    #[test]
    fn test_linear_index_returns_everything() {
        let mut rng = SeededRandom::new(8);
        let entries = scatter(&mut rng, 50, 100.0);
        let mut linear = LinearIndex::new();
        linear.rebuild(&entries);

        let mut out = Vec::new();
        linear.query_into(0.0, 0.0, &mut out);
        assert_eq!(out.len(), 50);
        assert_eq!(linear.stats().cells, 1);
    }

    #[test]
    fn test_grid_results_are_subset_of_linear() {
        let mut rng = SeededRandom::new(31);
        let entries = scatter(&mut rng, 300, 120.0);

        let mut grid = SpatialHashGrid::new(CELL).unwrap();
        grid.rebuild(&entries);
        let mut linear = LinearIndex::new();
        linear.rebuild(&entries);

        let mut grid_out = Vec::new();
        let mut linear_out = Vec::new();
        grid.query_into(12.0, -40.0, &mut grid_out);
        linear.query_into(12.0, -40.0, &mut linear_out);

        for id in &grid_out {
            assert!(linear_out.contains(id));
        }
        assert!(grid_out.len() <= linear_out.len());
    }
}
