//! Uniform-grid spatial hash over particle positions (XY plane)

use lumen_core::Vec3;
use std::collections::HashMap;

type Cell = (i32, i32);

/// Buckets particle indices by `(floor(x / cell), floor(y / cell))`.
///
/// The grid is rebuilt from scratch rather than maintained incrementally;
/// between rebuilds it answers queries against the positions it was built
/// from. Cell lists keep their allocations across rebuilds.
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
    /// Cell each particle was inserted into at the last rebuild
    particle_cells: Vec<Cell>,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1e-3),
            cells: HashMap::new(),
            particle_cells: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Clear and reinsert every particle from flat `xyz` positions
    pub fn rebuild(&mut self, positions: &[f32]) {
        for list in self.cells.values_mut() {
            list.clear();
        }
        self.particle_cells.clear();

        for (i, p) in positions.chunks_exact(3).enumerate() {
            let cell = self.cell_of(p[0], p[1]);
            self.particle_cells.push(cell);
            self.cells.entry(cell).or_default().push(i);
        }

        // Particles drift; drop buckets that stayed empty so the map doesn't grow forever
        if self.cells.len() > self.particle_cells.len() * 2 + 64 {
            self.cells.retain(|_, list| !list.is_empty());
        }
    }

    /// Number of particles indexed at the last rebuild
    pub fn len(&self) -> usize {
        self.particle_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particle_cells.is_empty()
    }

    /// Candidates from the 3x3 cells around particle `i`, including `i` itself.
    /// Empty if `i` was not present at the last rebuild.
    pub fn neighbors(&self, i: usize) -> Vec<usize> {
        let mut out = Vec::new();
        self.neighbors_into(i, &mut out);
        out
    }

    /// Allocation-free variant of `neighbors`; `out` is cleared first
    pub fn neighbors_into(&self, i: usize, out: &mut Vec<usize>) {
        out.clear();
        if let Some(&cell) = self.particle_cells.get(i) {
            self.collect(cell, out);
        }
    }

    /// Candidates from the 3x3 cells around an arbitrary point
    pub fn query(&self, point: Vec3) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(point, &mut out);
        out
    }

    pub fn query_into(&self, point: Vec3, out: &mut Vec<usize>) {
        out.clear();
        let cell = self.cell_of(point.x, point.y);
        self.collect(cell, out);
    }

    fn collect(&self, (cx, cy): Cell, out: &mut Vec<usize>) {
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(list) = self.cells.get(&(cx + dx, cy + dy)) {
                    out.extend_from_slice(list);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rand::ParticleRng;

    fn random_positions(count: usize, extent: f32, seed: u32) -> Vec<f32> {
        let mut rng = ParticleRng::new(seed);
        (0..count * 3).map(|_| rng.range(-extent, extent)).collect()
    }

    #[test]
    fn neighbors_include_self() {
        let positions = random_positions(100, 10.0, 3);
        let mut grid = SpatialHashGrid::new(2.0);
        grid.rebuild(&positions);
        for i in 0..100 {
            assert!(grid.neighbors(i).contains(&i));
        }
    }

    #[test]
    fn no_false_negatives_within_one_cell() {
        let positions = random_positions(400, 8.0, 11);
        let cell = 1.5;
        let mut grid = SpatialHashGrid::new(cell);
        grid.rebuild(&positions);

        let at = |i: usize| Vec3::from_slice(&positions[i * 3..i * 3 + 3]);
        for i in 0..400 {
            let found = grid.neighbors(i);
            for j in 0..400 {
                if i != j && at(i).distance(at(j)) < cell {
                    assert!(found.contains(&j), "particle {j} missing from neighbors of {i}");
                }
            }
        }
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let mut grid = SpatialHashGrid::new(1.0);
        grid.rebuild(&[0.0, 0.0, 0.0, 50.0, 50.0, 0.0]);
        assert!(!grid.neighbors(0).contains(&1));

        grid.rebuild(&[0.0, 0.0, 0.0, 0.5, 0.5, 0.0]);
        assert!(grid.neighbors(0).contains(&1));
        assert_eq!(grid.neighbors(0).len(), 2);
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn unknown_index_yields_nothing() {
        let mut grid = SpatialHashGrid::new(1.0);
        grid.rebuild(&[0.0, 0.0, 0.0]);
        assert!(grid.neighbors(5).is_empty());
    }

    #[test]
    fn point_query_matches_cell_neighborhood() {
        let mut grid = SpatialHashGrid::new(1.0);
        grid.rebuild(&[0.2, 0.2, 0.0, 1.5, 0.2, 0.0, 5.0, 5.0, 0.0]);
        let mut out = Vec::new();
        grid.query_into(Vec3::new(0.5, 0.5, 9.0), &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1]);
        assert_eq!(grid.query(Vec3::new(5.1, 4.9, 0.0)), vec![2]);
    }
}
