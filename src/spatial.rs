//! Uniform bucket grid over the wrapped world.
//!
//! The grid is a cache rebuilt from particle positions every step. Buckets
//! store particle indices and keep their allocations across `clear()`, so a
//! steady-state frame does no allocation here.
//!
//! The bucket count is bounded twice: by a fixed per-axis maximum when the
//! world is laid out, and by the population on every `rebuild`, so memory and
//! per-step clearing follow the particle count rather than the world area.
//! Fewer buckets only makes each one wider, which keeps the 3x3 neighborhood
//! complete.

use crate::constants::{MAX_GRID_AXIS_BUCKETS, MIN_CELL_SIZE};
use glam::Vec2;

pub type GridKey = (usize, usize);

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    world: Vec2,
    // Most buckets per axis the world and cell size allow.
    max_cols: usize,
    max_rows: usize,
    cols: usize,
    rows: usize,
    // Actual bucket extent; >= cell_size so the 3x3 block always covers cell_size.
    bucket_width: f32,
    bucket_height: f32,
    buckets: Vec<Vec<usize>>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialGrid {
    /// An unconfigured grid: one bucket holding everything.
    pub fn new() -> Self {
        Self {
            cell_size: MIN_CELL_SIZE,
            world: Vec2::ZERO,
            max_cols: 1,
            max_rows: 1,
            cols: 1,
            rows: 1,
            bucket_width: MIN_CELL_SIZE,
            bucket_height: MIN_CELL_SIZE,
            buckets: vec![Vec::new()],
        }
    }

    /// Re-lay the grid for a new interaction radius or world size. Empties it.
    pub fn configure(&mut self, cell_size: f32, width: f32, height: f32) {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };

        self.cell_size = cell_size;
        self.world = Vec2::new(width, height);
        self.max_cols = Self::buckets_along(width, cell_size);
        self.max_rows = Self::buckets_along(height, cell_size);
        self.lay_out(self.max_cols, self.max_rows);
    }

    fn buckets_along(extent: f32, cell_size: f32) -> usize {
        // Clamp in float space; the cast alone would saturate to usize::MAX.
        let count = (extent / cell_size)
            .floor()
            .clamp(1.0, MAX_GRID_AXIS_BUCKETS as f32);
        count as usize
    }

    // Buckets per axis that keep the total near one bucket per particle.
    fn population_budget(count: usize) -> usize {
        ((count as f64).sqrt().ceil() as usize).max(1)
    }

    fn lay_out(&mut self, cols: usize, rows: usize) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.bucket_width = if self.world.x > 0.0 {
            self.world.x / self.cols as f32
        } else {
            self.cell_size
        };
        self.bucket_height = if self.world.y > 0.0 {
            self.world.y / self.rows as f32
        } else {
            self.cell_size
        };

        let total = self.cols.saturating_mul(self.rows);
        // Keep existing bucket allocations where we can.
        self.buckets.resize_with(total, Vec::new);
        self.buckets.truncate(total);
        self.clear();
    }

    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
    }

    #[inline]
    pub fn key_for(&self, position: Vec2) -> GridKey {
        let cx = (position.x / self.bucket_width).floor() as i64;
        let cy = (position.y / self.bucket_height).floor() as i64;
        (
            cx.rem_euclid(self.cols as i64) as usize,
            cy.rem_euclid(self.rows as i64) as usize,
        )
    }

    #[inline]
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let (cx, cy) = self.key_for(position);
        self.buckets[cy * self.cols + cx].push(index);
    }

    /// Clear and bucket every position, index = position in the iterator.
    ///
    /// Shrinks the bucket layout first when the population is sparse.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Vec2>,
        I::IntoIter: ExactSizeIterator,
    {
        let positions = positions.into_iter();
        let budget = Self::population_budget(positions.len());
        let cols = self.max_cols.min(budget);
        let rows = self.max_rows.min(budget);
        if (cols, rows) != (self.cols, self.rows) {
            self.lay_out(cols, rows);
        } else {
            self.clear();
        }
        for (index, position) in positions.enumerate() {
            self.insert(index, position);
        }
    }

    /// Append every index in the 3x3 block of buckets around `position` to `out`.
    ///
    /// Bucket coordinates wrap at the world edges. The caller's own index is
    /// included if it is bucketed here; filter it out. `out` is not cleared.
    pub fn query_neighborhood_into(&self, position: Vec2, out: &mut Vec<usize>) {
        let (cx, cy) = self.key_for(position);
        let (xs, x_len) = Self::axis_neighbors(cx, self.cols);
        let (ys, y_len) = Self::axis_neighbors(cy, self.rows);
        for &y in &ys[..y_len] {
            let row = y * self.cols;
            for &x in &xs[..x_len] {
                out.extend_from_slice(&self.buckets[row + x]);
            }
        }
    }

    pub fn query_neighborhood(&self, position: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_neighborhood_into(position, &mut out);
        out
    }

    // Distinct bucket coordinates at offsets -1, 0, +1 along an axis of `count` buckets.
    #[inline]
    fn axis_neighbors(center: usize, count: usize) -> ([usize; 3], usize) {
        match count {
            1 => ([0, 0, 0], 1),
            2 => ([0, 1, 0], 2),
            _ => (
                [(center + count - 1) % count, center, (center + 1) % count],
                3,
            ),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Current bucket layout as `(cols, rows)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cell: f32, w: f32, h: f32) -> SpatialGrid {
        let mut grid = SpatialGrid::new();
        grid.configure(cell, w, h);
        grid
    }

    #[test]
    fn finds_entries_in_same_and_adjacent_buckets() {
        let mut grid = grid(10.0, 100.0, 100.0);
        grid.insert(0, Vec2::new(5.0, 5.0));
        grid.insert(1, Vec2::new(14.0, 8.0));
        grid.insert(2, Vec2::new(55.0, 55.0));

        let found = grid.query_neighborhood(Vec2::new(6.0, 6.0));
        assert!(found.contains(&0));
        assert!(found.contains(&1));
        assert!(!found.contains(&2));
    }

    #[test]
    fn neighborhood_wraps_across_edges() {
        let mut grid = grid(100.0, 1000.0, 1000.0);
        grid.insert(0, Vec2::new(995.0, 500.0));
        grid.insert(1, Vec2::new(5.0, 500.0));
        grid.insert(2, Vec2::new(500.0, 995.0));
        grid.insert(3, Vec2::new(500.0, 5.0));

        assert!(grid.query_neighborhood(Vec2::new(995.0, 500.0)).contains(&1));
        assert!(grid.query_neighborhood(Vec2::new(5.0, 500.0)).contains(&0));
        assert!(grid.query_neighborhood(Vec2::new(500.0, 5.0)).contains(&2));
        // Corner to corner.
        grid.insert(4, Vec2::new(2.0, 2.0));
        assert!(grid.query_neighborhood(Vec2::new(998.0, 998.0)).contains(&4));
    }

    #[test]
    fn partial_edge_bucket_does_not_hide_neighbors() {
        // 450 / 100 would leave a 50-wide sliver bucket; buckets stretch instead.
        let mut grid = grid(100.0, 450.0, 100.0);
        assert_eq!(grid.dimensions(), (4, 1));
        grid.insert(0, Vec2::new(380.0, 50.0));
        assert!(grid.query_neighborhood(Vec2::new(10.0, 50.0)).contains(&0));
    }

    #[test]
    fn small_axes_visit_each_bucket_once() {
        let mut grid = grid(100.0, 150.0, 250.0);
        assert_eq!(grid.dimensions(), (1, 2));
        grid.insert(0, Vec2::new(10.0, 10.0));
        grid.insert(1, Vec2::new(10.0, 200.0));
        let mut found = grid.query_neighborhood(Vec2::new(100.0, 100.0));
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn degenerate_configuration_collapses_to_one_bucket() {
        let mut grid = grid(0.0, 0.0, 0.0);
        assert_eq!(grid.cell_size(), MIN_CELL_SIZE);
        assert_eq!(grid.dimensions(), (1, 1));
        grid.insert(0, Vec2::new(3.0, -7.0));
        grid.insert(1, Vec2::new(f32::NAN, 1.0));
        assert_eq!(grid.query_neighborhood(Vec2::ZERO).len(), 2);
    }

    #[test]
    fn clear_keeps_layout_and_drops_entries() {
        let mut grid = grid(10.0, 100.0, 100.0);
        grid.insert(0, Vec2::new(1.0, 1.0));
        grid.insert(1, Vec2::new(50.0, 50.0));
        assert_eq!(grid.query_neighborhood(Vec2::new(1.0, 1.0)), vec![0]);
        grid.clear();
        assert_eq!(grid.dimensions(), (10, 10));
        assert!(grid.query_neighborhood(Vec2::new(1.0, 1.0)).is_empty());
        assert!(grid.query_neighborhood(Vec2::new(50.0, 50.0)).is_empty());
    }

    #[test]
    fn huge_world_with_tiny_cells_stays_bounded() {
        let mut grid = grid(1.0, 1e20, 1e20);
        assert_eq!(
            grid.dimensions(),
            (MAX_GRID_AXIS_BUCKETS, MAX_GRID_AXIS_BUCKETS)
        );
        grid.insert(0, Vec2::new(5e19, 5e19));
        assert!(grid.query_neighborhood(Vec2::new(5e19, 5e19)).contains(&0));
    }

    #[test]
    fn rebuild_sizes_buckets_to_population() {
        let mut grid = grid(1.0, 4000.0, 4000.0);
        let positions: Vec<Vec2> = (0..10)
            .map(|i| Vec2::new(i as f32 * 400.0, 3999.0 - i as f32 * 400.0))
            .collect();
        grid.rebuild(positions.iter().copied());
        assert_eq!(grid.dimensions(), (4, 4));

        // Wider buckets still find everything nearby, across the seam too.
        grid.rebuild([Vec2::new(3999.5, 10.0), Vec2::new(0.5, 10.0)]);
        assert_eq!(grid.dimensions(), (2, 2));
        assert!(grid.query_neighborhood(Vec2::new(3999.5, 10.0)).contains(&1));

        // A dense population gets the full layout back, capped per axis.
        grid.rebuild((0..200_000).map(|i| Vec2::new((i % 4000) as f32, (i / 4000) as f32)));
        assert_eq!(grid.dimensions(), (448, 448));
    }

    #[test]
    fn out_of_range_positions_are_wrapped_into_buckets() {
        let mut grid = grid(10.0, 100.0, 100.0);
        grid.insert(0, Vec2::new(-5.0, 105.0));
        assert_eq!(grid.key_for(Vec2::new(-5.0, 105.0)), (9, 0));
        assert!(grid.query_neighborhood(Vec2::new(95.0, 5.0)).contains(&0));
    }
}
