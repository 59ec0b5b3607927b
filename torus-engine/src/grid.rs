// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Spatial grid over obstacles
//!
//! Obstacles are bucketed into square cells covering the domain. A query
//! visits the 3x3 block of cells around a point, with cell indices wrapping
//! the same way positions do, so an obstacle just across the right edge is
//! found from a point near the left edge.
//!
//! A wall is stored in every cell its reach covers, where the reach is its
//! half size plus the widest collider radius among bodies. A body touching
//! a wall therefore always finds it in its own cell, however large the wall
//! and however narrow the last column at the seam.
//!
//! The grid is rebuilt from scratch once per tick. If any bucket exceeds
//! the configured occupancy, the grid marks itself saturated and queries
//! return every indexed obstacle instead.

use crate::config::GridConfig;
use crate::ecs::{ComponentStorage, Entity, Storage};
use crate::topology::Domain;
use glam::DVec2;

/// Bucketed index of non-destroyed walls
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    extent: DVec2,
    cell_size: f64,
    cols: usize,
    rows: usize,
    max_bucket: usize,
    buckets: Vec<Vec<Entity>>,
    all: Vec<Entity>,
    saturated: bool,
}

impl SpatialGrid {
    /// Create an empty grid covering `domain`
    ///
    /// A non-positive or non-finite cell size falls back to one cell per
    /// domain axis.
    pub fn new(domain: &Domain, config: &GridConfig) -> Self {
        let cell_size = if config.cell_size > 0.0 && config.cell_size.is_finite() {
            config.cell_size
        } else {
            domain.width().max(domain.height())
        };
        let cols = ((domain.width() / cell_size).ceil() as usize).max(1);
        let rows = ((domain.height() / cell_size).ceil() as usize).max(1);
        SpatialGrid {
            extent: domain.extent(),
            cell_size,
            cols,
            rows,
            max_bucket: config.max_bucket.max(1),
            buckets: vec![Vec::new(); cols * rows],
            all: Vec::new(),
            saturated: false,
        }
    }

    /// Grid dimensions as (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Cell edge length
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Whether the last rebuild overflowed a bucket
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    /// Number of indexed obstacles
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Check if no obstacle is indexed
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Cell coordinates containing `position`, wrapped into the grid
    pub fn cell_of(&self, position: DVec2) -> (usize, usize) {
        let cx = (position.x / self.cell_size).floor();
        let cy = (position.y / self.cell_size).floor();
        (wrap_index(cx, self.cols), wrap_index(cy, self.rows))
    }

    /// Empty every bucket, keeping allocations
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.all.clear();
        self.saturated = false;
    }

    /// Add one obstacle at `position`, stored in its cell only
    pub fn insert(&mut self, entity: Entity, position: DVec2) {
        self.insert_with_reach(entity, position, 0.0);
    }

    /// Add one obstacle to every cell within `reach` of `position` on
    /// each axis
    pub fn insert_with_reach(&mut self, entity: Entity, position: DVec2, reach: f64) {
        let reach = if reach.is_finite() { reach.max(0.0) } else { f64::INFINITY };
        let cols = covered_cells(position.x, reach, self.extent.x, self.cell_size, self.cols);
        let rows = covered_cells(position.y, reach, self.extent.y, self.cell_size, self.rows);
        for &cy in &rows {
            for &cx in &cols {
                let bucket = &mut self.buckets[cy * self.cols + cx];
                bucket.push(entity);
                if bucket.len() > self.max_bucket && !self.saturated {
                    log::debug!(
                        "grid cell ({cx}, {cy}) holds {} obstacles, falling back to full scans",
                        bucket.len()
                    );
                    self.saturated = true;
                }
            }
        }
        self.all.push(entity);
    }

    /// Re-index every wall that has a transform and is not destroyed
    pub fn rebuild(&mut self, storage: &Storage) {
        self.clear();
        let widest = storage
            .bodies
            .iter()
            .map(|(_, body)| body.collider_radius())
            .fold(0.0, f64::max);
        for (entity, wall) in storage.walls.iter() {
            if wall.is_destroyed() {
                continue;
            }
            let Some(transform) = storage.transforms.get(entity) else {
                log::trace!("wall {entity} has no transform, not indexed");
                continue;
            };
            self.insert_with_reach(entity, transform.position, wall.half_size() + widest);
        }
    }

    /// Collect obstacles near `position` into `out`
    ///
    /// `out` is cleared first. Each cell is visited at most once even when
    /// the grid is narrower than three cells, and an obstacle spanning
    /// several visited cells is listed once.
    pub fn query_into(&self, position: DVec2, out: &mut Vec<Entity>) {
        out.clear();
        if self.saturated {
            out.extend_from_slice(&self.all);
            return;
        }
        let (cx, cy) = self.cell_of(position);
        let mut visited = [usize::MAX; 9];
        let mut n = 0;
        for dy in [-1i64, 0, 1] {
            for dx in [-1i64, 0, 1] {
                let x = (cx as i64 + dx).rem_euclid(self.cols as i64) as usize;
                let y = (cy as i64 + dy).rem_euclid(self.rows as i64) as usize;
                let index = y * self.cols + x;
                if visited[..n].contains(&index) {
                    continue;
                }
                visited[n] = index;
                n += 1;
                for &entity in &self.buckets[index] {
                    if !out.contains(&entity) {
                        out.push(entity);
                    }
                }
            }
        }
    }

    /// Convenience wrapper around [`SpatialGrid::query_into`]
    pub fn query(&self, position: DVec2) -> Vec<Entity> {
        let mut out = Vec::new();
        self.query_into(position, &mut out);
        out
    }
}

/// Cell indices along one axis overlapped by `[center - reach, center + reach]`
/// on a wrapped axis of length `extent`
fn covered_cells(center: f64, reach: f64, extent: f64, cell_size: f64, count: usize) -> Vec<usize> {
    let span = 2.0 * reach;
    if !center.is_finite() || span >= extent {
        return (0..count).collect();
    }
    let start = (center - reach).rem_euclid(extent);
    let end = start + span;
    let first = axis_cell(start, cell_size, count);
    if end < extent {
        return (first..=axis_cell(end, cell_size, count)).collect();
    }
    let last = axis_cell(end - extent, cell_size, count);
    (first..count).chain((0..=last).filter(|&c| c < first)).collect()
}

fn axis_cell(value: f64, cell_size: f64, count: usize) -> usize {
    ((value / cell_size).floor().max(0.0) as usize).min(count - 1)
}

fn wrap_index(cell: f64, count: usize) -> usize {
    if !cell.is_finite() {
        return 0;
    }
    (cell as i64).rem_euclid(count as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(&Domain::new(1280.0, 720.0), &GridConfig::default())
    }

    #[test]
    fn test_dimensions_cover_domain() {
        assert_eq!(grid().dimensions(), (13, 8));
    }

    #[test]
    fn test_query_finds_neighbors_only() {
        let mut grid = grid();
        grid.insert(Entity::new(1), DVec2::new(150.0, 150.0));
        grid.insert(Entity::new(2), DVec2::new(650.0, 350.0));

        assert_eq!(grid.query(DVec2::new(210.0, 210.0)), vec![Entity::new(1)]);
        assert!(grid.query(DVec2::new(1000.0, 600.0)).is_empty());
    }

    #[test]
    fn test_query_wraps_across_edges() {
        let mut grid = grid();
        grid.insert(Entity::new(7), DVec2::new(1275.0, 715.0));
        assert_eq!(grid.query(DVec2::new(5.0, 5.0)), vec![Entity::new(7)]);
    }

    #[test]
    fn test_narrow_grid_visits_cells_once() {
        let domain = Domain::new(200.0, 100.0);
        let mut grid = SpatialGrid::new(&domain, &GridConfig::default());
        assert_eq!(grid.dimensions(), (2, 1));
        grid.insert(Entity::new(3), DVec2::new(50.0, 50.0));
        assert_eq!(grid.query(DVec2::new(150.0, 50.0)), vec![Entity::new(3)]);
    }

    #[test]
    fn test_wide_wall_found_from_far_cell() {
        let mut grid = grid();
        grid.insert_with_reach(Entity::new(4), DVec2::new(650.0, 360.0), 155.0);
        assert_eq!(grid.query(DVec2::new(498.0, 360.0)), vec![Entity::new(4)]);
        assert_eq!(grid.query(DVec2::new(802.0, 510.0)), vec![Entity::new(4)]);
        assert!(grid.query(DVec2::new(1000.0, 360.0)).is_empty());
    }

    #[test]
    fn test_reach_wraps_through_short_seam_column() {
        let mut grid = grid();
        // The last column spans only 1200..1280.
        grid.insert_with_reach(Entity::new(5), DVec2::new(1190.0, 50.0), 100.0);
        assert_eq!(grid.query(DVec2::new(5.0, 50.0)), vec![Entity::new(5)]);
        assert!(grid.query(DVec2::new(350.0, 50.0)).is_empty());
    }

    #[test]
    fn test_covered_cells_span_whole_axis() {
        assert_eq!(covered_cells(640.0, 700.0, 1280.0, 100.0, 13).len(), 13);
        assert_eq!(covered_cells(f64::NAN, 1.0, 1280.0, 100.0, 13).len(), 13);
        assert_eq!(covered_cells(50.0, 0.0, 1280.0, 100.0, 13), vec![0]);
        assert_eq!(covered_cells(10.0, 20.0, 1280.0, 100.0, 13), vec![12, 0]);
    }

    #[test]
    fn test_saturation_falls_back_to_all() {
        let config = GridConfig {
            cell_size: 100.0,
            max_bucket: 2,
        };
        let mut grid = SpatialGrid::new(&Domain::new(1280.0, 720.0), &config);
        for i in 0..3 {
            grid.insert(Entity::new(i), DVec2::new(10.0, 10.0));
        }
        grid.insert(Entity::new(9), DVec2::new(900.0, 500.0));
        assert!(grid.is_saturated());
        assert_eq!(grid.query(DVec2::new(10.0, 10.0)).len(), 4);

        grid.clear();
        assert!(!grid.is_saturated());
        assert!(grid.is_empty());
    }
}
