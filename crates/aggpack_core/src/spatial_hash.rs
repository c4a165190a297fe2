use glam::DVec3;
use std::collections::HashMap;

#[derive(Clone, Debug)]
/// Spatial indexing structure for proximity queries on body positions.
///
/// Implements an unbounded uniform grid: each occupied cell maps to the
/// indices of the points inside it. Used as the broad phase of contact
/// resolution, where the world has no fixed extent.
///
/// # Performance Characteristics
/// - Construction: O(point_count)
/// - Range query: O(points in the visited cells)
///
/// # Implementation Notes
/// - Cells are keyed by floored integer coordinates
/// - Non-finite positions are dropped at build time
/// - Queries visit every cell overlapped by the query's bounding cube
///
/// # Examples
/// ```
/// use aggpack_core::spatial_hash::SpatialHash;
/// use glam::DVec3;
///
/// let mut spatial = SpatialHash::new(4.0);
/// spatial.build(&[DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0), DVec3::splat(50.0)]);
///
/// let mut nearby = Vec::new();
/// spatial.query_into(DVec3::ZERO, 2.0, &mut nearby);
/// assert_eq!(nearby.len(), 2);
/// ```
pub struct SpatialHash {
    pub cell_size: f64,
    cells: HashMap<(i32, i32, i32), Vec<usize>>,
    positions: Vec<DVec3>,
}

impl SpatialHash {
    /// Creates an empty spatial hash with cubic cells of edge `cell_size`.
    ///
    /// Non-positive sizes fall back to 1.0.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 && cell_size.is_finite() {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            positions: Vec::new(),
        }
    }

    /// Computes the cell key for a world coordinate, or `None` when the
    /// coordinate is non-finite or would overflow the i32 key.
    #[inline]
    pub fn cell_of(&self, p: DVec3) -> Option<(i32, i32, i32)> {
        if !p.is_finite() {
            return None;
        }
        let c = (p / self.cell_size).floor();
        let limit = i32::MAX as f64;
        if c.abs().max_element() >= limit {
            return None;
        }
        Some((c.x as i32, c.y as i32, c.z as i32))
    }

    /// Rebuilds the index from `positions`; indices refer into that slice.
    pub fn build(&mut self, positions: &[DVec3]) {
        self.cells.clear();
        self.positions.clear();
        self.positions.extend_from_slice(positions);
        for (idx, p) in positions.iter().enumerate() {
            if let Some(key) = self.cell_of(*p) {
                self.cells.entry(key).or_default().push(idx);
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Calls `callback` with the index of every point within `radius` of
    /// `center`.
    pub fn query_callback<F>(&self, center: DVec3, radius: f64, mut callback: F)
    where
        F: FnMut(usize),
    {
        let (Some(lo), Some(hi)) = (
            self.cell_of(center - DVec3::splat(radius)),
            self.cell_of(center + DVec3::splat(radius)),
        ) else {
            return;
        };
        let radius_sq = radius * radius;
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                for z in lo.2..=hi.2 {
                    if let Some(indices) = self.cells.get(&(x, y, z)) {
                        for &idx in indices {
                            if self.positions[idx].distance_squared(center) <= radius_sq {
                                callback(idx);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Collects the indices within `radius` of `center` into `result`,
    /// which is cleared first.
    pub fn query_into(&self, center: DVec3, radius: f64, result: &mut Vec<usize>) {
        result.clear();
        self.query_callback(center, radius, |idx| result.push(idx));
    }
}
