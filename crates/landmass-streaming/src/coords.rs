//! Chunk-grid addressing and world-space chunk bounds.

use glam::DVec2;

/// Identifies a chunk's position on the 2D chunk grid.
///
/// Chunk `(x, y)` is centered on world point `(x * size, y * size)`, where
/// `size` is the world width of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i64,
    /// Chunk-grid Y coordinate.
    pub y: i64,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The chunk whose center is nearest to `position`.
    pub fn containing(position: DVec2, chunk_size: f64) -> Self {
        let cell = (position / chunk_size).round();
        Self::new(cell.x as i64, cell.y as i64)
    }

    /// Returns the coordinate offset by `(dx, dy)`.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// World-space center of the chunk.
    pub fn origin(self, chunk_size: f64) -> DVec2 {
        DVec2::new(self.x as f64 * chunk_size, self.y as f64 * chunk_size)
    }

    /// Chebyshev (chessboard) distance in chunks.
    pub fn chebyshev_distance(self, other: Self) -> u64 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Axis-aligned world-space square covered by a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl ChunkBounds {
    pub fn new(coord: ChunkCoord, chunk_size: f64) -> Self {
        let center = coord.origin(chunk_size);
        let half = DVec2::splat(chunk_size * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Distance from `point` to the nearest point of the square; zero inside.
    pub fn distance_to(&self, point: DVec2) -> f64 {
        let nearest = point.clamp(self.min, self.max);
        point.distance(nearest)
    }
}
