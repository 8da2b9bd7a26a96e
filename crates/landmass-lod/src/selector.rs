//! Distance-based LOD selection from a configurable distance table.

/// One row of the LOD table: chunks up to `max_distance` away use `lod`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodLevel {
    /// LOD index handed to the mesher (0 = full detail).
    pub lod: u32,
    /// Inclusive upper distance bound, in world units.
    pub max_distance: f64,
}

impl LodLevel {
    pub fn new(lod: u32, max_distance: f64) -> Self {
        Self { lod, max_distance }
    }
}

/// Errors building a [`LodTable`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LodError {
    #[error("LOD table must have at least one level")]
    Empty,
    #[error("LOD level {index} distance {distance} must be positive and finite")]
    InvalidDistance { index: usize, distance: f64 },
    #[error("LOD level {index} distance {distance} must exceed the previous level's {previous}")]
    NotIncreasing {
        index: usize,
        distance: f64,
        previous: f64,
    },
}

/// Ordered LOD levels with strictly increasing distance bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    levels: Vec<LodLevel>,
}

impl LodTable {
    /// Validate and wrap a list of levels.
    pub fn new(levels: Vec<LodLevel>) -> Result<Self, LodError> {
        if levels.is_empty() {
            return Err(LodError::Empty);
        }
        for (index, level) in levels.iter().enumerate() {
            let distance = level.max_distance;
            if !distance.is_finite() || distance <= 0.0 {
                return Err(LodError::InvalidDistance { index, distance });
            }
            if index > 0 && distance <= levels[index - 1].max_distance {
                return Err(LodError::NotIncreasing {
                    index,
                    distance,
                    previous: levels[index - 1].max_distance,
                });
            }
        }
        Ok(Self { levels })
    }

    /// Return a reference to the levels, nearest first.
    pub fn levels(&self) -> &[LodLevel] {
        &self.levels
    }

    /// Distance bound of the last level.
    pub fn max_distance(&self) -> f64 {
        self.levels[self.levels.len() - 1].max_distance
    }

    /// Every distinct LOD the table can select.
    pub fn lods(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.iter().map(|level| level.lod)
    }
}

/// Selects LOD levels based on distance from the viewer.
#[derive(Clone, Debug)]
pub struct LodSelector {
    table: LodTable,
}

impl LodSelector {
    /// Create a new LOD selector over the given table.
    pub fn new(table: LodTable) -> Self {
        Self { table }
    }

    /// Index of the first level whose bound is `>= distance`. Distances past
    /// the last bound select the last level.
    pub fn select_index(&self, distance: f64) -> usize {
        debug_assert!(distance >= 0.0, "distance must be non-negative");
        let levels = self.table.levels();
        levels
            .iter()
            .position(|level| distance <= level.max_distance)
            .unwrap_or(levels.len() - 1)
    }

    /// Determine the LOD for a chunk at the given distance from the viewer.
    pub fn select_lod(&self, distance: f64) -> u32 {
        self.table.levels()[self.select_index(distance)].lod
    }

    /// Access the underlying table.
    pub fn table(&self) -> &LodTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_selector() -> LodSelector {
        LodSelector::new(
            LodTable::new(vec![
                LodLevel::new(0, 150.0),
                LodLevel::new(1, 300.0),
                LodLevel::new(4, 450.0),
            ])
            .unwrap(),
        )
    }

    /// A chunk at distance 0 (the viewer is inside it) should return LOD 0.
    #[test]
    fn test_zero_distance_returns_lod_0() {
        let selector = default_selector();
        assert_eq!(selector.select_lod(0.0), 0);
    }

    /// Bounds are inclusive.
    #[test]
    fn test_threshold_boundary_behavior() {
        let selector = default_selector();
        assert_eq!(selector.select_lod(150.0), 0);
        assert_eq!(selector.select_lod(150.001), 1);
        assert_eq!(selector.select_lod(300.0), 1);
        assert_eq!(selector.select_lod(300.5), 4);
        assert_eq!(selector.select_lod(450.0), 4);
    }

    /// Distances beyond the table fall to the coarsest level.
    #[test]
    fn test_far_distance_returns_last_level() {
        let selector = default_selector();
        assert_eq!(selector.select_lod(10_000.0), 4);
        assert_eq!(selector.select_index(f64::MAX), 2);
    }

    /// LOD level should be monotonically non-decreasing with distance.
    #[test]
    fn test_monotonically_increasing_with_distance() {
        let selector = default_selector();
        let mut prev_lod = 0;
        for step in 0..100 {
            let d = step as f64 * 5.0;
            let lod = selector.select_lod(d);
            assert!(
                lod >= prev_lod,
                "LOD must not decrease with distance: d={d}, lod={lod}, prev={prev_lod}"
            );
            prev_lod = lod;
        }
    }

    #[test]
    fn test_table_max_distance_and_lods() {
        let selector = default_selector();
        assert_eq!(selector.table().max_distance(), 450.0);
        assert_eq!(selector.table().lods().collect::<Vec<_>>(), vec![0, 1, 4]);
    }

    #[test]
    fn test_invalid_tables_rejected() {
        assert_eq!(LodTable::new(Vec::new()), Err(LodError::Empty));
        assert_eq!(
            LodTable::new(vec![LodLevel::new(0, 0.0)]),
            Err(LodError::InvalidDistance {
                index: 0,
                distance: 0.0
            })
        );
        assert_eq!(
            LodTable::new(vec![LodLevel::new(0, 100.0), LodLevel::new(1, 100.0)]),
            Err(LodError::NotIncreasing {
                index: 1,
                distance: 100.0,
                previous: 100.0
            })
        );
    }
}
