//! Square falloff mask for island-style shaping.
//!
//! The mask is 0 at the center of the grid and rises to 1 on the outer ring.
//! Subtracting it from a height map pulls the edges down to sea level.

/// Shaping constants of the falloff curve `v^a / (v^a + (b - b*v)^a)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FalloffShape {
    /// Exponent `a`; larger values give a flatter plateau and steeper coast.
    pub steepness: f64,
    /// Shift `b`; larger values push the coast outward.
    pub shift: f64,
}

impl Default for FalloffShape {
    fn default() -> Self {
        Self {
            steepness: 3.0,
            shift: 2.2,
        }
    }
}

/// Errors building a falloff mask.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FalloffError {
    /// A mask needs at least one cell.
    #[error("falloff mask size must be >= 1")]
    EmptyMask,
    /// Non-positive constants would allow a zero denominator.
    #[error("falloff steepness and shift must be positive, got {steepness} and {shift}")]
    InvalidShape {
        /// Offending exponent.
        steepness: f64,
        /// Offending shift.
        shift: f64,
    },
}

/// A precomputed square falloff grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FalloffMask {
    size: usize,
    values: Vec<f32>,
}

impl FalloffMask {
    /// Compute a `size`×`size` mask.
    pub fn generate(size: usize, shape: FalloffShape) -> Result<Self, FalloffError> {
        if size == 0 {
            return Err(FalloffError::EmptyMask);
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(shape.steepness) || !valid(shape.shift) {
            return Err(FalloffError::InvalidShape {
                steepness: shape.steepness,
                shift: shape.shift,
            });
        }

        let axis = |i: usize| -> f64 {
            if size == 1 {
                0.0
            } else {
                i as f64 / (size - 1) as f64 * 2.0 - 1.0
            }
        };

        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let v = axis(x).abs().max(axis(y).abs());
                values.push(evaluate(v, shape) as f32);
            }
        }

        Ok(Self { size, values })
    }

    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Mask value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` is out of range.
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.size && y < self.size, "({x}, {y}) outside mask");
        self.values[y * self.size + x]
    }

    /// Row-major mask values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Subtract the mask from `heights` (same layout) and clamp to `[0, 1]`.
    pub fn apply(&self, heights: &mut [f32]) {
        debug_assert_eq!(heights.len(), self.values.len());
        for (h, f) in heights.iter_mut().zip(&self.values) {
            *h = (*h - f).clamp(0.0, 1.0);
        }
    }
}

/// The falloff curve for a normalized distance `v` in `[0, 1]`.
fn evaluate(v: f64, shape: FalloffShape) -> f64 {
    let near = libm::pow(v, shape.steepness);
    let far = libm::pow(shape.shift - shape.shift * v, shape.steepness);
    // `shift > 0` keeps `far` positive whenever `near` is zero.
    (near / (near + far)).clamp(0.0, 1.0)
}
