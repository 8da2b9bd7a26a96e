//! Piecewise-linear response curve applied to normalized heights before they
//! are scaled into world units.

/// Errors building a [`HeightCurve`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurveError {
    #[error("height curve needs at least one keyframe")]
    Empty,
    #[error("height curve keyframe {index} is not finite")]
    NonFinite { index: usize },
    #[error("height curve keyframe {index} input does not increase")]
    NotIncreasing { index: usize },
}

/// Keyframes `(input, output)` with strictly increasing inputs.
///
/// Inputs below the first keyframe evaluate to the first output and inputs
/// above the last evaluate to the last output.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
}

impl HeightCurve {
    pub fn new(keys: Vec<(f32, f32)>) -> Result<Self, CurveError> {
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }
        for (index, &(input, output)) in keys.iter().enumerate() {
            if !input.is_finite() || !output.is_finite() {
                return Err(CurveError::NonFinite { index });
            }
            if index > 0 && input <= keys[index - 1].0 {
                return Err(CurveError::NotIncreasing { index });
            }
        }
        Ok(Self { keys })
    }

    /// The identity mapping on `[0, 1]`.
    pub fn linear() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (1.0, 1.0)],
        }
    }

    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first_in, first_out) = self.keys[0];
        if t <= first_in || t.is_nan() {
            return first_out;
        }
        let upper = self.keys.partition_point(|&(input, _)| input < t);
        if upper >= self.keys.len() {
            return self.keys[self.keys.len() - 1].1;
        }
        let (x0, y0) = self.keys[upper - 1];
        let (x1, y1) = self.keys[upper];
        if t == x1 {
            return y1;
        }
        let f = (t - x0) / (x1 - x0);
        y0 + (y1 - y0) * f
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}
