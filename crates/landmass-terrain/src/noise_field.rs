//! Multi-octave fractal noise sampler.
//!
//! Composites several octaves of Perlin gradient noise, each shifted by a
//! seed-derived offset, so the field is a pure function of the parameters and
//! the world-space sample point.

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use crate::seed::{octave_offsets, permutation_seed};

/// How raw composite values are mapped into `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Inverse-lerp by the min/max found in the sampled grid. Independently
    /// normalized chunks do not line up at their edges.
    Local,
    /// Rescale by the theoretical amplitude range. Identical inputs map to
    /// identical outputs in every chunk, so edges line up.
    #[default]
    Global,
}

/// Configuration for multi-octave noise.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Sample-space divisor. Values `<= 0` are replaced by [`NoiseParams::MIN_SCALE`].
    pub scale: f64,
    /// Number of octaves to composite.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Offset added to every sample point, in world units.
    pub offset: DVec2,
}

impl NoiseParams {
    /// Smallest scale used for sampling.
    pub const MIN_SCALE: f64 = 1e-4;

    /// The scale actually used for sampling.
    pub fn effective_scale(&self) -> f64 {
        if self.scale.is_finite() && self.scale > Self::MIN_SCALE {
            self.scale
        } else {
            Self::MIN_SCALE
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: DVec2::ZERO,
        }
    }
}

/// Deterministic fractal noise over the 2D world plane.
#[derive(Clone, Debug)]
pub struct NoiseField {
    perlin: Perlin,
    params: NoiseParams,
    offsets: Vec<DVec2>,
    scale: f64,
    max_amplitude: f64,
}

impl NoiseField {
    /// Create a field, deriving the per-octave offsets from the seed.
    pub fn new(params: NoiseParams) -> Self {
        let scale = params.effective_scale();
        if scale != params.scale {
            tracing::trace!(requested = params.scale, scale, "noise scale substituted");
        }
        let offsets = octave_offsets(params.seed, params.octaves, params.offset);

        let mut max_amplitude = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves {
            max_amplitude += amplitude;
            amplitude *= params.persistence;
        }

        Self {
            perlin: Perlin::new(permutation_seed(params.seed)),
            params,
            offsets,
            scale,
            max_amplitude,
        }
    }

    /// Raw composite value at a world-space point.
    ///
    /// Lies within `[-max_amplitude, max_amplitude]`.
    pub fn sample(&self, point: DVec2) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for offset in &self.offsets {
            let sample = (point + *offset) / self.scale * frequency;
            let value = self.perlin.get([sample.x, sample.y]).clamp(-1.0, 1.0);
            total += value * amplitude;

            amplitude *= self.params.persistence;
            frequency *= self.params.lacunarity;
        }

        total
    }

    /// Map a raw value into `[0, 1]` using the theoretical amplitude range.
    ///
    /// A field without octaves maps everything to the midpoint.
    pub fn normalize_global(&self, raw: f64) -> f64 {
        if self.max_amplitude <= 0.0 {
            return 0.5;
        }
        ((raw / self.max_amplitude + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Sum of all octave amplitudes (geometric series).
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    /// Per-octave sample offsets.
    pub fn octave_offsets(&self) -> &[DVec2] {
        &self.offsets
    }

    /// Return a reference to the parameters the field was built from.
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }
}
