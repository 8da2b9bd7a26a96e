//! Setup-time validation and parameter sanitation.
//!
//! Invalid combinations are caught here, before any generation work is
//! scheduled. Recoverable values (lacunarity below one, persistence outside the
//! unit interval) are clamped by [`Config::sanitized`]; everything else is
//! reported by [`Config::validate`] with the offending parameter named.

use crate::config::Config;
use crate::error::ConfigError;

/// Largest view radius, in chunks, a configuration may request.
///
/// The streaming window holds `(2 * radius + 1)^2` chunks.
pub const MAX_VIEW_RADIUS_CHUNKS: i64 = 64;

impl Config {
    /// Return a copy with recoverable parameters clamped into range.
    ///
    /// Each adjustment is logged at `warn` so a tweaked config file does not
    /// silently produce different terrain.
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();

        if config.noise.lacunarity < 1.0 || !config.noise.lacunarity.is_finite() {
            log::warn!(
                "noise.lacunarity {} clamped to 1.0",
                config.noise.lacunarity
            );
            config.noise.lacunarity = 1.0;
        }

        let persistence = config.noise.persistence;
        if !(0.0..=1.0).contains(&persistence) || persistence.is_nan() {
            let clamped = if persistence.is_nan() {
                0.5
            } else {
                persistence.clamp(0.0, 1.0)
            };
            log::warn!("noise.persistence {persistence} clamped to {clamped}");
            config.noise.persistence = clamped;
        }

        config
    }

    /// Check every parameter generation cannot recover from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.noise.octaves < 0 {
            return Err(ConfigError::invalid(
                "noise.octaves",
                format!("must be >= 0, got {}", self.noise.octaves),
            ));
        }
        if !self.noise.offset.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::invalid(
                "noise.offset",
                format!("must be finite, got {:?}", self.noise.offset),
            ));
        }

        if self.mesh.chunk_resolution < 2 {
            return Err(ConfigError::invalid(
                "mesh.chunk_resolution",
                format!("must be >= 2, got {}", self.mesh.chunk_resolution),
            ));
        }
        if !self.mesh.height_multiplier.is_finite() {
            return Err(ConfigError::invalid(
                "mesh.height_multiplier",
                "must be finite",
            ));
        }
        self.validate_height_curve()?;

        let view = self.streaming.max_view_distance;
        if !(view.is_finite() && view > 0.0) {
            return Err(ConfigError::invalid(
                "streaming.max_view_distance",
                format!("must be a positive finite distance, got {view}"),
            ));
        }
        let chunk_size = f64::from(self.mesh.chunk_resolution - 1);
        let radius = (view / chunk_size).ceil();
        if radius > MAX_VIEW_RADIUS_CHUNKS as f64 {
            return Err(ConfigError::invalid(
                "streaming.max_view_distance",
                format!(
                    "{view} spans {radius} chunks of {chunk_size}, at most \
                     {MAX_VIEW_RADIUS_CHUNKS} allowed"
                ),
            ));
        }
        self.validate_lod_levels()?;

        if self.falloff.steepness <= 0.0 || self.falloff.shift <= 0.0 {
            return Err(ConfigError::invalid(
                "falloff",
                format!(
                    "steepness and shift must be > 0, got {} and {}",
                    self.falloff.steepness, self.falloff.shift
                ),
            ));
        }

        self.validate_regions()
    }

    fn validate_height_curve(&self) -> Result<(), ConfigError> {
        let keys = &self.mesh.height_curve;
        if keys.is_empty() {
            return Err(ConfigError::invalid(
                "mesh.height_curve",
                "needs at least one keyframe",
            ));
        }
        for pair in keys.windows(2) {
            let ((t0, v0), (t1, v1)) = (pair[0], pair[1]);
            if t1 <= t0 {
                return Err(ConfigError::invalid(
                    "mesh.height_curve",
                    format!("keyframe inputs must strictly increase ({t0} then {t1})"),
                ));
            }
            if v1 < v0 {
                return Err(ConfigError::invalid(
                    "mesh.height_curve",
                    format!("curve must be monotonic ({v0} then {v1})"),
                ));
            }
        }
        Ok(())
    }

    fn validate_lod_levels(&self) -> Result<(), ConfigError> {
        let levels = &self.streaming.lod_levels;
        if levels.is_empty() {
            return Err(ConfigError::invalid(
                "streaming.lod_levels",
                "needs at least one level",
            ));
        }
        for pair in levels.windows(2) {
            if pair[1].max_distance <= pair[0].max_distance {
                return Err(ConfigError::invalid(
                    "streaming.lod_levels",
                    format!(
                        "distances must strictly increase ({} then {})",
                        pair[0].max_distance, pair[1].max_distance
                    ),
                ));
            }
        }
        Ok(())
    }

    fn validate_regions(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::invalid("regions", "needs at least one region"));
        }
        for pair in self.regions.windows(2) {
            if pair[1].height < pair[0].height {
                return Err(ConfigError::invalid(
                    "regions",
                    format!(
                        "thresholds must ascend: `{}` ({}) is below `{}` ({})",
                        pair[1].name, pair[1].height, pair[0].name, pair[0].height
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LodLevelConfig;

    fn invalid_parameter(result: Result<(), ConfigError>) -> &'static str {
        match result {
            Err(ConfigError::InvalidParameter { parameter, .. }) => parameter,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_negative_octaves_rejected() {
        let mut config = Config::default();
        config.noise.octaves = -1;
        assert_eq!(invalid_parameter(config.validate()), "noise.octaves");
    }

    #[test]
    fn test_non_positive_resolution_rejected() {
        for resolution in [0, -5, 1] {
            let mut config = Config::default();
            config.mesh.chunk_resolution = resolution;
            assert_eq!(
                invalid_parameter(config.validate()),
                "mesh.chunk_resolution",
                "resolution {resolution} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_view_distance_rejected() {
        let mut config = Config::default();
        config.streaming.max_view_distance = 0.0;
        assert_eq!(
            invalid_parameter(config.validate()),
            "streaming.max_view_distance"
        );
    }

    #[test]
    fn test_huge_view_distance_rejected() {
        for view in [1e6, f64::MAX / 2.0, f64::MAX] {
            let mut config = Config::default();
            config.streaming.max_view_distance = view;
            assert_eq!(
                invalid_parameter(config.validate()),
                "streaming.max_view_distance",
                "view distance {view} should be rejected"
            );
        }
    }

    #[test]
    fn test_view_radius_limit_is_in_chunks() {
        let mut config = Config::default();
        let chunk = f64::from(config.mesh.chunk_resolution - 1);
        config.streaming.max_view_distance = chunk * MAX_VIEW_RADIUS_CHUNKS as f64;
        assert!(config.validate().is_ok(), "the limit itself is allowed");

        config.streaming.max_view_distance += 1.0;
        assert_eq!(
            invalid_parameter(config.validate()),
            "streaming.max_view_distance"
        );

        // Same distance, larger chunks: fewer chunks, so accepted again.
        config.mesh.chunk_resolution = 481;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_descending_regions_rejected() {
        let mut config = Config::default();
        config.regions.swap(0, 3);
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("regions"), "message: {message}");
    }

    #[test]
    fn test_non_monotonic_curve_rejected() {
        let mut config = Config::default();
        config.mesh.height_curve = vec![(0.0, 0.5), (1.0, 0.2)];
        assert_eq!(invalid_parameter(config.validate()), "mesh.height_curve");
    }

    #[test]
    fn test_unordered_lod_levels_rejected() {
        let mut config = Config::default();
        config.streaming.lod_levels = vec![
            LodLevelConfig {
                lod: 0,
                max_distance: 300.0,
            },
            LodLevelConfig {
                lod: 1,
                max_distance: 100.0,
            },
        ];
        assert_eq!(invalid_parameter(config.validate()), "streaming.lod_levels");
    }

    #[test]
    fn test_sanitize_clamps_lacunarity_and_persistence() {
        let mut config = Config::default();
        config.noise.lacunarity = 0.25;
        config.noise.persistence = 1.7;

        let sanitized = config.sanitized();
        assert_eq!(sanitized.noise.lacunarity, 1.0);
        assert_eq!(sanitized.noise.persistence, 1.0);
        // Scale is handled at sample time, not here.
        assert_eq!(sanitized.noise.scale, config.noise.scale);
    }

    #[test]
    fn test_sanitize_leaves_valid_values() {
        let config = Config::default();
        assert_eq!(config.sanitized(), config);
    }
}
