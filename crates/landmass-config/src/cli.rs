//! Command-line argument parsing for Landmass.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Landmass command-line overrides.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "landmass", about = "Landmass terrain generator")]
pub struct CliArgs {
    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Noise scale.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Number of noise octaves.
    #[arg(long, allow_negative_numbers = true)]
    pub octaves: Option<i32>,

    /// Maximum view distance in world units.
    #[arg(long)]
    pub view_distance: Option<f64>,

    /// Use flat shading.
    #[arg(long)]
    pub flat_shaded: Option<bool>,

    /// Enable the island falloff mask.
    #[arg(long)]
    pub falloff: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.noise.seed = seed;
        }
        if let Some(scale) = args.scale {
            self.noise.scale = scale;
        }
        if let Some(octaves) = args.octaves {
            self.noise.octaves = octaves;
        }
        if let Some(distance) = args.view_distance {
            self.streaming.max_view_distance = distance;
        }
        if let Some(flat) = args.flat_shaded {
            self.mesh.flat_shaded = flat;
        }
        if let Some(falloff) = args.falloff {
            self.falloff.enabled = falloff;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(1234),
            view_distance: Some(900.0),
            falloff: Some(true),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.noise.seed, 1234);
        assert_eq!(config.streaming.max_view_distance, 900.0);
        assert!(config.falloff.enabled);
        // Non-overridden fields retain defaults
        assert_eq!(config.noise.octaves, 4);
        assert!(!config.mesh.flat_shaded);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "landmass",
            "--seed",
            "42",
            "--octaves",
            "-2",
            "--flat-shaded",
            "true",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.octaves, Some(-2));
        assert_eq!(args.flat_shaded, Some(true));
    }
}
