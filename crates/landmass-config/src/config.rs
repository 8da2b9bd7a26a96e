//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level terrain generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fractal noise settings.
    pub noise: NoiseConfig,
    /// Height-to-mesh settings.
    pub mesh: MeshConfig,
    /// Chunk streaming settings.
    pub streaming: StreamingConfig,
    /// Island-style falloff shaping.
    pub falloff: FalloffConfig,
    /// Ordered terrain bands, lowest threshold first.
    pub regions: Vec<RegionConfig>,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How raw composite noise is mapped into `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum NormalizationMode {
    /// Rescale by the min/max found inside each chunk. Chunks will not line up.
    Local,
    /// Rescale by the theoretical amplitude range. Seam-free across chunks.
    #[default]
    Global,
}

/// Fractal noise configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// World seed.
    pub seed: u64,
    /// Sample-space divisor; larger values zoom in. Non-positive values are
    /// replaced by a small epsilon at sample time.
    pub scale: f64,
    /// Number of octaves. Negative values are rejected by validation.
    pub octaves: i32,
    /// Amplitude multiplier per octave, in `[0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier per octave, `>= 1`.
    pub lacunarity: f64,
    /// Global sample offset added to every octave.
    pub offset: [f64; 2],
    /// Normalization policy.
    pub normalization: NormalizationMode,
}

/// Mesh generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeshConfig {
    /// Vertices per chunk side at LOD 0, excluding the border ring.
    pub chunk_resolution: i32,
    /// Multiplier applied after the height curve.
    pub height_multiplier: f32,
    /// Height response curve keyframes `(input, output)`, inputs strictly increasing.
    pub height_curve: Vec<(f32, f32)>,
    /// Duplicate vertices per triangle for crisp faceted shading.
    pub flat_shaded: bool,
    /// LOD used by the single-chunk preview.
    pub preview_lod: u32,
}

/// One row of the LOD distance table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LodLevelConfig {
    /// LOD index (0 = full detail).
    pub lod: u32,
    /// The level applies while the viewer is closer than this distance.
    pub max_distance: f64,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chunks whose nearest edge is within this distance are shown.
    pub max_view_distance: f64,
    /// Distance-ordered LOD table.
    pub lod_levels: Vec<LodLevelConfig>,
    /// Generation worker threads. `None` picks a count from the CPU, `Some(0)`
    /// runs jobs inline on the update thread.
    pub worker_threads: Option<usize>,
    /// Evict idle chunks further than this many chunks from the viewer.
    /// `None` keeps every generated chunk for the session.
    pub unload_radius: Option<u32>,
}

/// Falloff mask configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FalloffConfig {
    /// Subtract the falloff mask from every height map.
    pub enabled: bool,
    /// Curve exponent `a`.
    pub steepness: f64,
    /// Curve shift `b`.
    pub shift: f64,
}

/// A terrain band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionConfig {
    /// Display name.
    pub name: String,
    /// Inclusive upper height bound.
    pub height: f32,
    /// RGB colour.
    pub color: [u8; 3],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for Config {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            mesh: MeshConfig::default(),
            streaming: StreamingConfig::default(),
            falloff: FalloffConfig::default(),
            regions: default_regions(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
            normalization: NormalizationMode::Global,
        }
    }
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            chunk_resolution: 241,
            height_multiplier: 30.0,
            height_curve: vec![(0.0, 0.0), (0.3, 0.0), (0.45, 0.1), (1.0, 1.0)],
            flat_shaded: false,
            preview_lod: 0,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_view_distance: 450.0,
            lod_levels: vec![
                LodLevelConfig {
                    lod: 0,
                    max_distance: 150.0,
                },
                LodLevelConfig {
                    lod: 1,
                    max_distance: 300.0,
                },
                LodLevelConfig {
                    lod: 4,
                    max_distance: 450.0,
                },
            ],
            worker_threads: None,
            unload_radius: None,
        }
    }
}

impl Default for FalloffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            steepness: 3.0,
            shift: 2.2,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn region(name: &str, height: f32, color: [u8; 3]) -> RegionConfig {
    RegionConfig {
        name: name.to_string(),
        height,
        color,
    }
}

fn default_regions() -> Vec<RegionConfig> {
    vec![
        region("deep_water", 0.3, [50, 99, 195]),
        region("shallow_water", 0.4, [54, 103, 199]),
        region("sand", 0.45, [210, 208, 125]),
        region("grass", 0.55, [86, 152, 23]),
        region("forest", 0.6, [62, 107, 18]),
        region("rock", 0.7, [90, 69, 60]),
        region("high_rock", 0.9, [75, 60, 53]),
        region("snow", 1.0, [255, 255, 255]),
    ]
}

/// Platform config directory for Landmass (`<config_dir>/landmass`).
///
/// Falls back to the working directory when the platform has no config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("landmass"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
