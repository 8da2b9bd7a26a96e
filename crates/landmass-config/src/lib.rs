//! Configuration system for Landmass terrain generation.
//!
//! Provides runtime-configurable generation settings that persist to disk as
//! RON files. Supports CLI overrides via clap, hot-reload detection, forward and
//! backward compatible serialization, and setup-time validation that names the
//! offending parameter.

mod cli;
mod config;
mod error;
mod validate;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, FalloffConfig, LodLevelConfig, MeshConfig, NoiseConfig,
    NormalizationMode, RegionConfig, StreamingConfig, default_config_dir,
};
pub use error::ConfigError;
pub use validate::MAX_VIEW_RADIUS_CHUNKS;
