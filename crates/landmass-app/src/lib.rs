//! Landmass application layer.
//!
//! Provides the directory layout, the headless streaming driver and the
//! single-chunk preview exporter used by the `landmass` binary.

pub mod headless;
pub mod platform;
pub mod preview;

use landmass_config::ConfigError;
use landmass_streaming::{SettingsError, StreamingError};

pub use headless::{HeadlessSink, PathKind, RunOptions, ViewerPath};
pub use platform::{AppDirs, PlatformError};
pub use preview::{Preview, PreviewError, PreviewMode};

/// Top-level failure reported by the binary before exiting with status 1.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("invalid terrain settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("streaming error: {0}")]
    Streaming(#[from] StreamingError),
    #[error("preview failed: {0}")]
    Preview(#[from] PreviewError),
}
