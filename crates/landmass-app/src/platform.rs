//! Directory layout for the Landmass binary.
//!
//! Config lives in the platform config directory (`<config_dir>/landmass`)
//! unless `--config` points elsewhere; logs and previews sit beside it.

use std::path::{Path, PathBuf};
use std::{fmt, io};

use landmass_config::default_config_dir;

/// Errors that can occur while preparing application directories.
#[derive(Debug)]
pub enum PlatformError {
    /// A directory could not be created.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to create {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Resolved directories for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds `landmass.log` in debug builds.
    pub log_dir: PathBuf,
    /// Default destination for preview images.
    pub preview_dir: PathBuf,
}

impl AppDirs {
    /// Resolve directories, honouring an explicit config directory.
    pub fn resolve(config_override: Option<&Path>) -> Self {
        let config_dir = config_override
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_dir);
        let preview_dir = dirs::picture_dir()
            .map(|dir| dir.join("landmass"))
            .unwrap_or_else(|| config_dir.join("previews"));
        Self {
            log_dir: config_dir.join("logs"),
            preview_dir,
            config_dir,
        }
    }

    /// Resolve every directory under `root`.
    pub fn resolve_with_root(root: &Path) -> Self {
        let config_dir = root.join("landmass");
        Self {
            log_dir: config_dir.join("logs"),
            preview_dir: config_dir.join("previews"),
            config_dir,
        }
    }

    /// Create the config and log directories on disk.
    ///
    /// The preview directory is created on demand when an image is written.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir).map_err(|source| PlatformError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Where a preview named `file_name` goes when no path is given.
    pub fn preview_path(&self, file_name: &str) -> PathBuf {
        self.preview_dir.join(file_name)
    }
}
