//! Immutable generation settings shared by the update thread and workers.

use std::sync::Arc;

use glam::DVec2;
use landmass_config::{Config, ConfigError, NormalizationMode};
use landmass_lod::{LodError, LodLevel, LodSelector, LodTable};
use landmass_mesh::{CurveError, HeightCurve, MeshError, TerrainMeshBuilder, check_lod};
use landmass_terrain::{
    ClassifierError, Color, FalloffError, FalloffMask, FalloffShape, HeightMapBuilder,
    HeightMapError, NoiseParams, Normalization, TerrainClassifier, TerrainType,
};

/// Errors turning a [`Config`] into [`GeneratorSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("height map setup failed: {0}")]
    HeightMap(#[from] HeightMapError),
    #[error("falloff setup failed: {0}")]
    Falloff(#[from] FalloffError),
    #[error("region table rejected: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("height curve rejected: {0}")]
    Curve(#[from] CurveError),
    #[error("LOD table rejected: {0}")]
    Lod(#[from] LodError),
    #[error("LOD level cannot be meshed: {0}")]
    Mesh(#[from] MeshError),
    #[error(
        "streaming.unload_radius {unload_radius} must exceed the view window radius {view_radius}"
    )]
    UnloadRadius { unload_radius: u32, view_radius: i64 },
}

/// Worker count used when the config leaves it unset.
pub fn default_worker_count() -> usize {
    num_cpus::get().saturating_sub(2).max(1)
}

/// Everything a generation job needs, built once per configuration.
///
/// Jobs hold an `Arc<GeneratorSettings>` so a configuration change never
/// mutates settings a worker is reading.
#[derive(Debug)]
pub struct GeneratorSettings {
    pub heights: HeightMapBuilder,
    pub classifier: TerrainClassifier,
    pub mesher: TerrainMeshBuilder,
    pub lod: LodSelector,
    /// Chunks whose nearest edge is within this distance are shown.
    pub max_view_distance: f64,
    /// `0` runs jobs inline on the submitting thread.
    pub worker_threads: usize,
    /// Idle chunks further than this many chunks from the viewer are evicted.
    pub unload_radius: Option<u32>,
}

impl GeneratorSettings {
    /// Sanitize and validate `config`, then build every generation stage.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, SettingsError> {
        let config = config.sanitized();
        config.validate()?;

        let resolution = config.mesh.chunk_resolution as usize;
        let noise = NoiseParams {
            seed: config.noise.seed,
            scale: config.noise.scale,
            octaves: config.noise.octaves as u32,
            persistence: config.noise.persistence,
            lacunarity: config.noise.lacunarity,
            offset: DVec2::from_array(config.noise.offset),
        };
        let normalization = match config.noise.normalization {
            NormalizationMode::Local => Normalization::Local,
            NormalizationMode::Global => Normalization::Global,
        };
        let falloff = if config.falloff.enabled {
            let shape = FalloffShape {
                steepness: config.falloff.steepness,
                shift: config.falloff.shift,
            };
            Some(Arc::new(FalloffMask::generate(resolution + 2, shape)?))
        } else {
            None
        };
        let heights = HeightMapBuilder::new(noise, resolution, normalization, falloff)?;

        let classifier = TerrainClassifier::new(
            config
                .regions
                .iter()
                .map(|region| {
                    let [r, g, b] = region.color;
                    TerrainType::new(region.name.clone(), region.height, Color::rgb(r, g, b))
                })
                .collect(),
        )?;

        let curve = HeightCurve::new(config.mesh.height_curve.clone())?;
        let mesher = TerrainMeshBuilder::new(
            config.mesh.height_multiplier,
            curve,
            config.mesh.flat_shaded,
        );

        let table = LodTable::new(
            config
                .streaming
                .lod_levels
                .iter()
                .map(|level| LodLevel::new(level.lod, level.max_distance))
                .collect(),
        )?;
        for lod in table.lods() {
            check_lod(resolution, lod)?;
        }

        let settings = Self {
            heights,
            classifier,
            mesher,
            lod: LodSelector::new(table),
            max_view_distance: config.streaming.max_view_distance,
            worker_threads: config
                .streaming
                .worker_threads
                .unwrap_or_else(default_worker_count),
            unload_radius: config.streaming.unload_radius,
        };

        if let Some(unload_radius) = settings.unload_radius
            && i64::from(unload_radius) <= settings.view_radius()
        {
            return Err(SettingsError::UnloadRadius {
                unload_radius,
                view_radius: settings.view_radius(),
            });
        }

        Ok(Arc::new(settings))
    }

    /// World width of one chunk.
    pub fn chunk_size(&self) -> f64 {
        self.heights.chunk_size()
    }

    /// Samples per chunk side.
    pub fn resolution(&self) -> usize {
        self.heights.resolution()
    }

    /// Half-width, in chunks, of the square window scanned around the viewer.
    pub fn view_radius(&self) -> i64 {
        (self.max_view_distance / self.chunk_size()).ceil() as i64
    }
}
