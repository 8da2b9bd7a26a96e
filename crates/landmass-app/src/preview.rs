//! Single-chunk previews rendered to PNG.
//!
//! Mirrors the three draw modes of the map generator: raw noise heights,
//! region colours, or a full mesh build (stats plus its colour texture).

use std::path::Path;

use glam::DVec2;
use landmass_mesh::{MeshData, MeshError};
use landmass_streaming::GeneratorSettings;
use landmass_terrain::TextureData;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("mesh build failed: {0}")]
    Mesh(#[from] MeshError),
    #[error("texture buffer does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
}

/// What a preview shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PreviewMode {
    /// Grayscale heights.
    Noise,
    /// Region colours.
    Colour,
    /// Mesh build plus colour texture.
    Mesh,
}

/// A rendered preview of the chunk at the world origin.
#[derive(Debug)]
pub struct Preview {
    pub mode: PreviewMode,
    pub texture: TextureData,
    /// Present in [`PreviewMode::Mesh`].
    pub mesh: Option<MeshData>,
}

/// Render the origin chunk with `settings`.
pub fn render_preview(
    settings: &GeneratorSettings,
    mode: PreviewMode,
    lod: u32,
) -> Result<Preview, PreviewError> {
    let map = settings.heights.build(DVec2::ZERO);
    let (min, max) = map.min_max();
    tracing::debug!(?mode, min, max, "preview heights built");

    let preview = match mode {
        PreviewMode::Noise => Preview {
            mode,
            texture: TextureData::from_height_map(&map),
            mesh: None,
        },
        PreviewMode::Colour => Preview {
            mode,
            texture: TextureData::from_color_map(&settings.classifier.color_map(&map)),
            mesh: None,
        },
        PreviewMode::Mesh => {
            let mesh = settings.mesher.build(&map, lod)?;
            tracing::info!(
                lod,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                flat_shaded = mesh.flat_shaded,
                "preview mesh built"
            );
            Preview {
                mode,
                texture: TextureData::from_color_map(&settings.classifier.color_map(&map)),
                mesh: Some(mesh),
            }
        }
    };
    Ok(preview)
}

/// Write `texture` to `path` as PNG, creating parent directories.
pub fn save_png(texture: &TextureData, path: &Path) -> Result<(), PreviewError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| PreviewError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let (width, height) = texture.dimensions();
    let image = image::RgbaImage::from_raw(width, height, texture.pixels.clone())
        .ok_or(PreviewError::BufferSize { width, height })?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    tracing::info!(path = %path.display(), width, height, "preview written");
    Ok(())
}
