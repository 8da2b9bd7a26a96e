//! CPU-side RGBA textures for chunk previews and materialization.

use crate::classifier::{Color, ColorMap};
use crate::heightmap::HeightMap;

/// A 2D texture stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    /// Texture width in pixels.
    pub width: u32,
    /// Texture height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Create a transparent black texture.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Grayscale rendering of the real cells of a height map, black at 0 and
    /// white at 1.
    pub fn from_height_map(map: &HeightMap) -> Self {
        let resolution = map.resolution() as u32;
        let mut texture = Self::new(resolution, resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                let h = map.core(x as usize, y as usize);
                texture.set_pixel(x, y, Color::BLACK.lerp(Color::WHITE, h));
            }
        }
        texture
    }

    pub fn from_color_map(map: &ColorMap) -> Self {
        let resolution = map.resolution() as u32;
        let mut texture = Self::new(resolution, resolution);
        for (dst, color) in texture.pixels.chunks_exact_mut(4).zip(map.colors()) {
            dst.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        texture
    }

    /// Set a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Get a single pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        let idx = ((y * self.width + x) * 4) as usize;
        Color {
            r: self.pixels[idx],
            g: self.pixels[idx + 1],
            b: self.pixels[idx + 2],
            a: self.pixels[idx + 3],
        }
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Count the number of unique colors (ignoring alpha) in the texture.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = std::collections::HashSet::new();
        for chunk in self.pixels.chunks_exact(4) {
            colors.insert((chunk[0], chunk[1], chunk[2]));
        }
        colors.len()
    }
}
