//! In-process image composition and trimming.

use crate::http;
use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tessera_error::{ConfigError, TesseraResult, UpstreamError};
use tessera_interface::{ComposeParams, ImageBackend};

const SERVICE: &str = "compositor";

/// Long edge of a composed canvas in pixels.
pub const CANVAS_LONG_EDGE: u32 = 1536;

/// Gap kept around each image inside its grid cell, in pixels.
const CELL_MARGIN: u32 = 24;

/// Composes and trims images locally with the `image` crate.
///
/// `compose` lays the sources out on a transparent canvas of the requested
/// aspect ratio: one image is fitted and centered, several are placed on a
/// near-square grid in input order. `trim` crops to the bounding box of the
/// non-transparent pixels. Output is always PNG.
#[derive(Debug, Clone, Copy)]
pub struct LocalCompositor {
    long_edge: u32,
}

impl Default for LocalCompositor {
    fn default() -> Self {
        Self {
            long_edge: CANVAS_LONG_EDGE,
        }
    }
}

impl LocalCompositor {
    /// Compositor producing canvases with the default long edge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different canvas long edge.
    pub fn with_long_edge(mut self, long_edge: u32) -> Self {
        self.long_edge = long_edge.max(1);
        self
    }

    /// Canvas size for an aspect ratio such as "16:9".
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` unless the ratio is two positive integers
    /// separated by a colon.
    pub fn canvas_size(&self, aspect_ratio: &str) -> Result<(u32, u32), ConfigError> {
        let invalid = || ConfigError::new(format!("Invalid aspect ratio '{}'", aspect_ratio));
        let (w, h) = aspect_ratio.split_once(':').ok_or_else(invalid)?;
        let w: u32 = w.trim().parse().map_err(|_| invalid())?;
        let h: u32 = h.trim().parse().map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }
        let long = self.long_edge as f64;
        let size = if w >= h {
            (self.long_edge, (long * h as f64 / w as f64).round().max(1.0) as u32)
        } else {
            ((long * w as f64 / h as f64).round().max(1.0) as u32, self.long_edge)
        };
        Ok(size)
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, UpstreamError> {
    image::load_from_memory(bytes)
        .map_err(|e| http::invalid(SERVICE, format!("Cannot decode image: {}", e)))
}

fn encode_png(image: RgbaImage) -> Result<Vec<u8>, UpstreamError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| http::invalid(SERVICE, format!("Cannot encode PNG: {}", e)))?;
    Ok(bytes)
}

/// Bounding box `(x, y, width, height)` of pixels with non-zero alpha.
fn opaque_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        });
    }
    bounds.map(|(left, top, right, bottom)| (left, top, right - left + 1, bottom - top + 1))
}

fn trim_png(bytes: &[u8]) -> Result<Vec<u8>, UpstreamError> {
    let image = decode(bytes)?.to_rgba8();
    match opaque_bounds(&image) {
        Some((x, y, w, h)) => encode_png(imageops::crop_imm(&image, x, y, w, h).to_image()),
        // fully transparent: nothing to keep, leave the input alone
        None => Ok(bytes.to_vec()),
    }
}

/// Columns and rows of a near-square grid holding `count` cells.
fn grid(count: usize) -> (u32, u32) {
    let cols = (count as f64).sqrt().ceil().max(1.0) as u32;
    let rows = (count as u32).div_ceil(cols);
    (cols, rows)
}

fn compose_png(sources: &[Vec<u8>], width: u32, height: u32) -> Result<Vec<u8>, UpstreamError> {
    let (cols, rows) = grid(sources.len());
    let cell_w = width / cols;
    let cell_h = height / rows;
    let fit_w = cell_w.saturating_sub(2 * CELL_MARGIN).max(1);
    let fit_h = cell_h.saturating_sub(2 * CELL_MARGIN).max(1);

    let mut canvas = RgbaImage::new(width, height);
    for (i, bytes) in sources.iter().enumerate() {
        let fitted = decode(bytes)?.resize(fit_w, fit_h, FilterType::Triangle).to_rgba8();
        let col = i as u32 % cols;
        let row = i as u32 / cols;
        let x = col * cell_w + cell_w.saturating_sub(fitted.width()) / 2;
        let y = row * cell_h + cell_h.saturating_sub(fitted.height()) / 2;
        imageops::overlay(&mut canvas, &fitted, i64::from(x), i64::from(y));
    }
    encode_png(canvas)
}

#[async_trait]
impl ImageBackend for LocalCompositor {
    #[tracing::instrument(skip(self, images, params), fields(images = images.len(), aspect_ratio = %params.aspect_ratio()))]
    async fn compose(&self, images: &[Vec<u8>], params: &ComposeParams) -> TesseraResult<Vec<u8>> {
        if images.is_empty() {
            return Err(ConfigError::new("Nothing to compose: no source images").into());
        }
        let (width, height) = self.canvas_size(params.aspect_ratio())?;
        if params.is_people_mode() || params.instruction().is_some() {
            tracing::debug!("Local compositor ignores people mode and instructions");
        }

        let sources = images.to_vec();
        let composed = tokio::task::spawn_blocking(move || compose_png(&sources, width, height))
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Compose task failed: {}", e)))??;
        tracing::debug!(width, height, bytes = composed.len(), "Composed image");
        Ok(composed)
    }

    #[tracing::instrument(skip(self, image), fields(bytes = image.len()))]
    async fn trim(&self, image: &[u8]) -> TesseraResult<Vec<u8>> {
        let source = image.to_vec();
        let trimmed = tokio::task::spawn_blocking(move || trim_png(&source))
            .await
            .map_err(|e| http::invalid(SERVICE, format!("Trim task failed: {}", e)))??;
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_is_near_square() {
        assert_eq!(grid(1), (1, 1));
        assert_eq!(grid(2), (2, 1));
        assert_eq!(grid(3), (2, 2));
        assert_eq!(grid(5), (3, 2));
        assert_eq!(grid(8), (3, 3));
    }

    #[test]
    fn test_opaque_bounds_of_transparent_image_is_none() {
        assert_eq!(opaque_bounds(&RgbaImage::new(4, 4)), None);
    }
}
