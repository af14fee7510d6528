//! Raster engine backed by the `image` crate.
//!
//! # Design Decisions
//!
//! - **Shared pixels**: decoded images live behind an `Arc`, so handing a
//!   tile to the filter or the assembler never copies pixel data.
//!
//! - **Blocking work off the runtime**: decoding and encoding run on
//!   `spawn_blocking`; cropping and comparing stay on the caller's thread.
//!
//! - **Hash once**: a tile's perceptual hash is computed on first comparison
//!   and kept on the handle, so the greedy filter hashes each tile once.
//!
//! - **Quality control**: JPEG output quality is configurable on the engine,
//!   every other format uses its encoder defaults.

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use crate::error::{Result, SplitError};
use crate::geometry::{Size, TileRect};

use super::compare::{hash_distance, perceptual_hash, pixel_difference};
use super::format::Extension;
use super::{ImageSource, RasterEngine, Similarity};

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Image Handle
// =============================================================================

/// A decoded image, or a tile cropped from one.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: Arc<DynamicImage>,
    format: Option<ImageFormat>,
    hash: Arc<OnceLock<u64>>,
}

impl RasterImage {
    /// Wrap already decoded pixels.
    pub fn new(pixels: DynamicImage, format: Option<ImageFormat>) -> Self {
        Self {
            pixels: Arc::new(pixels),
            format,
            hash: Arc::new(OnceLock::new()),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    /// Format the source was decoded from, if it was detected.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn size(&self) -> Size {
        let (width, height) = self.pixels.dimensions();
        Size::new(width, height)
    }

    /// Perceptual hash, computed on first use and shared between clones.
    pub fn perceptual_hash(&self) -> u64 {
        *self.hash.get_or_init(|| perceptual_hash(&self.pixels))
    }

    #[cfg(test)]
    fn hash_is_cached(&self) -> bool {
        self.hash.get().is_some()
    }
}

// =============================================================================
// Engine
// =============================================================================

/// [`RasterEngine`] implementation using the `image` crate.
#[derive(Debug, Clone)]
pub struct ImageRasterEngine {
    jpeg_quality: u8,
}

impl Default for ImageRasterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageRasterEngine {
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG output quality. Values outside 1-100 are clamped.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
        self
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Decode encoded bytes, detecting the format from the content.
    pub fn decode(bytes: &[u8]) -> Result<RasterImage> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| SplitError::io_with("Error reading image", e))?;

        let format = reader.format();
        let pixels = reader
            .decode()
            .map_err(|e| SplitError::raster_with(format!("Error decoding image: {}", e), e))?;

        Ok(RasterImage::new(pixels, format))
    }

    /// Encode pixels as `extension`.
    pub fn encode_pixels(
        pixels: &DynamicImage,
        extension: Extension,
        jpeg_quality: u8,
    ) -> Result<Bytes> {
        let mut output = Vec::new();
        let encoded = match extension {
            Extension::Jpg | Extension::Jpeg => {
                // JPEG has no alpha channel
                let rgb = pixels.to_rgb8();
                let mut encoder = JpegEncoder::new_with_quality(&mut output, jpeg_quality);
                encoder.encode_image(&rgb)
            }
            Extension::Gif => DynamicImage::ImageRgba8(pixels.to_rgba8())
                .write_to(&mut Cursor::new(&mut output), ImageFormat::Gif),
            other => pixels.write_to(&mut Cursor::new(&mut output), other.image_format()),
        };

        encoded.map_err(|e| {
            SplitError::raster_with(format!("Error encoding image as {}: {}", extension, e), e)
        })?;

        Ok(Bytes::from(output))
    }
}

async fn read_source(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        Ok(false) => {
            return Err(SplitError::io(format!(
                "This image does not exists: {}",
                path.display()
            )))
        }
        Err(e) => {
            return Err(SplitError::io_with(
                format!("Cannot access image {}", path.display()),
                e,
            ))
        }
    }

    tokio::fs::read(path)
        .await
        .map_err(|e| SplitError::io_with(format!("Error reading image {}", path.display()), e))
}

fn join_error(e: tokio::task::JoinError) -> SplitError {
    SplitError::raster(format!("image task failed: {}", e))
}

#[async_trait]
impl RasterEngine for ImageRasterEngine {
    type Handle = RasterImage;

    async fn load(&self, source: &ImageSource) -> Result<(RasterImage, Size)> {
        let bytes = match source {
            ImageSource::Path(path) => Bytes::from(read_source(path).await?),
            ImageSource::Buffer(bytes) => bytes.clone(),
        };

        let image = tokio::task::spawn_blocking(move || ImageRasterEngine::decode(&bytes))
            .await
            .map_err(join_error)??;

        let size = image.size();
        if size.width == 0 || size.height == 0 {
            return Err(SplitError::raster(format!("Invalid dimensions {}", size)));
        }
        Ok((image, size))
    }

    fn crop(&self, image: &RasterImage, rect: TileRect) -> Result<RasterImage> {
        let size = image.size();
        if rect.covers(size) {
            return Ok(image.clone());
        }
        if rect.right() > size.width as u64 {
            return Err(SplitError::geometry(format!(
                "Can't have an image of {}x{}px from ({}, {}) because max x value is {}",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                size.width.saturating_sub(1)
            )));
        }
        if rect.bottom() > size.height as u64 {
            return Err(SplitError::geometry(format!(
                "Can't have an image of {}x{}px from ({}, {}) because max y value is {}",
                rect.width,
                rect.height,
                rect.x,
                rect.y,
                size.height.saturating_sub(1)
            )));
        }

        let pixels = image
            .pixels
            .crop_imm(rect.x, rect.y, rect.width, rect.height);
        Ok(RasterImage::new(pixels, image.format))
    }

    fn compare(&self, a: &RasterImage, b: &RasterImage) -> Result<Similarity> {
        // rejects empty images before they reach the hash
        let difference = pixel_difference(a.pixels(), b.pixels())?;
        let distance = hash_distance(a.perceptual_hash(), b.perceptual_hash());
        Ok(Similarity::new(distance, difference))
    }

    async fn encode(&self, image: &RasterImage, extension: Extension) -> Result<Bytes> {
        let pixels = Arc::clone(&image.pixels);
        let quality = self.jpeg_quality;
        tokio::task::spawn_blocking(move || {
            ImageRasterEngine::encode_pixels(&pixels, extension, quality)
        })
        .await
        .map_err(join_error)?
    }

    fn native_extension(&self, image: &RasterImage) -> Extension {
        image
            .format
            .map(Extension::from_image_format)
            .unwrap_or(Extension::Png)
    }
}

// =============================================================================
// Tests
// =============================================================================
