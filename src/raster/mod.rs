//! Raster engine boundary.
//!
//! The splitter never touches pixels itself. Decoding, cropping, comparing
//! and encoding go through the [`RasterEngine`] trait so the bitmap library
//! can be swapped (or mocked in tests).
//!
//! # Components
//!
//! - [`RasterEngine`]: the trait the pipeline is generic over
//! - [`ImageRasterEngine`]: implementation backed by the `image` crate
//! - [`Extension`]: the encodings tiles can be written as
//! - [`Similarity`]: the pair of scores returned by `compare`
//! - [`perceptual_distance`] / [`pixel_difference`]: the scoring functions
//!   used by [`ImageRasterEngine`]

mod compare;
mod engine;
mod format;

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::geometry::{Size, TileRect};

pub use compare::{
    hash_distance, perceptual_distance, perceptual_hash, pixel_difference, PIXEL_THRESHOLD,
};
pub use engine::{
    ImageRasterEngine, RasterImage, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use format::Extension;

// =============================================================================
// Image Source
// =============================================================================

/// Where the source image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on disk. It has to exist.
    Path(PathBuf),
    /// Encoded image bytes already in memory.
    Buffer(Bytes),
}

impl ImageSource {
    /// Short human readable description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Buffer(bytes) => format!("<buffer of {} bytes>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        ImageSource::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::Path(PathBuf::from(path))
    }
}

impl From<Bytes> for ImageSource {
    fn from(bytes: Bytes) -> Self {
        ImageSource::Buffer(bytes)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Buffer(Bytes::from(bytes))
    }
}

// =============================================================================
// Similarity
// =============================================================================

/// How alike two images are. Both scores are in `[0, 1]`, 0 meaning equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Perceptual hash distance.
    pub distance: f64,
    /// Fraction of pixels that differ.
    pub difference: f64,
}

impl Similarity {
    pub const fn new(distance: f64, difference: f64) -> Self {
        Self {
            distance,
            difference,
        }
    }

    pub const fn identical() -> Self {
        Self::new(0.0, 0.0)
    }
}

// =============================================================================
// Raster Engine
// =============================================================================

/// The bitmap operations the splitter relies on.
///
/// Decoding and encoding are async since they sit on the I/O boundary;
/// cropping and comparing are plain in-memory computations.
#[async_trait]
pub trait RasterEngine: Send + Sync {
    /// Decoded image. Cloning must be cheap.
    type Handle: Clone + Send + Sync + 'static;

    /// Decode `source` and report its size.
    async fn load(&self, source: &ImageSource) -> Result<(Self::Handle, Size)>;

    /// Cut `rect` out of `image`.
    fn crop(&self, image: &Self::Handle, rect: TileRect) -> Result<Self::Handle>;

    /// Score how alike two images are.
    fn compare(&self, a: &Self::Handle, b: &Self::Handle) -> Result<Similarity>;

    /// Encode `image` as `extension`.
    async fn encode(&self, image: &Self::Handle, extension: Extension) -> Result<Bytes>;

    /// The encoding the image was decoded from.
    fn native_extension(&self, image: &Self::Handle) -> Extension;
}
