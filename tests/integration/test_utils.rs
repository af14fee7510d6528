//! Test utilities for integration tests.
//!
//! This module synthesises source images in memory and provides a mock
//! raster engine that records every call made by the splitter.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tilesplit::{Extension, ImageSource, RasterEngine, Similarity, Size, SplitError, TileRect};

// =============================================================================
// Image Fixtures
// =============================================================================

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Encode an RGBA image in memory.
pub fn encode(image: RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode fixture");
    buf
}

/// Black and white checkerboard with `cell` px squares.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            BLACK
        } else {
            WHITE
        }
    })
}

/// Horizontal black and white stripes `band` px tall.
pub fn stripes(width: u32, height: u32, band: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| if (y / band) % 2 == 0 { BLACK } else { WHITE })
}

/// Every pixel carries its own coordinates, so a crop can be located.
pub fn coordinates(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x / 256) * 16 + y / 256) as u8, 255])
    })
}

/// A horizontal strip of `size` x `size` frames: `'A'` is a checkerboard,
/// `'B'` is striped, anything else is solid red.
pub fn sprite_strip(pattern: &str, size: u32) -> RgbaImage {
    let frames: Vec<RgbaImage> = pattern
        .chars()
        .map(|c| match c {
            'A' => checkerboard(size, size, size / 4),
            'B' => stripes(size, size, size / 4),
            _ => RgbaImage::from_pixel(size, size, Rgba([220, 20, 20, 255])),
        })
        .collect();

    let mut strip = RgbaImage::new(size * frames.len() as u32, size);
    for (i, frame) in frames.iter().enumerate() {
        image::imageops::replace(&mut strip, frame, (i as u32 * size) as i64, 0);
    }
    strip
}

pub fn png(image: RgbaImage) -> Vec<u8> {
    encode(image, ImageFormat::Png)
}

/// Decode tile bytes returned by the splitter.
pub fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("decode tile")
        .to_rgba8()
}

// =============================================================================
// Scratch Directories
// =============================================================================

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A unique directory under the system temp dir, removed on drop.
///
/// The directory itself is not created, so tests can check that the
/// splitter creates it.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        let n = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "tilesplit-it-{}-{}-{}",
            name,
            std::process::id(),
            n
        ));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File names in the directory, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

// =============================================================================
// Mock Raster Engine with Call Tracking
// =============================================================================

/// Handle of the mock engine: the region of the source plus its look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTile {
    pub rect: TileRect,
    pub look: char,
}

/// A call made to the mock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load,
    Crop(TileRect),
    Compare(TileRect, TileRect),
    Encode(TileRect, Extension),
}

/// A raster engine that never touches pixels.
///
/// The "image" has a fixed size. Tiles get their look from `looks`, keyed by
/// tile origin (default `'?'`); tiles with the same look compare as
/// identical, different looks as completely different.
#[derive(Clone)]
pub struct MockRasterEngine {
    size: Size,
    looks: HashMap<(u32, u32), char>,
    failing: Option<char>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockRasterEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            looks: HashMap::new(),
            failing: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Give each `tile_width` wide column of the image a look from `pattern`.
    pub fn with_column_looks(mut self, tile_width: u32, pattern: &str) -> Self {
        for (i, look) in pattern.chars().enumerate() {
            self.looks.insert((i as u32 * tile_width, 0), look);
        }
        self
    }

    /// Make every comparison involving a tile with `look` fail.
    pub fn failing_on(mut self, look: char) -> Self {
        self.failing = Some(look);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| predicate(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RasterEngine for MockRasterEngine {
    type Handle = MockTile;

    async fn load(&self, _source: &ImageSource) -> tilesplit::Result<(MockTile, Size)> {
        self.record(Call::Load);
        let whole = MockTile {
            rect: TileRect::new(0, 0, self.size.width, self.size.height),
            look: '*',
        };
        Ok((whole, self.size))
    }

    fn crop(&self, _image: &MockTile, rect: TileRect) -> tilesplit::Result<MockTile> {
        self.record(Call::Crop(rect));
        let look = self.looks.get(&(rect.x, rect.y)).copied().unwrap_or('?');
        Ok(MockTile { rect, look })
    }

    fn compare(&self, a: &MockTile, b: &MockTile) -> tilesplit::Result<Similarity> {
        self.record(Call::Compare(a.rect, b.rect));
        if self.failing.is_some() && (self.failing == Some(a.look) || self.failing == Some(b.look)) {
            return Err(SplitError::raster("mock comparison failure"));
        }
        if a.look == b.look {
            Ok(Similarity::identical())
        } else {
            Ok(Similarity::new(1.0, 1.0))
        }
    }

    async fn encode(&self, image: &MockTile, extension: Extension) -> tilesplit::Result<Bytes> {
        self.record(Call::Encode(image.rect, extension));
        Ok(Bytes::from(format!(
            "{}@{},{}.{}",
            image.look, image.rect.x, image.rect.y, extension
        )))
    }

    fn native_extension(&self, _image: &MockTile) -> Extension {
        Extension::Png
    }
}
