//! Geometry types shared by the validator and the generator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SplitError;
use crate::unique::UniquePolicy;

// =============================================================================
// Size
// =============================================================================

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}px", self.width, self.height)
    }
}

// =============================================================================
// Tiling Mode
// =============================================================================

/// How the image is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TilingMode {
    /// Rows and columns, or tile width and height.
    Grid,
    /// A single row of tiles: columns or tile width.
    Horizontal,
    /// A single column of tiles: rows or tile height.
    Vertical,
}

impl TilingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TilingMode::Grid => "grid",
            TilingMode::Horizontal => "horizontal",
            TilingMode::Vertical => "vertical",
        }
    }
}

impl fmt::Display for TilingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TilingMode {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(TilingMode::Grid),
            "horizontal" => Ok(TilingMode::Horizontal),
            "vertical" => Ok(TilingMode::Vertical),
            _ => Err(SplitError::geometry(
                "Invalid mode, only grid, horizontal, vertical is permitted",
            )),
        }
    }
}

// =============================================================================
// Tiling Request
// =============================================================================

/// What the caller asked for, before it has been checked against an image.
///
/// Dimension fields left as `None` (or set to zero) are treated as absent.
/// Which of them must be present depends on [`TilingMode`]; see
/// [`validate`](super::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingRequest {
    pub mode: TilingMode,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub columns: Option<u32>,
    /// Tile width in pixels.
    #[serde(default)]
    pub width: Option<u32>,
    /// Tile height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub unique: Option<UniquePolicy>,
}

impl TilingRequest {
    /// Empty request for `mode`; dimensions are filled in by the caller.
    pub fn new(mode: TilingMode) -> Self {
        Self {
            mode,
            rows: None,
            columns: None,
            width: None,
            height: None,
            unique: None,
        }
    }

    /// Grid of `rows` x `columns` tiles.
    pub fn grid(rows: u32, columns: u32) -> Self {
        Self {
            rows: Some(rows),
            columns: Some(columns),
            ..Self::new(TilingMode::Grid)
        }
    }

    /// Grid of tiles of `width` x `height` pixels.
    pub fn grid_px(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::new(TilingMode::Grid)
        }
    }

    pub fn horizontal(columns: u32) -> Self {
        Self {
            columns: Some(columns),
            ..Self::new(TilingMode::Horizontal)
        }
    }

    pub fn horizontal_px(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::new(TilingMode::Horizontal)
        }
    }

    pub fn vertical(rows: u32) -> Self {
        Self {
            rows: Some(rows),
            ..Self::new(TilingMode::Vertical)
        }
    }

    pub fn vertical_px(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Self::new(TilingMode::Vertical)
        }
    }

    /// Attach a duplicate filtering policy.
    pub fn with_unique(mut self, policy: UniquePolicy) -> Self {
        self.unique = Some(policy);
        self
    }

    pub(crate) fn rows_or_zero(&self) -> u32 {
        self.rows.unwrap_or(0)
    }

    pub(crate) fn columns_or_zero(&self) -> u32 {
        self.columns.unwrap_or(0)
    }

    pub(crate) fn width_or_zero(&self) -> u32 {
        self.width.unwrap_or(0)
    }

    pub(crate) fn height_or_zero(&self) -> u32 {
        self.height.unwrap_or(0)
    }
}

// =============================================================================
// Tile Rectangle
// =============================================================================

/// One rectangle to cut out of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Whether the rectangle lies entirely inside an image of `size`.
    pub fn fits(&self, size: Size) -> bool {
        self.width > 0
            && self.height > 0
            && self.right() <= size.width as u64
            && self.bottom() <= size.height as u64
    }

    /// Whether the rectangle is the whole image.
    pub fn covers(&self, size: Size) -> bool {
        self.x == 0 && self.y == 0 && self.width == size.width && self.height == size.height
    }
}

// =============================================================================
// Tile Layout
// =============================================================================

/// A validated tiling: every tile has the same extent and the tiles cover
/// the image exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileLayout {
    pub mode: TilingMode,
    /// Size of the image the layout was resolved against.
    pub image: Size,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Tiles along the x axis.
    pub columns: u32,
    /// Tiles along the y axis.
    pub rows: u32,
}

impl TileLayout {
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Extent shared by every tile.
    pub fn tile_size(&self) -> Size {
        Size::new(self.tile_width, self.tile_height)
    }
}
