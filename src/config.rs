//! Command-line configuration for tilesplit.
//!
//! Arguments can also be supplied through environment variables with the
//! `TILESPLIT_` prefix:
//!
//! - `TILESPLIT_MODE` - Tiling mode (default: grid)
//! - `TILESPLIT_ROWS` / `TILESPLIT_COLUMNS` - Tile counts
//! - `TILESPLIT_WIDTH` / `TILESPLIT_HEIGHT` - Tile size in pixels
//! - `TILESPLIT_DISTANCE` - Duplicate distance threshold (default: 0.15)
//! - `TILESPLIT_DIFFERENCE` - Duplicate difference threshold (default: 0.15)
//! - `TILESPLIT_REQUIREMENT` - one or both (default: both)
//! - `TILESPLIT_RESPONSE` - buffer or file
//! - `TILESPLIT_OUT_DIR` - Directory tiles are written to
//! - `TILESPLIT_PREFIX` - Tile filename prefix (default: tile)
//! - `TILESPLIT_EXTENSION` - Encoding of written tiles
//! - `TILESPLIT_JPEG_QUALITY` - JPEG quality (default: 80)

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::geometry::{TilingMode, TilingRequest};
use crate::output::{OutputRequest, ResponseKind, StoreOptions, DEFAULT_PREFIX};
use crate::raster::{Extension, DEFAULT_JPEG_QUALITY, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::unique::{Requirement, UniquePolicy, DEFAULT_DIFFERENCE, DEFAULT_DISTANCE};

// =============================================================================
// CLI Arguments
// =============================================================================

/// tilesplit - Split images into tiles.
#[derive(Parser, Debug, Clone)]
#[command(name = "tilesplit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Cut an image into tiles and write or summarize them.
    Split(SplitConfig),

    /// Print the tile rectangles for an image as JSON without cutting it.
    Plan(PlanConfig),
}

/// How to divide the image.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct TilingArgs {
    /// Tiling mode: grid, horizontal or vertical.
    #[arg(short, long, default_value = "grid", env = "TILESPLIT_MODE")]
    pub mode: TilingMode,

    /// Number of rows (grid, vertical).
    #[arg(short, long, env = "TILESPLIT_ROWS")]
    pub rows: Option<u32>,

    /// Number of columns (grid, horizontal).
    #[arg(short, long, env = "TILESPLIT_COLUMNS")]
    pub columns: Option<u32>,

    /// Tile width in pixels (grid, horizontal).
    #[arg(long, env = "TILESPLIT_WIDTH")]
    pub width: Option<u32>,

    /// Tile height in pixels (grid, vertical).
    #[arg(long, env = "TILESPLIT_HEIGHT")]
    pub height: Option<u32>,
}

impl TilingArgs {
    pub fn to_tiling_request(&self) -> TilingRequest {
        TilingRequest {
            mode: self.mode,
            rows: self.rows,
            columns: self.columns,
            width: self.width,
            height: self.height,
            unique: None,
        }
    }
}

/// Arguments of the `split` subcommand.
#[derive(Args, Debug, Clone)]
pub struct SplitConfig {
    /// Image to split.
    pub image: PathBuf,

    #[command(flatten)]
    pub tiling: TilingArgs,

    // =========================================================================
    // Duplicate Filter
    // =========================================================================
    /// Drop tiles that look like an earlier tile.
    #[arg(short, long, default_value_t = false)]
    pub unique: bool,

    /// Maximum perceptual distance for two tiles to be duplicates (0-1).
    #[arg(long, default_value_t = DEFAULT_DISTANCE, env = "TILESPLIT_DISTANCE")]
    pub distance: f64,

    /// Maximum pixel difference for two tiles to be duplicates (0-1).
    #[arg(long, default_value_t = DEFAULT_DIFFERENCE, env = "TILESPLIT_DIFFERENCE")]
    pub difference: f64,

    /// Whether one or both thresholds have to hold.
    #[arg(long, default_value = "both", env = "TILESPLIT_REQUIREMENT")]
    pub requirement: Requirement,

    // =========================================================================
    // Output
    // =========================================================================
    /// What to report: buffer or file.
    ///
    /// Defaults to file when an output directory is given.
    #[arg(long, env = "TILESPLIT_RESPONSE")]
    pub response: Option<ResponseKind>,

    /// Directory tiles are written to. Created if missing.
    #[arg(short, long, env = "TILESPLIT_OUT_DIR")]
    pub out_dir: Option<PathBuf>,

    /// Filename prefix of written tiles.
    #[arg(short, long, default_value = DEFAULT_PREFIX, env = "TILESPLIT_PREFIX")]
    pub prefix: String,

    /// Encoding of written tiles. Defaults to the source encoding.
    #[arg(short, long, env = "TILESPLIT_EXTENSION")]
    pub extension: Option<Extension>,

    /// JPEG quality for jpg/jpeg tiles (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, env = "TILESPLIT_JPEG_QUALITY")]
    pub jpeg_quality: u8,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl SplitConfig {
    /// Validate the arguments and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.response == Some(ResponseKind::File) && self.out_dir.is_none() {
            return Err(
                "A file response needs an output directory. Set --out-dir or TILESPLIT_OUT_DIR"
                    .to_string(),
            );
        }

        if self.prefix.is_empty() {
            return Err("prefix must not be empty".to_string());
        }

        if self.jpeg_quality < MIN_JPEG_QUALITY || self.jpeg_quality > MAX_JPEG_QUALITY {
            return Err(format!(
                "jpeg_quality must be between {} and {}",
                MIN_JPEG_QUALITY, MAX_JPEG_QUALITY
            ));
        }

        if self.unique {
            for (name, value) in [("distance", self.distance), ("difference", self.difference)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(format!("{} must be between 0 and 1", name));
                }
            }
        }

        Ok(())
    }

    pub fn to_tiling_request(&self) -> TilingRequest {
        let request = self.tiling.to_tiling_request();
        if !self.unique {
            return request;
        }
        request.with_unique(
            UniquePolicy::default()
                .with_requirement(self.requirement)
                .with_thresholds(self.distance, self.difference),
        )
    }

    pub fn to_output_request(&self) -> OutputRequest {
        let store = self.out_dir.as_ref().map(|dir| {
            let store = StoreOptions::new(dir, self.prefix.as_str());
            match self.extension {
                Some(extension) => store.with_extension(extension),
                None => store,
            }
        });
        let response = self.response.unwrap_or(if store.is_some() {
            ResponseKind::File
        } else {
            ResponseKind::Buffer
        });
        OutputRequest { response, store }
    }
}

/// Arguments of the `plan` subcommand.
#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    /// Image to plan tiles for.
    pub image: PathBuf,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

// =============================================================================
// Tests
// =============================================================================
