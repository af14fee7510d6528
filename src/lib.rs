//! # tilesplit
//!
//! Split a raster image into a list of rectangular tiles.
//!
//! Tiles are laid out as a grid, as vertical strips side by side
//! (horizontal mode) or as horizontal bands stacked top to bottom (vertical
//! mode). Tiles that look like an earlier tile can be dropped, and the
//! result is returned as encoded buffers or written to a directory.
//!
//! ## Architecture
//!
//! - [`geometry`] - Request validation and tile rectangle generation
//! - [`raster`] - Decoding, cropping, comparing and encoding behind [`RasterEngine`]
//! - [`unique`] - Greedy duplicate filter
//! - [`output`] - Buffers, filenames and file writing
//! - [`splitter`] - The pipeline tying the stages together
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tilesplit::{OutputRequest, Splitter, TilingRequest, UniquePolicy};
//!
//! #[tokio::main]
//! async fn main() -> tilesplit::Result<()> {
//!     let tiles = TilingRequest::horizontal(8).with_unique(UniquePolicy::default());
//!     let buffers = Splitter::new()
//!         .split("spritesheet.png", &tiles, &OutputRequest::buffers())
//!         .await?;
//!     println!("{} unique frames", buffers.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod output;
pub mod raster;
pub mod splitter;
pub mod unique;

// Re-export commonly used types
pub use error::{Result, SplitError};
pub use geometry::{generate, validate, Size, TileLayout, TileRect, TilingMode, TilingRequest};
pub use output::{OutputRequest, ResponseKind, StoreOptions, TileOutput};
pub use raster::{Extension, ImageRasterEngine, ImageSource, RasterEngine, RasterImage, Similarity};
pub use splitter::{grid_tiles, horizontal_tiles, split_image, vertical_tiles, Splitter};
pub use unique::{filter_unique, Requirement, UniquePolicy};
