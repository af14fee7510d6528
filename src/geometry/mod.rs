//! Tile geometry.
//!
//! Pure, synchronous computations that turn a [`TilingRequest`] and the size
//! of the source image into the list of rectangles to cut.
//!
//! ```text
//! TilingRequest + Size
//!          │
//!          ▼
//!   validate / resolve ──► TileLayout
//!                               │
//!                               ▼
//!                          layout_rects ──► Vec<TileRect>
//! ```
//!
//! # Example
//!
//! ```
//! use tilesplit::geometry::{generate, Size, TileRect, TilingRequest};
//!
//! let rects = generate(&TilingRequest::grid(2, 2), Size::new(320, 224)).unwrap();
//! assert_eq!(rects.len(), 4);
//! assert_eq!(rects[1], TileRect::new(0, 112, 160, 112));
//! ```

mod generate;
mod types;
mod validate;

pub use generate::{generate, layout_rects};
pub use types::{Size, TileLayout, TileRect, TilingMode, TilingRequest};
pub use validate::{resolve, validate};
