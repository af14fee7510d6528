//! Tile rectangle generation.

use crate::error::{Result, SplitError};

use super::types::{Size, TileLayout, TileRect, TilingRequest};
use super::validate::resolve;

/// Produce the rectangles to cut for `request` on an image of `size`.
///
/// The request is resolved (and therefore validated) first, so calling this
/// directly with a bad request returns the same geometry error the
/// validator would.
pub fn generate(request: &TilingRequest, size: Size) -> Result<Vec<TileRect>> {
    let layout = resolve(request, size)?;
    layout_rects(&layout)
}

/// Enumerate the rectangles of a resolved layout.
///
/// Tiles are produced column by column: the outer loop walks x, the inner
/// loop walks y. Output file indices follow this order.
pub fn layout_rects(layout: &TileLayout) -> Result<Vec<TileRect>> {
    let size = layout.image;

    if layout.tile_width as u64 * layout.columns as u64 != size.width as u64
        || layout.tile_height as u64 * layout.rows as u64 != size.height as u64
    {
        return Err(SplitError::geometry(format!(
            "{} tiles of {}x{}px do not cover an image of {}",
            layout.tile_count(),
            layout.tile_width,
            layout.tile_height,
            size
        )));
    }

    if layout.tile_count() == 1 {
        return Ok(vec![TileRect::new(0, 0, size.width, size.height)]);
    }

    let mut rects = Vec::with_capacity(layout.tile_count());
    for column in 0..layout.columns {
        let x = column * layout.tile_width;
        for row in 0..layout.rows {
            let y = row * layout.tile_height;
            rects.push(TileRect::new(x, y, layout.tile_width, layout.tile_height));
        }
    }

    debug_assert!(rects.iter().all(|rect| rect.fits(size)));
    Ok(rects)
}
