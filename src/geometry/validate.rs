//! Tiling request validation.
//!
//! A request is checked against the size of the decoded image before any
//! pixel work happens. Checks run in a fixed order and the first failure is
//! returned:
//!
//! 1. **Presence**: the dimension parameters required by the mode are
//!    supplied, and the alternative parameters are not.
//! 2. **Submultiple**: each active parameter divides the matching image
//!    dimension exactly, so every tile has the same integer extent.
//! 3. **Unique policy**: thresholds are within `[0, 1]`.

use crate::error::{Result, SplitError};

use super::types::{Size, TileLayout, TilingMode, TilingRequest};

/// Check `request` against an image of `size`.
pub fn validate(request: &TilingRequest, size: Size) -> Result<()> {
    resolve(request, size).map(|_| ())
}

/// Validate `request` and turn it into a [`TileLayout`].
///
/// This is the only place where the optional request fields are inspected;
/// everything downstream works on the resolved layout.
pub fn resolve(request: &TilingRequest, size: Size) -> Result<TileLayout> {
    if size.width == 0 || size.height == 0 {
        return Err(SplitError::geometry(format!(
            "image has no pixels ({})",
            size
        )));
    }

    let layout = match request.mode {
        TilingMode::Grid => resolve_grid(request, size)?,
        TilingMode::Horizontal => resolve_horizontal(request, size)?,
        TilingMode::Vertical => resolve_vertical(request, size)?,
    };

    if let Some(unique) = &request.unique {
        unique.validate()?;
    }

    Ok(layout)
}

// =============================================================================
// Per-mode rules
// =============================================================================

fn resolve_grid(request: &TilingRequest, size: Size) -> Result<TileLayout> {
    let rows = request.rows_or_zero();
    let columns = request.columns_or_zero();
    let width = request.width_or_zero();
    let height = request.height_or_zero();

    let by_count = rows > 0 || columns > 0;
    let by_extent = width > 0 || height > 0;

    if !by_count && !by_extent {
        return Err(SplitError::geometry(
            "you need to provide two non zero natural numbers, columns + rows or width (px) + height (px)",
        ));
    }
    if by_count && by_extent {
        return Err(SplitError::geometry(format!(
            "provide columns + rows or width (px) + height (px), not both \
             (columns: {}, rows: {}, width: {}, height: {})",
            columns, rows, width, height
        )));
    }

    if by_count {
        if rows == 0 || columns == 0 {
            return Err(SplitError::geometry(format!(
                "columns and rows have to be provided together (columns: {}, rows: {})",
                columns, rows
            )));
        }
        let tile_width = divide("columns", columns, size.width)?;
        let tile_height = divide("rows", rows, size.height)?;
        return Ok(TileLayout {
            mode: TilingMode::Grid,
            image: size,
            tile_width,
            tile_height,
            columns,
            rows,
        });
    }

    if width == 0 || height == 0 {
        return Err(SplitError::geometry(format!(
            "width (px) and height (px) have to be provided together (width: {}, height: {})",
            width, height
        )));
    }
    let columns = divide_extent("width", width, size.width)?;
    let rows = divide_extent("height", height, size.height)?;
    Ok(TileLayout {
        mode: TilingMode::Grid,
        image: size,
        tile_width: width,
        tile_height: height,
        columns,
        rows,
    })
}

fn resolve_horizontal(request: &TilingRequest, size: Size) -> Result<TileLayout> {
    let columns = request.columns_or_zero();
    let width = request.width_or_zero();

    reject_unused(
        TilingMode::Horizontal,
        "rows",
        request.rows_or_zero(),
        "height",
        request.height_or_zero(),
    )?;
    match (columns > 0, width > 0) {
        (false, false) => Err(SplitError::geometry(
            "you need to provide one natural number, columns or width (px)",
        )),
        (true, true) => Err(SplitError::geometry(format!(
            "provide columns or width (px), not both (columns: {}, width: {})",
            columns, width
        ))),
        (true, false) => Ok(TileLayout {
            mode: TilingMode::Horizontal,
            image: size,
            tile_width: divide("columns", columns, size.width)?,
            tile_height: size.height,
            columns,
            rows: 1,
        }),
        (false, true) => Ok(TileLayout {
            mode: TilingMode::Horizontal,
            image: size,
            tile_width: width,
            tile_height: size.height,
            columns: divide_extent("width", width, size.width)?,
            rows: 1,
        }),
    }
}

fn resolve_vertical(request: &TilingRequest, size: Size) -> Result<TileLayout> {
    let rows = request.rows_or_zero();
    let height = request.height_or_zero();

    reject_unused(
        TilingMode::Vertical,
        "columns",
        request.columns_or_zero(),
        "width",
        request.width_or_zero(),
    )?;
    match (rows > 0, height > 0) {
        (false, false) => Err(SplitError::geometry(
            "you need to provide one natural number, rows or height (px)",
        )),
        (true, true) => Err(SplitError::geometry(format!(
            "provide rows or height (px), not both (rows: {}, height: {})",
            rows, height
        ))),
        (true, false) => Ok(TileLayout {
            mode: TilingMode::Vertical,
            image: size,
            tile_width: size.width,
            tile_height: divide("rows", rows, size.height)?,
            columns: 1,
            rows,
        }),
        (false, true) => Ok(TileLayout {
            mode: TilingMode::Vertical,
            image: size,
            tile_width: size.width,
            tile_height: height,
            columns: 1,
            rows: divide_extent("height", height, size.height)?,
        }),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Horizontal and vertical modes only cut along one axis.
fn reject_unused(
    mode: TilingMode,
    count_name: &str,
    count: u32,
    extent_name: &str,
    extent: u32,
) -> Result<()> {
    if count > 0 || extent > 0 {
        return Err(SplitError::geometry(format!(
            "{} mode does not use {} ({}) or {} ({})",
            mode, count_name, count, extent_name, extent
        )));
    }
    Ok(())
}

/// Split `total` pixels into `count` equal parts.
fn divide(name: &str, count: u32, total: u32) -> Result<u32> {
    if total % count != 0 {
        return Err(SplitError::geometry(format!(
            "{} ({}) has to be a submultiple of {} px",
            name, count, total
        )));
    }
    Ok(total / count)
}

/// Number of `extent`-pixel tiles that fit in `total` pixels.
fn divide_extent(name: &str, extent: u32, total: u32) -> Result<u32> {
    if total % extent != 0 {
        return Err(SplitError::geometry(format!(
            "{} ({} px) has to be a submultiple of {} px",
            name, extent, total
        )));
    }
    Ok(total / extent)
}

// =============================================================================
// Tests
// =============================================================================
