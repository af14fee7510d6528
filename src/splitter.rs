//! The splitting pipeline.
//!
//! ```text
//! load ─► validate ─► generate ─► prepare dir ─► crop ─► (filter) ─► assemble
//! ```
//!
//! Stages run strictly in order. Requests are validated before any pixel
//! is cropped or any file is written; the first failing stage aborts the
//! call and its error is returned wrapped with the stage it came from.

use tracing::debug;

use crate::error::Result;
use crate::geometry::{layout_rects, resolve, Size, TileRect, TilingRequest};
use crate::output::{assemble_in, prepare_directory, OutputRequest, TileOutput};
use crate::raster::{ImageRasterEngine, ImageSource, RasterEngine};
use crate::unique::filter_unique;

/// Splits images into tiles with a given raster engine.
///
/// # Example
///
/// ```no_run
/// use tilesplit::{OutputRequest, Splitter, StoreOptions, TilingRequest};
///
/// # async fn run() -> tilesplit::Result<()> {
/// let splitter = Splitter::new();
/// let output = OutputRequest::files(StoreOptions::new("out", "forest"));
/// let paths = splitter
///     .split("forestmap.png", &TilingRequest::grid(2, 2), &output)
///     .await?;
/// assert_eq!(paths.len(), 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Splitter<E = ImageRasterEngine> {
    engine: E,
}

impl Splitter<ImageRasterEngine> {
    /// Splitter using the `image` crate engine with default settings.
    pub fn new() -> Self {
        Self {
            engine: ImageRasterEngine::new(),
        }
    }
}

impl<E: RasterEngine> Splitter<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Load the image and compute the tile rectangles without cropping.
    pub async fn plan(
        &self,
        image: impl Into<ImageSource>,
        tiles: &TilingRequest,
    ) -> Result<(Size, Vec<TileRect>)> {
        let source = image.into();
        let (_, size) = self.load(&source).await?;
        let rects = self.generate(tiles, size)?;
        Ok((size, rects))
    }

    /// Load, validate, crop and (optionally) de-duplicate.
    ///
    /// Returns the cropped tiles in generation order.
    pub async fn cut(
        &self,
        image: impl Into<ImageSource>,
        tiles: &TilingRequest,
    ) -> Result<Vec<E::Handle>> {
        let source = image.into();
        let (image, size) = self.load(&source).await?;
        let rects = self.generate(tiles, size)?;
        self.crop_unique(&image, &rects, tiles)
    }

    /// Run the whole pipeline and return buffers or written paths.
    ///
    /// The output directory is created and checked for writability once the
    /// tile geometry is known to be valid, before any tile is cropped.
    pub async fn split(
        &self,
        image: impl Into<ImageSource>,
        tiles: &TilingRequest,
        output: &OutputRequest,
    ) -> Result<Vec<TileOutput>> {
        output
            .validate()
            .map_err(|e| e.context("Invalid output"))?;

        let source = image.into();
        let (image, size) = self.load(&source).await?;
        let rects = self.generate(tiles, size)?;

        let directory = match &output.store {
            Some(store) => Some(
                prepare_directory(&store.directory)
                    .await
                    .map_err(|e| e.context("Invalid output"))?,
            ),
            None => None,
        };

        let cut = self.crop_unique(&image, &rects, tiles)?;

        let outputs = assemble_in(&self.engine, &cut, output, directory.as_deref())
            .await
            .map_err(|e| e.context("Problem writing tiles"))?;
        debug!("Assembled {} output(s) as {}", outputs.len(), output.response);
        Ok(outputs)
    }

    fn crop_unique(
        &self,
        image: &E::Handle,
        rects: &[TileRect],
        tiles: &TilingRequest,
    ) -> Result<Vec<E::Handle>> {
        let cropped = rects
            .iter()
            .map(|rect| self.engine.crop(image, *rect))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.context("Problem splitting image"))?;
        debug!("Cropped {} tile(s)", cropped.len());

        match &tiles.unique {
            Some(policy) if policy.enabled => {
                let kept = filter_unique(&self.engine, cropped, policy);
                debug!(
                    requirement = %policy.requirement,
                    distance = policy.distance,
                    difference = policy.difference,
                    "Filtered down to {} unique tile(s)",
                    kept.len()
                );
                Ok(kept)
            }
            _ => Ok(cropped),
        }
    }

    async fn load(&self, source: &ImageSource) -> Result<(E::Handle, Size)> {
        let loaded = self
            .engine
            .load(source)
            .await
            .map_err(|e| e.context(format!("Error reading image {}", source.describe())))?;
        debug!(source = %source.describe(), size = %loaded.1, "Loaded image");
        Ok(loaded)
    }

    fn generate(&self, tiles: &TilingRequest, size: Size) -> Result<Vec<TileRect>> {
        let layout = resolve(tiles, size).map_err(|e| e.context("Invalid tiles"))?;
        let rects = layout_rects(&layout).map_err(|e| e.context("Problem getting tiles"))?;
        debug!(
            mode = %layout.mode,
            tile = %layout.tile_size(),
            "Generated {} tile rectangle(s)",
            rects.len()
        );
        Ok(rects)
    }
}

// =============================================================================
// Convenience entry points
// =============================================================================

/// Split `image` with the default engine.
pub async fn split_image(
    image: impl Into<ImageSource>,
    tiles: &TilingRequest,
    output: &OutputRequest,
) -> Result<Vec<TileOutput>> {
    Splitter::new().split(image, tiles, output).await
}

/// Split `image` into a `rows` x `columns` grid.
pub async fn grid_tiles(
    image: impl Into<ImageSource>,
    rows: u32,
    columns: u32,
    output: &OutputRequest,
) -> Result<Vec<TileOutput>> {
    split_image(image, &TilingRequest::grid(rows, columns), output).await
}

/// Split `image` into `columns` side-by-side tiles.
pub async fn horizontal_tiles(
    image: impl Into<ImageSource>,
    columns: u32,
    output: &OutputRequest,
) -> Result<Vec<TileOutput>> {
    split_image(image, &TilingRequest::horizontal(columns), output).await
}

/// Split `image` into `rows` stacked tiles.
pub async fn vertical_tiles(
    image: impl Into<ImageSource>,
    rows: u32,
    output: &OutputRequest,
) -> Result<Vec<TileOutput>> {
    split_image(image, &TilingRequest::vertical(rows), output).await
}
