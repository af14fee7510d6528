//! Turning cut tiles into buffers and files.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{Result, SplitError};
use crate::raster::RasterEngine;

use super::filename::tile_file_name;
use super::{OutputRequest, ResponseKind, StoreOptions, TileOutput};

static CHECK_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Make sure `directory` exists and can be written to.
///
/// A missing directory is created (with its parents). Writability is checked
/// by creating and removing a test file, so ownership and ACLs count, not
/// only the permission bits. Returns the absolute path of the directory.
pub async fn prepare_directory(directory: &Path) -> Result<PathBuf> {
    if !tokio::fs::try_exists(directory).await.unwrap_or(false) {
        tokio::fs::create_dir_all(directory).await.map_err(|e| {
            SplitError::io_with(
                format!("Cannot create the path provided: {}", directory.display()),
                e,
            )
        })?;
        debug!(directory = %directory.display(), "Created output directory");
    }

    let metadata = tokio::fs::metadata(directory).await.map_err(|e| {
        SplitError::io_with(format!("Not exists path {}", directory.display()), e)
    })?;
    if !metadata.is_dir() {
        return Err(not_writable(directory, None));
    }

    let resolved = tokio::fs::canonicalize(directory).await.map_err(|e| {
        SplitError::io_with(format!("Cannot resolve path {}", directory.display()), e)
    })?;
    check_writable(&resolved).await?;
    Ok(resolved)
}

async fn check_writable(directory: &Path) -> Result<()> {
    let check = directory.join(format!(
        ".tilesplit-write-check-{}-{}",
        std::process::id(),
        CHECK_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&check)
        .await
        .map_err(|e| not_writable(directory, Some(e)))?;
    tokio::fs::remove_file(&check)
        .await
        .map_err(|e| not_writable(directory, Some(e)))
}

fn not_writable(directory: &Path, source: Option<std::io::Error>) -> SplitError {
    let message = format!(
        "path provided doesn't have write permissions: {}",
        directory.display()
    );
    match source {
        Some(e) => SplitError::io_with(message, e),
        None => SplitError::io(message),
    }
}

/// Encode `tiles` and hand them back according to `request`.
///
/// Files are written concurrently. The first failed write aborts the rest
/// and is returned; files already written stay on disk.
pub async fn assemble<E: RasterEngine>(
    engine: &E,
    tiles: &[E::Handle],
    request: &OutputRequest,
) -> Result<Vec<TileOutput>> {
    if tiles.is_empty() {
        return Err(SplitError::output("no tiles to output"));
    }
    request.validate()?;

    let directory = match &request.store {
        Some(store) => Some(prepare_directory(&store.directory).await?),
        None => None,
    };
    assemble_in(engine, tiles, request, directory.as_deref()).await
}

/// Like [`assemble`], with the store directory already checked by
/// [`prepare_directory`].
pub(crate) async fn assemble_in<E: RasterEngine>(
    engine: &E,
    tiles: &[E::Handle],
    request: &OutputRequest,
    directory: Option<&Path>,
) -> Result<Vec<TileOutput>> {
    if tiles.is_empty() {
        return Err(SplitError::output("no tiles to output"));
    }

    if let (Some(store), Some(directory)) = (&request.store, directory) {
        let paths = write_tiles(engine, tiles, store, directory).await?;
        if request.response == ResponseKind::File {
            return Ok(paths.into_iter().map(TileOutput::File).collect());
        }
    }

    let mut buffers = Vec::with_capacity(tiles.len());
    for tile in tiles {
        let extension = engine.native_extension(tile);
        buffers.push(TileOutput::Buffer(engine.encode(tile, extension).await?));
    }
    Ok(buffers)
}

async fn write_tiles<E: RasterEngine>(
    engine: &E,
    tiles: &[E::Handle],
    store: &StoreOptions,
    directory: &Path,
) -> Result<Vec<PathBuf>> {
    let extension = store
        .extension
        .unwrap_or_else(|| engine.native_extension(&tiles[0]));
    let count = tiles.len();

    let mut writes = JoinSet::new();
    for (index, tile) in tiles.iter().enumerate() {
        let bytes: Bytes = engine.encode(tile, extension).await?;
        let path = directory.join(tile_file_name(
            &store.filename_prefix,
            index,
            count,
            extension,
        ));

        writes.spawn(async move {
            match tokio::fs::write(&path, &bytes).await {
                Ok(()) => Ok((index, path)),
                Err(e) => Err(SplitError::io_with(
                    format!("Error writing tile {}", path.display()),
                    e,
                )),
            }
        });
    }

    let mut paths: Vec<Option<PathBuf>> = vec![None; count];
    while let Some(joined) = writes.join_next().await {
        let (index, path) = joined
            .map_err(|e| SplitError::io(format!("tile write task failed: {}", e)))??;
        paths[index] = Some(path);
    }

    info!(
        "Wrote {} tile(s) to {} as {}",
        count,
        directory.display(),
        extension
    );
    Ok(paths.into_iter().flatten().collect())
}
