//! Output policy and tile assembly.
//!
//! Cut tiles leave the splitter either as encoded buffers or as files in a
//! directory. When a store is configured the files are always written; the
//! response kind only decides what is returned to the caller.
//!
//! | response | store   | written files | returned            |
//! |----------|---------|---------------|---------------------|
//! | buffer   | none    | no            | buffers             |
//! | buffer   | present | yes           | buffers             |
//! | file     | present | yes           | absolute file paths |
//! | file     | none    | -             | output error        |

mod assemble;
mod filename;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::raster::Extension;

pub use assemble::{assemble, prepare_directory};
pub(crate) use assemble::assemble_in;
pub use filename::{is_windows_reserved, suffix_width, tile_file_name, validate_filename};

/// Default filename prefix for written tiles.
pub const DEFAULT_PREFIX: &str = "tile";

// =============================================================================
// Output Request
// =============================================================================

/// What the caller gets back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Encoded image bytes, one per tile.
    #[default]
    Buffer,
    /// Paths of the written files, one per tile.
    #[serde(alias = "path")]
    File,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKind::Buffer => f.write_str("buffer"),
            ResponseKind::File => f.write_str("file"),
        }
    }
}

impl FromStr for ResponseKind {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "buffer" => Ok(ResponseKind::Buffer),
            "file" | "path" => Ok(ResponseKind::File),
            _ => Err(SplitError::output(
                "Invalid output response, it should be \"buffer\" or \"file\"",
            )),
        }
    }
}

/// Where and how tiles are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Created if missing.
    pub directory: PathBuf,
    /// File names are `<prefix>.<ext>` or `<prefix>_<index>.<ext>`.
    #[serde(default = "default_prefix")]
    pub filename_prefix: String,
    /// Defaults to the encoding of the source image.
    #[serde(default)]
    pub extension: Option<Extension>,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

impl StoreOptions {
    pub fn new(directory: impl Into<PathBuf>, filename_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename_prefix: filename_prefix.into(),
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extension = Some(extension);
        self
    }
}

/// How the splitter should hand tiles back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRequest {
    #[serde(default)]
    pub response: ResponseKind,
    #[serde(default)]
    pub store: Option<StoreOptions>,
}

impl OutputRequest {
    /// Return buffers and write nothing.
    pub fn buffers() -> Self {
        Self::default()
    }

    /// Write files and return their paths.
    pub fn files(store: StoreOptions) -> Self {
        Self {
            response: ResponseKind::File,
            store: Some(store),
        }
    }

    /// Write files but return buffers.
    pub fn buffers_and_store(store: StoreOptions) -> Self {
        Self {
            response: ResponseKind::Buffer,
            store: Some(store),
        }
    }

    /// Checks that need no filesystem access: response/store combination
    /// and filename prefix.
    pub fn validate(&self) -> Result<()> {
        match (&self.response, &self.store) {
            (ResponseKind::File, None) => Err(SplitError::output(
                "To response with file, store argument has to be passed",
            )),
            (_, Some(store)) => validate_filename(&store.filename_prefix),
            (ResponseKind::Buffer, None) => Ok(()),
        }
    }
}

// =============================================================================
// Tile Output
// =============================================================================

/// One element of the splitter's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOutput {
    Buffer(Bytes),
    File(PathBuf),
}

impl TileOutput {
    pub fn as_buffer(&self) -> Option<&Bytes> {
        match self {
            TileOutput::Buffer(bytes) => Some(bytes),
            TileOutput::File(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            TileOutput::Buffer(_) => None,
            TileOutput::File(path) => Some(path),
        }
    }
}
