use thiserror::Error;

/// Errors produced while splitting an image into tiles.
///
/// Every failure surfaces as one of these variants. The variant names the
/// category of the problem; the message is what gets shown to the caller.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Missing, contradictory or non-submultiple tile dimensions, or a crop
    /// rectangle that does not fit inside the image.
    #[error("{0}")]
    Geometry(String),

    /// Source image unreadable, output directory missing or not writable.
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Output filename rejected by the filename safety rules.
    #[error("{0}")]
    Naming(String),

    /// Empty tile set or an invalid output policy combination.
    #[error("{0}")]
    Output(String),

    /// Decoding, encoding or comparing pixels failed in the raster engine.
    #[error("{message}")]
    Raster {
        message: String,
        #[source]
        source: Option<image::ImageError>,
    },

    /// An inner error wrapped with the pipeline stage it came from.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<SplitError>,
    },
}

impl SplitError {
    pub fn geometry(message: impl Into<String>) -> Self {
        SplitError::Geometry(message.into())
    }

    pub fn naming(message: impl Into<String>) -> Self {
        SplitError::Naming(message.into())
    }

    pub fn output(message: impl Into<String>) -> Self {
        SplitError::Output(message.into())
    }

    /// I/O error without an underlying OS error.
    pub fn io(message: impl Into<String>) -> Self {
        SplitError::Io {
            message: message.into(),
            source: None,
        }
    }

    /// I/O error that keeps the OS error as its source.
    pub fn io_with(message: impl Into<String>, source: std::io::Error) -> Self {
        SplitError::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn raster(message: impl Into<String>) -> Self {
        SplitError::Raster {
            message: message.into(),
            source: None,
        }
    }

    pub fn raster_with(message: impl Into<String>, source: image::ImageError) -> Self {
        SplitError::Raster {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Wrap this error with stage context.
    ///
    /// The display form becomes `"<context>: <inner message>"`.
    pub fn context(self, context: impl Into<String>) -> Self {
        SplitError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `Context` wrappers.
    pub fn root(&self) -> &SplitError {
        match self {
            SplitError::Context { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SplitError>;
