//! Output encodings.

use std::fmt;
use std::str::FromStr;

use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::SplitError;

/// File extensions tiles can be written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extension {
    Jpg,
    Jpeg,
    Png,
    Bmp,
    Gif,
    Tiff,
}

impl Extension {
    pub const ALL: [Extension; 6] = [
        Extension::Jpg,
        Extension::Jpeg,
        Extension::Png,
        Extension::Bmp,
        Extension::Gif,
        Extension::Tiff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::Jpg => "jpg",
            Extension::Jpeg => "jpeg",
            Extension::Png => "png",
            Extension::Bmp => "bmp",
            Extension::Gif => "gif",
            Extension::Tiff => "tiff",
        }
    }

    /// Encoder to use for this extension.
    pub fn image_format(&self) -> ImageFormat {
        match self {
            Extension::Jpg | Extension::Jpeg => ImageFormat::Jpeg,
            Extension::Png => ImageFormat::Png,
            Extension::Bmp => ImageFormat::Bmp,
            Extension::Gif => ImageFormat::Gif,
            Extension::Tiff => ImageFormat::Tiff,
        }
    }

    /// Extension for a decoded format. Formats that tiles cannot be written
    /// as map to `png`.
    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Extension::Jpg,
            ImageFormat::Png => Extension::Png,
            ImageFormat::Bmp => Extension::Bmp,
            ImageFormat::Gif => Extension::Gif,
            ImageFormat::Tiff => Extension::Tiff,
            _ => Extension::Png,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Extension {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim_start_matches('.').to_ascii_lowercase();
        Extension::ALL
            .into_iter()
            .find(|ext| ext.as_str() == wanted)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Extension::ALL.iter().map(|e| e.as_str()).collect();
                SplitError::naming(format!(
                    "{} needs to be one of this extensions -> {}",
                    s,
                    allowed.join(",")
                ))
            })
    }
}
