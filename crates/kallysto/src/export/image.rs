//! Images behind figure exports.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KallystoError, Result};

/// Output format for figure images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Pdf,
    Png,
}

impl ImageFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Pdf => "pdf",
            ImageFormat::Png => "png",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = KallystoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ImageFormat::Pdf),
            "png" => Ok(ImageFormat::Png),
            other => Err(KallystoError::Unsupported(format!(
                "Image format '{}'. Use pdf or png.",
                other
            ))),
        }
    }
}

/// A renderable graphic that can save itself to a file.
///
/// Plotting libraries plug in here; Kallysto only decides where the file
/// goes and in which format.
pub trait Image: fmt::Debug {
    /// Write the image to `path` in `format`.
    fn save(&self, path: &Path, format: ImageFormat) -> io::Result<()>;
}

/// An image that is already encoded, e.g. a PNG produced by a plotting
/// backend or read from disk.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl EncodedImage {
    /// Wrap encoded bytes.
    pub fn new(format: ImageFormat, bytes: Vec<u8>) -> Self {
        Self { format, bytes }
    }

    /// Load an image file, taking the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format: ImageFormat = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default()
            .parse()?;
        let bytes = std::fs::read(path).map_err(|e| KallystoError::io(path, e))?;
        Ok(Self { format, bytes })
    }

    /// The format the bytes are encoded in.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// The encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Image for EncodedImage {
    fn save(&self, path: &Path, format: ImageFormat) -> io::Result<()> {
        if format != self.format {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("image is encoded as {}, cannot save as {}", self.format, format),
            ));
        }
        std::fs::write(path, &self.bytes)
    }
}
