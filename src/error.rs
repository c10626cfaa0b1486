// Error types module

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Centralized error type for a rendering run.
///
/// Every variant is fatal: the binary logs it and exits without writing
/// output. Unknown rotation and orientation specs are not errors; they are
/// reported as warnings where they are resolved.
#[derive(Error, Debug)]
pub enum Error {
    /// A line carried a size directive outside the grammar
    #[error("invalid format: {directive}")]
    InvalidDirective { directive: String },

    /// Fit-width sizing was requested for text without any ink
    #[error("cannot fit text without visible glyphs: {text:?}")]
    UnmeasurableText { text: String },

    /// Malformed WIDTHxHEIGHT or a source that does not exist
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// File or stream failure, carrying the OS error text
    #[error("{context} ({}): {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document library failure, passed through verbatim
    #[error(transparent)]
    Pdf(#[from] lopdf::Error),

    /// Codec failure, passed through verbatim
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Font file could not be read or parsed
    #[error("font error: {0}")]
    Font(String),

    /// Configuration file could not be loaded or failed validation
    #[error("configuration error: {0}")]
    Config(String),

    /// Output format name not recognized
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Wrap an I/O error with what was being attempted and on which path.
    pub fn io(context: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
