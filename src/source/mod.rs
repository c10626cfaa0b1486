//! Image source resolution.
//!
//! The positional source argument is either a `WIDTHxHEIGHT` geometry for
//! a blank canvas or a path. Paths are tried as raster images first (format
//! sniffed from the content, not the extension) and then as PDF documents,
//! whose first page is rasterized.

pub mod pdf;

use crate::canvas::Canvas;
use crate::constants::DEFAULT_PDF_DPI;
use crate::error::{Error, Result};
use crate::watermark::text_renderer::{Color, Typesetter};
use regex::Regex;
use std::path::{Path, PathBuf};

/// Where the canvas came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Blank { width: u32, height: u32 },
    Raster(PathBuf),
    Pdf { path: PathBuf, dpi: u32 },
}

/// Knobs that affect how a source becomes a canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceOptions {
    pub pdf_dpi: u32,
    /// Fill for blank canvases; `None` leaves them transparent.
    pub background: Option<Color>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            pdf_dpi: DEFAULT_PDF_DPI,
            background: None,
        }
    }
}

/// Parse `WIDTHxHEIGHT`.
///
/// Returns `Ok(None)` when `spec` does not have the geometry shape at all,
/// and `InvalidGeometry` when it does but a dimension is zero or too large.
pub fn parse_geometry(spec: &str) -> Result<Option<(u32, u32)>> {
    let re = Regex::new(r"^(\d+)x(\d+)$").map_err(|e| Error::Config(e.to_string()))?;
    let Some(caps) = re.captures(spec) else {
        return Ok(None);
    };
    let invalid = || Error::InvalidGeometry(spec.to_string());
    let width: u32 = caps[1].parse().map_err(|_| invalid())?;
    let height: u32 = caps[2].parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok(Some((width, height)))
}

impl ImageSource {
    /// Resolve `spec` and build its canvas.
    ///
    /// PDF text is drawn with `typesetter`.
    pub fn open(
        spec: &str,
        options: &SourceOptions,
        typesetter: &Typesetter,
    ) -> Result<(ImageSource, Canvas)> {
        if let Some((width, height)) = parse_geometry(spec)? {
            let canvas = match options.background {
                Some(color) => Canvas::filled(width, height, color),
                None => Canvas::blank(width, height),
            }
            .map_err(|_| Error::InvalidGeometry(spec.to_string()))?;
            tracing::debug!(width, height, "blank canvas");
            return Ok((ImageSource::Blank { width, height }, canvas));
        }

        let path = Path::new(spec);
        if !path.is_file() {
            return Err(Error::InvalidGeometry(spec.to_string()));
        }

        match open_raster(path) {
            Ok(canvas) => {
                tracing::debug!(
                    path = %path.display(),
                    width = canvas.width(),
                    height = canvas.height(),
                    "raster source"
                );
                Ok((ImageSource::Raster(path.to_path_buf()), canvas))
            }
            Err(raster_err) => {
                tracing::debug!(error = %raster_err, "not a raster image, trying PDF");
                let canvas = pdf::rasterize_file(path, options.pdf_dpi, typesetter)?;
                let source = ImageSource::Pdf {
                    path: path.to_path_buf(),
                    dpi: options.pdf_dpi,
                };
                Ok((source, canvas))
            }
        }
    }
}

fn open_raster(path: &Path) -> Result<Canvas> {
    let reader = image::io::Reader::open(path)
        .map_err(|e| Error::io("cannot open image", path, e))?
        .with_guessed_format()
        .map_err(|e| Error::io("cannot read image", path, e))?;
    let image = reader.decode()?;
    Canvas::from_rgba(&image.to_rgba8())
}
