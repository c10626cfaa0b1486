//! Output encoding.
//!
//! Encodes the finished raster into the requested format and writes it to
//! standard output or a file. File output goes through a temporary file in
//! the destination directory that is renamed into place only after the
//! whole image has been written; a failed run leaves no partial file.

use crate::error::{Error, Result};
use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use serde::Deserialize;
use std::fmt;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

const JPEG_QUALITY: u8 = 90;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    WebP,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Formats without an alpha channel get flattened over white.
    pub fn supports_transparency(&self) -> bool {
        !matches!(self, Self::Jpeg)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::WebP),
            "bmp" => Ok(Self::Bmp),
            "tiff" | "tif" => Ok(Self::Tiff),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where the encoded image goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` and `-` mean standard output.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Self::File(p.to_path_buf()),
            _ => Self::Stdout,
        }
    }
}

/// Straight RGBA to RGB, composited over white.
fn flatten_over_white(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.as_raw().len() / 4 * 3);
    for p in image.pixels() {
        let [r, g, b, a] = p.0;
        let a = u32::from(a);
        for c in [r, g, b] {
            let v = (u32::from(c) * a + 255 * (255 - a) + 127) / 255;
            rgb.push(v as u8);
        }
    }
    rgb
}

/// Encode `image` in `format` into `writer`.
pub fn encode<W: Write>(image: &RgbaImage, format: OutputFormat, mut writer: W) -> Result<()> {
    let (width, height) = image.dimensions();
    let flattened;
    let (data, color) = if format.supports_transparency() {
        (image.as_raw().as_slice(), ColorType::Rgba8)
    } else {
        flattened = flatten_over_white(image);
        (flattened.as_slice(), ColorType::Rgb8)
    };

    match format {
        OutputFormat::Png => PngEncoder::new(writer).write_image(data, width, height, color)?,
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(writer, JPEG_QUALITY)
            .write_image(data, width, height, color)?,
        OutputFormat::WebP => {
            WebPEncoder::new_lossless(writer).write_image(data, width, height, color)?
        }
        OutputFormat::Bmp => {
            BmpEncoder::new(&mut writer).write_image(data, width, height, color)?
        }
        OutputFormat::Tiff => {
            // TIFF needs to seek back to patch offsets
            let mut buffer = Cursor::new(Vec::new());
            TiffEncoder::new(&mut buffer).write_image(data, width, height, color)?;
            writer
                .write_all(buffer.get_ref())
                .map_err(|e| Error::io("cannot write output", "-", e))?;
        }
    }
    Ok(())
}

/// Encode `image` and deliver it to `target`.
pub fn write_image(image: &RgbaImage, format: OutputFormat, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = std::io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            encode(image, format, &mut writer)?;
            writer
                .flush()
                .map_err(|e| Error::io("cannot write output", "-", e))?;
        }
        OutputTarget::File(path) => write_file_atomic(image, format, path)?,
    }
    tracing::info!(
        format = %format,
        width = image.width(),
        height = image.height(),
        "image written"
    );
    Ok(())
}

fn write_file_atomic(image: &RgbaImage, format: OutputFormat, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::io("cannot open output file", path, e))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        encode(image, format, &mut writer)?;
        writer
            .flush()
            .map_err(|e| Error::io("cannot write output file", path, e))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| Error::io("cannot write output file", path, e))?;
    }

    temp.persist(path)
        .map_err(|e| Error::io("cannot write output file", path, e.error))?;
    Ok(())
}
