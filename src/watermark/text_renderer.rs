//! Text measurement and glyph outlines.
//!
//! Metrics follow the usual toy-text conventions: the point size is the em
//! size in canvas pixels, the y axis points down, and extents describe the
//! ink box relative to the pen origin on the baseline (so `y_bearing` is
//! negative for ink above the baseline).
//!
//! # Features
//!
//! - Hex color parsing (#RGB and #RRGGBB formats)
//! - Font-level ascent/descent and per-string ink extents
//! - Glyph outlines as `tiny_skia` paths, ready to fill under any transform
//! - Embedded default font, replaceable with any TrueType/OpenType file
//!
//! # Example
//!
//! ```ignore
//! use textmark::watermark::text_renderer::{TextMeasurer, Typesetter};
//!
//! let typesetter = Typesetter::embedded().unwrap();
//! let extents = typesetter.text_extents("Copyright 2025", 24.0);
//! assert!(extents.width > 0.0);
//! ```

use crate::error::{Error, Result};
use ab_glyph::{Font, FontArc, GlyphId, Outline, OutlineCurve};
use std::path::Path;
use tiny_skia::{Path as SkPath, PathBuilder};

/// Embedded font data (DejaVu Sans Mono Bold, a free stand-in for Courier Bold).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSansMono-Bold.ttf");

/// Parsed RGB color from hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// White color.
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Black color.
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Opaque paint color.
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

fn hex_digits(hex: &str) -> Result<u8> {
    u8::from_str_radix(hex, 16).map_err(|_| Error::Config(format!("invalid hex digit in '{}'", hex)))
}

/// Parse a hex color string into RGB components.
///
/// Supports both #RGB and #RRGGBB formats.
///
/// # Examples
///
/// ```ignore
/// let white = parse_hex_color("#FFF").unwrap();
/// assert_eq!(white, Color::new(255, 255, 255));
///
/// let red = parse_hex_color("#FF0000").unwrap();
/// assert_eq!(red, Color::new(255, 0, 0));
/// ```
pub fn parse_hex_color(hex: &str) -> Result<Color> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| Error::Config(format!("color '{}' must start with '#'", hex)))?;
    if !digits.is_ascii() {
        return Err(Error::Config(format!("invalid color '{}'", hex)));
    }

    match digits.len() {
        3 => {
            // #RGB: each digit doubled, 0xF -> 0xFF
            let r = hex_digits(&digits[0..1])?;
            let g = hex_digits(&digits[1..2])?;
            let b = hex_digits(&digits[2..3])?;
            Ok(Color::new(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = hex_digits(&digits[0..2])?;
            let g = hex_digits(&digits[2..4])?;
            let b = hex_digits(&digits[4..6])?;
            Ok(Color::new(r, g, b))
        }
        n => Err(Error::Config(format!(
            "color must be #RGB or #RRGGBB format, got {} digits",
            n
        ))),
    }
}

/// Font-level vertical metrics at a given size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontExtents {
    /// Distance above the baseline, positive
    pub ascent: f64,
    /// Distance below the baseline, positive
    pub descent: f64,
}

/// Ink box of a string at a given size, relative to the pen origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtents {
    pub x_bearing: f64,
    pub y_bearing: f64,
    pub width: f64,
    pub height: f64,
    pub x_advance: f64,
}

/// Source of font and text metrics.
///
/// Sizing and layout only need metrics, so they take this trait rather
/// than a concrete font.
pub trait TextMeasurer {
    fn font_extents(&self, point_size: f64) -> FontExtents;
    fn text_extents(&self, text: &str, point_size: f64) -> TextExtents;
}

/// Measures and outlines text with a single font face.
#[derive(Clone)]
pub struct Typesetter {
    font: FontArc,
}

impl std::fmt::Debug for Typesetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typesetter")
            .field("units_per_em", &self.units_per_em())
            .finish()
    }
}

impl Typesetter {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    /// Typesetter using the font compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT_DATA)
            .map_err(|e| Error::Font(format!("embedded font: {}", e)))?;
        Ok(Self::new(font))
    }

    /// Typesetter using a TrueType/OpenType file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| Error::io("cannot open font file", path, e))?;
        let font = FontArc::try_from_vec(data)
            .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(font))
    }

    /// Font file if given, otherwise the embedded font.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn units_per_em(&self) -> f32 {
        self.font.units_per_em().unwrap_or(1000.0)
    }

    fn scale(&self, point_size: f64) -> f64 {
        point_size / f64::from(self.units_per_em())
    }

    /// Glyphs of `text` with their pen positions in font units, plus the
    /// total advance.
    pub fn positioned_glyphs(&self, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
        let mut glyphs = Vec::with_capacity(text.len());
        let mut pen = 0.0f32;
        let mut prev: Option<GlyphId> = None;

        for c in text.chars() {
            let id = self.font.glyph_id(c);
            if let Some(prev) = prev {
                pen += self.font.kern_unscaled(prev, id);
            }
            glyphs.push((id, pen));
            pen += self.font.h_advance_unscaled(id);
            prev = Some(id);
        }

        (glyphs, pen)
    }

    /// Outline of `text` with its baseline origin at `(x, y)` in canvas pixels.
    ///
    /// Returns `None` when the text has no ink (empty or whitespace only).
    pub fn text_path(&self, text: &str, point_size: f64, x: f64, y: f64) -> Option<SkPath> {
        let k = self.scale(point_size) as f32;
        let mut builder = GlyphPathBuilder::new(x as f32, y as f32, k, -k);
        let (glyphs, _) = self.positioned_glyphs(text);
        for (id, pen) in glyphs {
            if let Some(outline) = self.font.outline(id) {
                builder.append(&outline, pen);
            }
        }
        builder.finish()
    }
}

impl TextMeasurer for Typesetter {
    fn font_extents(&self, point_size: f64) -> FontExtents {
        let k = self.scale(point_size);
        FontExtents {
            ascent: f64::from(self.font.ascent_unscaled()) * k,
            descent: -f64::from(self.font.descent_unscaled()) * k,
        }
    }

    fn text_extents(&self, text: &str, point_size: f64) -> TextExtents {
        let k = self.scale(point_size);
        let (glyphs, advance) = self.positioned_glyphs(text);

        // (left, top, right, bottom) in y-down font units
        let mut ink: Option<(f32, f32, f32, f32)> = None;
        for (id, pen) in glyphs {
            let Some(outline) = self.font.outline(id) else {
                continue;
            };
            if outline.curves.is_empty() {
                continue;
            }
            let b = outline.bounds;
            let left = pen + b.min.x.min(b.max.x);
            let right = pen + b.min.x.max(b.max.x);
            let top = -b.min.y.max(b.max.y);
            let bottom = -b.min.y.min(b.max.y);
            ink = Some(match ink {
                None => (left, top, right, bottom),
                Some((l, t, r, bt)) => (l.min(left), t.min(top), r.max(right), bt.max(bottom)),
            });
        }

        let x_advance = f64::from(advance) * k;
        match ink {
            None => TextExtents {
                x_advance,
                ..TextExtents::default()
            },
            Some((left, top, right, bottom)) => TextExtents {
                x_bearing: f64::from(left) * k,
                y_bearing: f64::from(top) * k,
                width: f64::from(right - left) * k,
                height: f64::from(bottom - top) * k,
                x_advance,
            },
        }
    }
}

/// Converts glyph outline curves into a `tiny_skia` path.
///
/// Points are mapped as `origin + (p + pen) * scale`, so a negative
/// `scale_y` flips font units (y up) into canvas space (y down).
pub(crate) struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale_x: f32,
    scale_y: f32,
    last: Option<(f32, f32)>,
}

impl GlyphPathBuilder {
    pub(crate) fn new(origin_x: f32, origin_y: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale_x,
            scale_y,
            last: None,
        }
    }

    fn map(&self, p: ab_glyph::Point, pen: f32) -> (f32, f32) {
        (
            self.origin_x + (p.x + pen) * self.scale_x,
            self.origin_y + p.y * self.scale_y,
        )
    }

    fn close_contour(&mut self) {
        if self.last.take().is_some() {
            self.builder.close();
        }
    }

    fn start_at(&mut self, p: ab_glyph::Point, pen: f32) {
        let at = (p.x, p.y);
        if self.last == Some(at) {
            return;
        }
        self.close_contour();
        let (x, y) = self.map(p, pen);
        self.builder.move_to(x, y);
    }

    /// Append one glyph whose origin sits `pen` font units along the baseline.
    pub(crate) fn append(&mut self, outline: &Outline, pen: f32) {
        self.close_contour();
        for curve in &outline.curves {
            match *curve {
                OutlineCurve::Line(p0, p1) => {
                    self.start_at(p0, pen);
                    let (x, y) = self.map(p1, pen);
                    self.builder.line_to(x, y);
                    self.last = Some((p1.x, p1.y));
                }
                OutlineCurve::Quad(p0, p1, p2) => {
                    self.start_at(p0, pen);
                    let (x1, y1) = self.map(p1, pen);
                    let (x, y) = self.map(p2, pen);
                    self.builder.quad_to(x1, y1, x, y);
                    self.last = Some((p2.x, p2.y));
                }
                OutlineCurve::Cubic(p0, p1, p2, p3) => {
                    self.start_at(p0, pen);
                    let (x1, y1) = self.map(p1, pen);
                    let (x2, y2) = self.map(p2, pen);
                    let (x, y) = self.map(p3, pen);
                    self.builder.cubic_to(x1, y1, x2, y2, x, y);
                    self.last = Some((p3.x, p3.y));
                }
            }
        }
        self.close_contour();
    }

    pub(crate) fn finish(self) -> Option<SkPath> {
        self.builder.finish()
    }
}
