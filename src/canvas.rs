//! Drawing surface shared by every image source.
//!
//! Pixels live in a premultiplied `tiny_skia::Pixmap`; conversion to and
//! from straight-alpha `image::RgbaImage` happens at the edges.

use crate::error::{Error, Result};
use crate::watermark::text_renderer::Color;
use image::{Rgba, RgbaImage};
use tiny_skia::{BlendMode, ColorU8, Paint, Pixmap, Rect, Transform};

/// Target surface for watermark text.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Fully transparent canvas.
    ///
    /// Fails with `InvalidGeometry` for zero dimensions or a surface too
    /// large to allocate.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| Error::InvalidGeometry(format!("{}x{}", width, height)))?;
        Ok(Self { pixmap })
    }

    /// Canvas filled with one opaque color.
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut canvas = Self::blank(width, height)?;
        canvas.pixmap.fill(color.to_skia());
        Ok(canvas)
    }

    /// Canvas holding a copy of decoded raster pixels.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        let mut canvas = Self::blank(image.width(), image.height())?;
        for (dst, src) in canvas.pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width()) / f64::from(self.height())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Composite `color` underneath the existing pixels, so transparent
    /// regions take that color and opaque ones keep theirs.
    pub fn paint_behind(&mut self, color: Color) {
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
        else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(color.to_skia());
        paint.blend_mode = BlendMode::DestinationOver;
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Straight-alpha copy of the canvas.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width(), self.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }
}
