//! Draws laid-out lines onto a canvas.
//!
//! The drawing frame has its origin at the canvas center and is rotated by
//! the text rotation angle; layout origins are shifted into that frame
//! before drawing. A zero angle adds no rotation at all, so it renders the
//! same pixels as no rotation.

use super::layout::LineOrigin;
use super::line::Line;
use super::text_renderer::{Color, Typesetter};
use crate::canvas::Canvas;
use tiny_skia::{FillRule, Paint, Transform};

/// Paint settings for watermark text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    pub antialias: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Color::black(),
            antialias: false,
        }
    }
}

/// Canvas-center frame rotated by `angle` radians.
pub fn text_transform(canvas_width: u32, canvas_height: u32, angle: f64) -> Transform {
    let cx = canvas_width as f32 / 2.0;
    let cy = canvas_height as f32 / 2.0;
    let frame = Transform::from_translate(cx, cy);
    if angle == 0.0 {
        frame
    } else {
        frame.pre_rotate(angle.to_degrees() as f32)
    }
}

/// Fills glyph outlines of measured lines onto a canvas.
#[derive(Debug)]
pub struct Compositor<'a> {
    typesetter: &'a Typesetter,
    style: TextStyle,
}

impl<'a> Compositor<'a> {
    pub fn new(typesetter: &'a Typesetter, style: TextStyle) -> Self {
        Self { typesetter, style }
    }

    /// Draw each line at its origin, rotated about the canvas center.
    ///
    /// Returns the number of lines that produced ink.
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        lines: &[Line],
        origins: &[LineOrigin],
        angle: f64,
    ) -> usize {
        let cx = f64::from(canvas.width()) / 2.0;
        let cy = f64::from(canvas.height()) / 2.0;
        let transform = text_transform(canvas.width(), canvas.height(), angle);

        let mut paint = Paint::default();
        paint.set_color(self.style.color.to_skia());
        paint.anti_alias = self.style.antialias;

        let mut drawn = 0;
        for (line, origin) in lines.iter().zip(origins) {
            let Some(path) = self.typesetter.text_path(
                &line.text,
                line.point_size,
                origin.x - cx,
                origin.y - cy,
            ) else {
                continue;
            };
            canvas
                .pixmap_mut()
                .fill_path(&path, &paint, FillRule::Winding, transform, None);
            drawn += 1;
        }
        tracing::debug!(lines = drawn, angle, "lines drawn");
        drawn
    }
}
