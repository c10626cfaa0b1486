//! Vertical block layout.
//!
//! Lines stack baseline to baseline using font ascent and descent. The
//! block is then trimmed to ink at both ends: the first line contributes
//! only from its ink top, the last only down to its ink bottom. That tight
//! block is centered on the canvas, and each line is centered horizontally
//! on its own ink box.
//!
//! ```text
//!        ascent ┬ ─ ─ ─ ─ ─ ─ ─   <- font box top of first line
//!               │  ┌────────┐    <- ink top (y_bearing)
//!               │  │ HELLO  │
//!      baseline ┼──┴────────┴─
//!       descent ┴ ─ ─ ─ ─ ─ ─ ─
//! ```

use super::line::Line;

/// Draw origin (pen position on the baseline) of one line, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOrigin {
    pub x: f64,
    pub y: f64,
}

/// Height of the block from the first line's ink top to the last line's
/// ink bottom.
pub fn tight_height(lines: &[Line]) -> f64 {
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return 0.0;
    };
    let raw: f64 = lines
        .iter()
        .map(|l| l.font_extents.ascent + l.font_extents.descent)
        .sum();
    raw - first.font_extents.ascent - last.font_extents.descent - first.extents.y_bearing
        + last.extents.height
        + last.extents.y_bearing
}

/// Compute one draw origin per line, in order.
///
/// An empty slice yields an empty layout.
pub fn layout(lines: &[Line], canvas_width: u32, canvas_height: u32) -> Vec<LineOrigin> {
    let Some(first) = lines.first() else {
        return Vec::new();
    };
    let width = f64::from(canvas_width);
    let height = f64::from(canvas_height);

    let tight = tight_height(lines);
    let mut y =
        (height - tight) / 2.0 - (first.font_extents.ascent + first.extents.y_bearing);
    tracing::debug!(tight_height = tight, start_y = y, lines = lines.len(), "block layout");

    let mut origins = Vec::with_capacity(lines.len());
    for line in lines {
        y += line.font_extents.ascent;
        let x = (width - line.extents.width) / 2.0 - line.extents.x_bearing;
        origins.push(LineOrigin { x, y });
        y += line.font_extents.descent;
    }
    origins
}
