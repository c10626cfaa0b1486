//! Watermark processor: text lines in, finished raster out.
//!
//! # Pipeline
//!
//! 1. read line specs from the input stream
//! 2. resolve each size directive and measure the line
//! 3. lay the block out centered on the canvas
//! 4. draw it rotated about the canvas center
//! 5. apply the orientation quarter turn, if any
//!
//! The first invalid directive aborts the run before anything is drawn.
//!
//! # Example
//!
//! ```ignore
//! use textmark::watermark::{RenderOptions, Typesetter, WatermarkProcessor};
//!
//! let typesetter = Typesetter::embedded()?;
//! let processor = WatermarkProcessor::new(&typesetter, RenderOptions::default());
//! let image = processor.render(canvas, "w80%:DRAFT\n".as_bytes())?;
//! ```

use super::compositor::{Compositor, TextStyle};
use super::input::{read_lines, LineSpec};
use super::layout::layout;
use super::line::Line;
use super::orientation::{
    resolve_orientation, resolve_rotation, FinalRotation, OrientationThresholds,
};
use super::text_renderer::Typesetter;
use crate::canvas::Canvas;
use crate::error::Result;
use image::{imageops, RgbaImage};
use std::io::BufRead;

/// Per-invocation rendering choices.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Text rotation spec: `none`, `ldiag`, `rdiag` or signed degrees
    pub rotate: String,
    /// Output orientation spec: `none`, `portrait` or `landscape`
    pub orientation: String,
    pub thresholds: OrientationThresholds,
    pub style: TextStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            rotate: "none".to_string(),
            orientation: "none".to_string(),
            thresholds: OrientationThresholds::default(),
            style: TextStyle::default(),
        }
    }
}

/// Renders watermark text onto canvases.
#[derive(Debug)]
pub struct WatermarkProcessor<'a> {
    typesetter: &'a Typesetter,
    options: RenderOptions,
}

impl<'a> WatermarkProcessor<'a> {
    pub fn new(typesetter: &'a Typesetter, options: RenderOptions) -> Self {
        Self {
            typesetter,
            options,
        }
    }

    /// Read line specs from `reader` and render them onto `canvas`.
    pub fn render<R: BufRead>(&self, canvas: Canvas, reader: R) -> Result<Option<RgbaImage>> {
        let specs = read_lines(reader)?;
        self.render_specs(canvas, specs)
    }

    /// Render already-parsed line specs onto `canvas`.
    ///
    /// Returns `Ok(None)` when there are no lines; nothing is drawn then.
    pub fn render_specs(
        &self,
        mut canvas: Canvas,
        specs: Vec<LineSpec>,
    ) -> Result<Option<RgbaImage>> {
        let lines = Line::measure_all(specs, canvas.width(), self.typesetter)?;
        let origins = layout(&lines, canvas.width(), canvas.height());
        if origins.is_empty() {
            tracing::info!("no watermark lines, nothing to render");
            return Ok(None);
        }

        let aspect = canvas.aspect_ratio();
        let angle = resolve_rotation(&self.options.rotate, aspect);
        Compositor::new(self.typesetter, self.options.style).draw(
            &mut canvas,
            &lines,
            &origins,
            angle,
        );

        let image = canvas.to_rgba();
        let image = match resolve_orientation(
            &self.options.orientation,
            aspect,
            self.options.thresholds,
        ) {
            FinalRotation::Quarter => {
                tracing::debug!(aspect, "rotating output a quarter turn");
                imageops::rotate90(&image)
            }
            FinalRotation::None => image,
        };

        tracing::info!(
            lines = lines.len(),
            width = image.width(),
            height = image.height(),
            "watermark rendered"
        );
        Ok(Some(image))
    }
}
