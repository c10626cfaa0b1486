//! Measured watermark lines.

use super::directive::parse_directive;
use super::input::LineSpec;
use super::text_renderer::{FontExtents, TextExtents, TextMeasurer};
use crate::error::Result;

/// Font and ink metrics of `text` at `point_size`.
///
/// Probing and final measurement must go through the same measurer.
pub fn measure<M>(text: &str, point_size: f64, measurer: &M) -> (FontExtents, TextExtents)
where
    M: TextMeasurer + ?Sized,
{
    (
        measurer.font_extents(point_size),
        measurer.text_extents(text, point_size),
    )
}

/// One watermark line with its resolved size and metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub directive: String,
    pub point_size: f64,
    pub font_extents: FontExtents,
    pub extents: TextExtents,
}

impl Line {
    /// Resolve the directive of `spec` and measure the text at that size.
    pub fn measure<M>(spec: LineSpec, canvas_width: u32, measurer: &M) -> Result<Self>
    where
        M: TextMeasurer + ?Sized,
    {
        let point_size = parse_directive(&spec.directive, &spec.text, canvas_width, measurer)?;
        let (font_extents, extents) = measure(&spec.text, point_size, measurer);
        tracing::debug!(
            text = %spec.text,
            point_size,
            width = extents.width,
            height = extents.height,
            "measured line"
        );
        Ok(Self {
            text: spec.text,
            directive: spec.directive,
            point_size,
            font_extents,
            extents,
        })
    }

    /// Measure every spec in order; the first invalid directive aborts.
    pub fn measure_all<M>(specs: Vec<LineSpec>, canvas_width: u32, measurer: &M) -> Result<Vec<Self>>
    where
        M: TextMeasurer + ?Sized,
    {
        specs
            .into_iter()
            .map(|spec| Self::measure(spec, canvas_width, measurer))
            .collect()
    }
}
