//! Per-line size directives.
//!
//! | directive | point size                                          |
//! |-----------|-----------------------------------------------------|
//! | (empty)   | 12                                                  |
//! | `N`       | N                                                   |
//! | `wN`      | chosen so the ink is N canvas pixels wide           |
//! | `wN%`     | chosen so the ink is N percent of the canvas width  |
//!
//! Fit-width directives measure the line once at a large probe size and
//! scale from there; ink width is linear in the point size.

use super::text_renderer::TextMeasurer;
use crate::constants::{DEFAULT_POINT_SIZE, PROBE_POINT_SIZE};
use crate::error::{Error, Result};
use std::str::FromStr;

/// A parsed size directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeDirective {
    Default,
    Fixed(u32),
    FitWidth(u32),
    FitPercent(u32),
}

/// Strictly positive decimal digits, nothing else.
fn parse_positive(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|v| *v > 0)
}

impl FromStr for SizeDirective {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || Error::InvalidDirective {
            directive: s.to_string(),
        };

        if s.is_empty() {
            return Ok(Self::Default);
        }

        if let Some(rest) = s.strip_prefix('w') {
            return match rest.strip_suffix('%') {
                Some(digits) => parse_positive(digits).map(Self::FitPercent),
                None => parse_positive(rest).map(Self::FitWidth),
            }
            .ok_or_else(invalid);
        }

        parse_positive(s).map(Self::Fixed).ok_or_else(invalid)
    }
}

impl SizeDirective {
    /// Target ink width in canvas pixels, for fit-width directives.
    pub fn target_width(self, canvas_width: u32) -> Option<f64> {
        match self {
            Self::FitWidth(px) => Some(f64::from(px)),
            Self::FitPercent(pct) => Some(f64::from(pct) / 100.0 * f64::from(canvas_width)),
            Self::Default | Self::Fixed(_) => None,
        }
    }

    /// Resolve to a concrete point size for `text`.
    pub fn resolve<M>(self, text: &str, canvas_width: u32, measurer: &M) -> Result<f64>
    where
        M: TextMeasurer + ?Sized,
    {
        match self {
            Self::Default => Ok(DEFAULT_POINT_SIZE),
            Self::Fixed(size) => Ok(f64::from(size)),
            Self::FitWidth(_) | Self::FitPercent(_) => {
                let target = self.target_width(canvas_width).unwrap_or_default();
                fit_to_width(text, target, measurer)
            }
        }
    }
}

fn fit_to_width<M>(text: &str, target: f64, measurer: &M) -> Result<f64>
where
    M: TextMeasurer + ?Sized,
{
    let probe_width = measurer.text_extents(text, PROBE_POINT_SIZE).width;
    if probe_width <= 0.0 || !probe_width.is_finite() {
        return Err(Error::UnmeasurableText {
            text: text.to_string(),
        });
    }
    let size = PROBE_POINT_SIZE * (target / probe_width);
    tracing::debug!(text, target, probe_width, point_size = size, "fit-width size");
    Ok(size)
}

/// Parse `directive` and resolve it to a point size for `line_text`.
pub fn parse_directive<M>(
    directive: &str,
    line_text: &str,
    canvas_width: u32,
    measurer: &M,
) -> Result<f64>
where
    M: TextMeasurer + ?Sized,
{
    directive
        .parse::<SizeDirective>()?
        .resolve(line_text, canvas_width, measurer)
}
