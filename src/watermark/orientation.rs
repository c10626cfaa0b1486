//! Text rotation and final output orientation.
//!
//! Two independent decisions, both driven by the canvas aspect ratio
//! (width / height):
//!
//! - **Text rotation** turns the text block about the canvas center.
//!   `ldiag` and `rdiag` follow the canvas diagonal.
//! - **Orientation** optionally turns the finished raster a quarter turn so
//!   a landscape canvas comes out portrait or vice versa. Near-square
//!   canvases are left alone.
//!
//! Unknown specs are not fatal; they log a warning and fall back to no
//! rotation.

use crate::constants::{DEFAULT_LANDSCAPE_THRESHOLD, DEFAULT_PORTRAIT_THRESHOLD};
use std::str::FromStr;

/// Parsed text rotation spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRotation {
    None,
    Degrees(i32),
    LeftDiagonal,
    RightDiagonal,
}

impl FromStr for TextRotation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "ldiag" => Ok(Self::LeftDiagonal),
            "rdiag" => Ok(Self::RightDiagonal),
            _ => s.parse::<i32>().map(Self::Degrees).map_err(|_| ()),
        }
    }
}

impl TextRotation {
    /// Rotation angle in radians for a canvas of the given aspect ratio.
    pub fn angle(self, aspect_ratio: f64) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Degrees(deg) => f64::from(deg).to_radians(),
            Self::LeftDiagonal => -(1.0 / aspect_ratio).atan(),
            Self::RightDiagonal => (1.0 / aspect_ratio).atan(),
        }
    }
}

/// Resolve a rotation spec to radians, warning on unknown specs.
pub fn resolve_rotation(spec: &str, aspect_ratio: f64) -> f64 {
    match spec.parse::<TextRotation>() {
        Ok(rotation) => rotation.angle(aspect_ratio),
        Err(()) => {
            tracing::warn!(spec, "unknown rotation, not rotating text");
            0.0
        }
    }
}

/// Desired output orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    None,
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(()),
        }
    }
}

/// Raster-level rotation applied after drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalRotation {
    None,
    /// 90 degrees clockwise
    Quarter,
}

/// Aspect ratio band inside which orientation never rotates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationThresholds {
    /// "portrait" rotates above this ratio
    pub portrait: f64,
    /// "landscape" rotates below this ratio
    pub landscape: f64,
}

impl Default for OrientationThresholds {
    fn default() -> Self {
        Self {
            portrait: DEFAULT_PORTRAIT_THRESHOLD,
            landscape: DEFAULT_LANDSCAPE_THRESHOLD,
        }
    }
}

impl Orientation {
    pub fn final_rotation(self, aspect_ratio: f64, thresholds: OrientationThresholds) -> FinalRotation {
        let rotate = match self {
            Self::None => false,
            Self::Portrait => aspect_ratio > thresholds.portrait,
            Self::Landscape => aspect_ratio < thresholds.landscape,
        };
        if rotate {
            FinalRotation::Quarter
        } else {
            FinalRotation::None
        }
    }
}

/// Resolve an orientation spec, warning on unknown specs.
pub fn resolve_orientation(
    spec: &str,
    aspect_ratio: f64,
    thresholds: OrientationThresholds,
) -> FinalRotation {
    match spec.parse::<Orientation>() {
        Ok(orientation) => orientation.final_rotation(aspect_ratio, thresholds),
        Err(()) => {
            tracing::warn!(spec, "unknown orientation, not reorienting output");
            FinalRotation::None
        }
    }
}
