//! Watermark text engine.
//!
//! Turns `directive:text` lines into sized, measured lines, lays them out as
//! one block centered on the canvas, and draws the block rotated about the
//! canvas center.
//!
//! # Line format
//!
//! ```text
//! # comment lines are skipped
//! HELLO            default size (12)
//! 24:WORLD         fixed point size
//! w200:FIT         scaled so the ink is 200 px wide
//! w50%:HALF        scaled to half the canvas width
//! ```
//!
//! # Rotation
//!
//! - `none` (default), or signed degrees such as `-30`
//! - `ldiag` / `rdiag`: along the canvas diagonal
//!
//! Orientation (`portrait` / `landscape`) turns the finished image a quarter
//! turn when the canvas aspect ratio is on the wrong side of a threshold.

pub mod compositor;
pub mod directive;
pub mod input;
pub mod layout;
pub mod line;
pub mod orientation;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{text_transform, Compositor, TextStyle};
pub use directive::{parse_directive, SizeDirective};
pub use input::{read_lines, LineSpec};
pub use layout::{layout, tight_height, LineOrigin};
pub use line::{measure, Line};
pub use orientation::{
    resolve_orientation, resolve_rotation, FinalRotation, Orientation, OrientationThresholds,
    TextRotation,
};
pub use processor::{RenderOptions, WatermarkProcessor};
pub use text_renderer::{
    parse_hex_color, Color, FontExtents, TextExtents, TextMeasurer, Typesetter,
};
