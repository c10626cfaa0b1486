// Constants module - centralized default values for rendering
//
// This module defines all default values used throughout the codebase.
// Named constants replace magic numbers and are the single place to look
// when a default has to change; most of them can be overridden from the
// configuration file or the command line.

// =============================================================================
// Text sizing defaults
// =============================================================================

/// Point size used for lines without a size directive
pub const DEFAULT_POINT_SIZE: f64 = 12.0;

/// Reference size used to measure a line before fit-width scaling
pub const PROBE_POINT_SIZE: f64 = 1000.0;

/// Default text color
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

// =============================================================================
// Source defaults
// =============================================================================

/// Resolution used when rasterizing the first page of a PDF
pub const DEFAULT_PDF_DPI: u32 = 600;

/// PDF user space unit (points per inch)
pub const PDF_POINTS_PER_INCH: f32 = 72.0;

/// Page size used when a PDF page carries no MediaBox (US Letter, in points)
pub const DEFAULT_PDF_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Largest decoded image XObject, in bytes of RGBA output
pub const MAX_PDF_IMAGE_BYTES: u64 = 512 * 1024 * 1024;

// =============================================================================
// Orientation defaults
// =============================================================================

/// Aspect ratio (width / height) above which "portrait" rotates the output
pub const DEFAULT_PORTRAIT_THRESHOLD: f64 = 1.05;

/// Aspect ratio (width / height) below which "landscape" rotates the output
pub const DEFAULT_LANDSCAPE_THRESHOLD: f64 = 0.95;

// =============================================================================
// Logging defaults
// =============================================================================

/// Verbosity when neither -v nor -q is given (warnings and errors)
pub const DEFAULT_VERBOSITY: u8 = 2;
