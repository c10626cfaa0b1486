// textmark: watermark text renderer library

pub mod canvas;
pub mod config;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod logging;
pub mod source;
pub mod watermark;

pub use error::{Error, Result};
