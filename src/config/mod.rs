//! Render configuration.
//!
//! An optional YAML file supplies defaults for everything the command line
//! can set; flags given on the command line win. `${VAR}` references are
//! replaced with environment variables before parsing.
//!
//! ```yaml
//! font: /usr/share/fonts/truetype/courier-bold.ttf
//! color: "#202020"
//! antialias: true
//! pdf_dpi: 300
//! format: png
//! orientation: portrait
//! log_format: json
//! log_file: ${HOME}/textmark.log
//! ```

use crate::constants::{
    DEFAULT_LANDSCAPE_THRESHOLD, DEFAULT_PDF_DPI, DEFAULT_PORTRAIT_THRESHOLD, DEFAULT_TEXT_COLOR,
};
use crate::encoder::OutputFormat;
use crate::error::{Error, Result};
use crate::logging::LogFormat;
use crate::watermark::orientation::OrientationThresholds;
use crate::watermark::text_renderer::{parse_hex_color, Color};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_color() -> String {
    DEFAULT_TEXT_COLOR.to_string()
}

fn default_pdf_dpi() -> u32 {
    DEFAULT_PDF_DPI
}

fn default_portrait_threshold() -> f64 {
    DEFAULT_PORTRAIT_THRESHOLD
}

fn default_landscape_threshold() -> f64 {
    DEFAULT_LANDSCAPE_THRESHOLD
}

fn default_none() -> String {
    "none".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// TrueType/OpenType font file (default: embedded font)
    #[serde(default)]
    pub font: Option<PathBuf>,

    /// Antialiased glyph edges (default: false, hard 1-bit edges)
    #[serde(default)]
    pub antialias: bool,

    /// Text color as #RGB or #RRGGBB
    #[serde(default = "default_color")]
    pub color: String,

    /// Fill for blank WIDTHxHEIGHT canvases (default: transparent)
    #[serde(default)]
    pub background: Option<String>,

    /// Resolution for PDF page rasterization
    #[serde(default = "default_pdf_dpi")]
    pub pdf_dpi: u32,

    /// "portrait" rotates the output above this aspect ratio
    #[serde(default = "default_portrait_threshold")]
    pub portrait_threshold: f64,

    /// "landscape" rotates the output below this aspect ratio
    #[serde(default = "default_landscape_threshold")]
    pub landscape_threshold: f64,

    #[serde(default)]
    pub format: OutputFormat,

    /// Text rotation: none, ldiag, rdiag or signed degrees
    #[serde(default = "default_none")]
    pub rotate: String,

    /// Output orientation: none, portrait or landscape
    #[serde(default = "default_none")]
    pub orientation: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log file (default: standard error)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: None,
            antialias: false,
            color: default_color(),
            background: None,
            pdf_dpi: default_pdf_dpi(),
            portrait_threshold: default_portrait_threshold(),
            landscape_threshold: default_landscape_threshold(),
            format: OutputFormat::default(),
            rotate: default_none(),
            orientation: default_none(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

impl RenderConfig {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| Error::Config(e.to_string()))?;

        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if std::env::var(var_name).is_err() {
                return Err(Error::Config(format!(
                    "environment variable '{}' is referenced but not set",
                    var_name
                )));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty file means "all defaults"
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::io("cannot read config file", path, e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pdf_dpi == 0 {
            return Err(Error::Config("pdf_dpi must be greater than 0".to_string()));
        }

        for (name, value) in [
            ("portrait_threshold", self.portrait_threshold),
            ("landscape_threshold", self.landscape_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.landscape_threshold > self.portrait_threshold {
            return Err(Error::Config(format!(
                "landscape_threshold ({}) must not exceed portrait_threshold ({})",
                self.landscape_threshold, self.portrait_threshold
            )));
        }

        self.text_color()?;
        self.background_color()?;
        Ok(())
    }

    pub fn text_color(&self) -> Result<Color> {
        parse_hex_color(&self.color)
    }

    pub fn background_color(&self) -> Result<Option<Color>> {
        self.background.as_deref().map(parse_hex_color).transpose()
    }

    pub fn thresholds(&self) -> OrientationThresholds {
        OrientationThresholds {
            portrait: self.portrait_threshold,
            landscape: self.landscape_threshold,
        }
    }
}
