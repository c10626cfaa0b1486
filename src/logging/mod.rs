// Logging module for structured logging using the tracing crate
//
// Verbosity and destination are carried by a `LogContext` value built once
// per invocation. Installing it yields a guard; the subscriber stays active
// for as long as the guard lives and nothing is registered globally.

use crate::constants::DEFAULT_VERBOSITY;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Where log events are written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogDestination {
    #[default]
    Stderr,
    /// Appended to, created if missing
    File(PathBuf),
}

/// How log events are formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line text without timestamps
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Invocation-scoped logging settings.
///
/// Verbosity levels:
///
/// | value | events shown          |
/// |-------|-----------------------|
/// | 0     | none (quiet)          |
/// | 1     | errors                |
/// | 2     | warnings (default)    |
/// | 3     | info                  |
/// | 4     | debug                 |
/// | 5+    | trace                 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub verbosity: u8,
    pub destination: LogDestination,
    pub format: LogFormat,
}

impl Default for LogContext {
    fn default() -> Self {
        Self {
            verbosity: DEFAULT_VERBOSITY,
            destination: LogDestination::Stderr,
            format: LogFormat::Text,
        }
    }
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise verbosity by one level.
    pub fn bump_verbosity(&mut self) {
        self.verbosity = self.verbosity.saturating_add(1);
    }

    /// Suppress all log output.
    pub fn quiet(&mut self) {
        self.verbosity = 0;
    }

    pub fn with_destination(mut self, destination: LogDestination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Maximum level passed through to the writer.
    pub fn level_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn make_writer(&self) -> Result<BoxMakeWriter> {
        match &self.destination {
            LogDestination::Stderr => Ok(BoxMakeWriter::new(std::io::stderr)),
            LogDestination::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| Error::io("cannot open log file", path, e))?;
                Ok(BoxMakeWriter::new(Mutex::new(file)))
            }
        }
    }

    /// Install this context as the current thread's subscriber.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the log file cannot be opened.
    ///
    /// # Examples
    ///
    /// ```
    /// use textmark::logging::LogContext;
    ///
    /// let mut context = LogContext::new();
    /// context.bump_verbosity();
    /// let _guard = context.install().expect("stderr logging");
    /// tracing::info!("rendering started");
    /// ```
    pub fn install(&self) -> Result<DefaultGuard> {
        let builder = tracing_subscriber::fmt()
            .with_writer(self.make_writer()?)
            .with_max_level(self.level_filter())
            .with_target(false)
            .with_ansi(false)
            .without_time();

        let guard = match self.format {
            LogFormat::Text => tracing::subscriber::set_default(builder.compact().finish()),
            LogFormat::Json => tracing::subscriber::set_default(builder.json().finish()),
        };
        Ok(guard)
    }
}
