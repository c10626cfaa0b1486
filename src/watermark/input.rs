//! Watermark text input.
//!
//! One line per watermark line. Lines starting with `#` are comments,
//! trailing whitespace is dropped, and an optional size directive precedes
//! the first `:`. Directives are checked even on lines whose text is empty.

use super::directive::SizeDirective;
use crate::error::{Error, Result};
use std::io::BufRead;

/// A raw input line split into directive and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    pub directive: String,
    pub text: String,
}

impl LineSpec {
    /// Split one input line, or `Ok(None)` for comments and lines without
    /// text.
    ///
    /// A malformed directive is an error whether or not text follows it.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        if raw.starts_with('#') {
            return Ok(None);
        }
        let line = raw.trim_end();
        let (directive, text) = match line.split_once(':') {
            Some((directive, text)) => (directive, text.trim_start()),
            None => ("", line.trim_start()),
        };
        directive.parse::<SizeDirective>()?;
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(Self {
            directive: directive.to_string(),
            text: text.to_string(),
        }))
    }
}

/// Read every line spec from `reader` in source order.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_lines<R: BufRead>(mut reader: R) -> Result<Vec<LineSpec>> {
    let mut specs = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::io("cannot read input", "-", e))?;
        if read == 0 {
            break;
        }
        let raw = String::from_utf8_lossy(&buf);
        if let Some(spec) = LineSpec::parse(&raw)? {
            tracing::debug!(directive = %spec.directive, text = %spec.text, "input line");
            specs.push(spec);
        }
    }
    Ok(specs)
}
