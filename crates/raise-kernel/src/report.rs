//! Showing exceptions that reach the top level.
//!
//! A failure is never fatal to the host: the reporter prints it, logs it and
//! lets the caller carry on with the next command.

use std::io::Write;
use std::sync::LazyLock;

use regex::Regex;

use raise_types::{Exception, Pprint};

use crate::config::ReportConfig;
use crate::interpreter::top_level;

/// SGR escape sequences, as written by `raise_types::style`.
static SGR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").ok());

/// Remove color from rendered text.
pub fn strip_ansi(text: &str) -> String {
    match SGR.as_ref() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

/// Renders and prints top-level exceptions.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: ReportConfig,
    color: bool,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        let color = config.color.enabled();
        Self { config, color }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The text shown for `exc`, or `None` if nothing is shown.
    pub fn render(&self, exc: &Exception) -> Option<String> {
        let exc = top_level(exc.clone(), self.config.escaped_flow)?;
        let text = if self.config.traceback {
            exc.pprint()
        } else {
            exc.pprint_header()
        };
        Some(self.present(text))
    }

    /// Strip color from `text` unless color is on.
    pub fn present(&self, text: String) -> String {
        if self.color { text } else { strip_ansi(&text) }
    }

    /// Print `exc` to `out` if it is shown. Returns whether anything was.
    ///
    /// Write errors are logged, not returned.
    pub fn report<W: Write>(&self, exc: &Exception, out: &mut W) -> bool {
        let Some(text) = self.render(exc) else {
            return false;
        };
        tracing::warn!(error = %exc, frames = exc.traceback().len(), "exception reached top level");
        if let Err(e) = writeln!(out, "{text}") {
            tracing::warn!("failed to write exception report: {e}");
        }
        true
    }
}
