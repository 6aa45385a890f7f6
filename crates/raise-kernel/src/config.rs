//! Configuration for error reporting.
//!
//! Configuration is loaded from `~/.config/raise/report.toml` (or the
//! platform's equivalent config directory).

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::interpreter::EscapePolicy;

/// When to color reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// How top-level exceptions are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub color: ColorChoice,

    /// Flow signals that escape every loop and function.
    #[serde(default)]
    pub escaped_flow: EscapePolicy,

    /// Show the traceback under the header line.
    #[serde(default = "default_traceback")]
    pub traceback: bool,
}

fn default_traceback() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            color: ColorChoice::default(),
            escaped_flow: EscapePolicy::default(),
            traceback: default_traceback(),
        }
    }
}

impl ReportConfig {
    /// Load configuration from the default path, then apply the environment.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config.apply_env())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "raise")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("report.toml"))
    }

    /// Honor `NO_COLOR`.
    pub fn apply_env(self) -> Self {
        self.with_no_color(std::env::var_os("NO_COLOR"))
    }

    /// A non-empty `NO_COLOR` value turns color off, even if forced on.
    fn with_no_color(mut self, value: Option<OsString>) -> Self {
        if value.is_some_and(|v| !v.is_empty()) {
            self.color = ColorChoice::Never;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.color, ColorChoice::Auto);
        assert_eq!(config.escaped_flow, EscapePolicy::Report);
        assert!(config.traceback);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
color = "always"
escaped_flow = "absorb"
traceback = false
"#;
        let config: ReportConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(config.color, ColorChoice::Always);
        assert_eq!(config.escaped_flow, EscapePolicy::Absorb);
        assert!(!config.traceback);
    }

    #[test]
    fn parse_minimal_config() {
        let config: ReportConfig = toml::from_str("").expect("parse failed");
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(toml::from_str::<ReportConfig>(r#"escaped_flow = "ignore""#).is_err());
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("raise-report-{}.toml", std::process::id()));
        std::fs::write(&path, "color = \"never\"\n").expect("write config");
        let config = ReportConfig::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.expect("load").color, ColorChoice::Never);
    }

    #[test]
    fn load_from_missing_file_has_context() {
        let err = ReportConfig::load_from(Path::new("/nonexistent/raise/report.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"), "{err}");
    }

    #[test]
    fn no_color_forces_color_off() {
        let config = ReportConfig {
            color: ColorChoice::Always,
            ..ReportConfig::default()
        };
        assert_eq!(config.clone().with_no_color(None).color, ColorChoice::Always);
        assert_eq!(config.clone().with_no_color(Some("".into())).color, ColorChoice::Always);
        assert_eq!(config.with_no_color(Some("1".into())).color, ColorChoice::Never);
    }

    #[test]
    fn forced_choices() {
        assert!(ColorChoice::Always.enabled());
        assert!(!ColorChoice::Never.enabled());
    }

    #[test]
    fn config_path_ends_with_report_toml() {
        if let Ok(path) = ReportConfig::config_path() {
            assert!(path.ends_with("report.toml"));
        }
    }
}
