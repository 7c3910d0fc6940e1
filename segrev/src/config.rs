//! User configuration for segrev.
//!
//! Read from `$XDG_CONFIG_HOME/segrev/config.toml` (or `~/.config/segrev/config.toml`).
//! Every key is optional. A missing file is the normal case; a file that fails to parse is
//! a soft failure: the error is logged and built-in defaults are used, so a typo in config
//! never prevents startup.
//!
//! ```toml
//! theme = "dark"
//! project = "manual"
//! database = ".segrev/segments.db"
//! log_file = "/tmp/segrev.log"
//! stall_after_ms = 8000
//! double_click_ms = 300
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Resolved configuration. CLI flags are applied on top by `main`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `"catppuccin-mocha"` or `"dark"`.
    pub theme: String,
    /// Engine context name sent with every request.
    pub project: String,
    /// SQLite database path, relative to the working directory unless absolute.
    pub database: PathBuf,
    /// Log file; `None` means the XDG state default.
    pub log_file: Option<PathBuf>,
    /// How long an error fetch may stay outstanding before the panel flags it.
    pub stall_after_ms: u64,
    /// Maximum gap between two clicks on the same row for a double click.
    pub double_click_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            project: "default".to_owned(),
            database: PathBuf::from(".segrev").join("segments.db"),
            log_file: None,
            stall_after_ms: 5000,
            double_click_ms: 400,
        }
    }
}

impl Config {
    pub fn stall_after(&self) -> Duration {
        Duration::from_millis(self.stall_after_ms)
    }

    pub fn double_click(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    /// Log file path, falling back to `$XDG_STATE_HOME/segrev/segrev.log`.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            xdg_dir("XDG_STATE_HOME", ".local/state").join("segrev").join("segrev.log")
        })
    }

    /// Parses config text. Unknown keys are ignored.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Loads `path`, falling back to defaults on any failure.
    ///
    /// Returns the config plus a warning to log once logging is up; the log file location
    /// itself comes from config, so loading happens before the subscriber exists.
    pub fn load(path: &Path) -> (Self, Option<String>) {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return (Self::default(), None),
            Err(e) => {
                return (Self::default(), Some(format!("cannot read {}: {e}", path.display())));
            }
        };
        match Self::parse(&raw) {
            Ok(config) => (config, None),
            Err(e) => {
                let warning = format!("config parse error in {}: {e}", path.display());
                (Self::default(), Some(warning))
            }
        }
    }
}

/// Returns `$<var>` or `~/<fallback>`.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(fallback)))
        .unwrap_or_else(|| PathBuf::from(fallback))
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("segrev").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let config = Config::parse("theme = \"dark\"\nstall_after_ms = 100\n").unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.stall_after(), Duration::from_millis(100));
        assert_eq!(config.project, "default");
        assert_eq!(config.double_click(), Duration::from_millis(400));
    }

    #[test]
    fn bad_file_falls_back_with_warning() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = [").unwrap();
        let (config, warning) = Config::load(&path);
        assert_eq!(config, Config::default());
        assert!(warning.unwrap().contains("config parse error"));
    }

    #[test]
    fn missing_file_is_silent() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, warning) = Config::load(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }
}
