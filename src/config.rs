//! Runtime configuration from `LIPIDWISE_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    /// File when stdout is a terminal, stderr otherwise
    Auto,
    File,
    Stderr,
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stderr" => Ok(Self::Stderr),
            other => Err(format!("Unknown log mode '{other}' (expected auto|file|stderr)")),
        }
    }
}

/// Report document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown report format '{other}' (expected text|json)")),
        }
    }
}

/// Settings shared by the binary's logging and reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    pub sanitize_max_bytes: usize,
    pub report_format: ReportFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("lipidwise.log"),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
            report_format: ReportFormat::Text,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns a message naming the variable whose value could not be parsed.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    ///
    /// # Errors
    /// Returns a message naming the variable whose value could not be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("LIPIDWISE_LOG_MODE") {
            config.log_mode = v.parse().map_err(|e| format!("LIPIDWISE_LOG_MODE: {e}"))?;
        }
        if let Some(v) = lookup("LIPIDWISE_LOG_FILE") {
            config.log_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("LIPIDWISE_SANITIZE_MAX_BYTES") {
            config.sanitize_max_bytes = v
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| format!("LIPIDWISE_SANITIZE_MAX_BYTES: invalid value '{v}'"))?;
        }
        if let Some(v) = lookup("LIPIDWISE_REPORT_FORMAT") {
            config.report_format = v
                .parse()
                .map_err(|e| format!("LIPIDWISE_REPORT_FORMAT: {e}"))?;
        }

        Ok(config)
    }

    /// Resolve `Auto` against whether stdout is interactive.
    #[must_use]
    pub fn log_to_file(&self, interactive: bool) -> bool {
        match self.log_mode {
            LogMode::File => true,
            LogMode::Stderr => false,
            LogMode::Auto => interactive,
        }
    }
}
