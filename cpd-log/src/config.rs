//! Logger configuration
//!
//! Defaults mirror a fresh install: files land in `./log`, are named
//! `cpdlog_<name>.txt` and every entry starts with `[YYYY-mm-dd HH:MM:SS] `.
//! Any value can be overridden from a config file (the type is
//! `Deserialize`) or from `CPDLOG_*` environment variables.

use std::env;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use dotenv::dotenv;
use serde::Deserialize;

use crate::error::{ErrorKind, Result};

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Directory the log files are created in, created on demand.
    pub output_dir:      PathBuf,
    pub filename_prefix: String,
    /// Usually carries the extension, e.g. `.txt` or `.log`.
    pub filename_suffix: String,
    /// chrono strftime pattern used for entry timestamps.
    pub time_format:     String,
    pub endl:            String,
    /// Separator line written after each block entry.
    pub new_block:       String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output_dir:      PathBuf::from("log"),
            filename_prefix: "cpdlog_".into(),
            filename_suffix: ".txt".into(),
            time_format:     "[%Y-%m-%d %H:%M:%S] ".into(),
            endl:            LINE_ENDING.into(),
            new_block:       format!("{}{}", "-".repeat(80), LINE_ENDING),
        }
    }
}

impl LogConfig {
    /// Defaults overridden by `CPDLOG_*` variables from the process
    /// environment (and `.env`, when present).
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_vars(env::vars())
    }

    /// Defaults overridden by any `CPDLOG_*` pairs in `vars`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            match key.as_ref() {
                "CPDLOG_OUTPUT_DIR" => config.output_dir = PathBuf::from(value.into()),
                "CPDLOG_FILENAME_PREFIX" => config.filename_prefix = value.into(),
                "CPDLOG_FILENAME_SUFFIX" => config.filename_suffix = value.into(),
                "CPDLOG_TIME_FORMAT" => config.time_format = value.into(),
                _ => {}
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Rejects a time format chrono can not render; rendering one would panic
    /// in the middle of an append.
    pub fn validate(&self) -> Result<()> {
        if StrftimeItems::new(&self.time_format).any(|item| item == Item::Error) {
            return Err(ErrorKind::config(
                "time_format",
                format!("'{}' is not a valid strftime pattern", self.time_format),
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(ErrorKind::config("output_dir", "must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::LogConfig;
    use std::path::PathBuf;

    #[test]
    fn test_env_overrides() {
        let config = LogConfig::from_vars(vec![
            ("CPDLOG_OUTPUT_DIR", "/tmp/app-logs"),
            ("CPDLOG_FILENAME_PREFIX", "app_"),
            ("HOME", "/root"),
        ])
        .expect("vars should be accepted");

        assert_eq!(config.output_dir, PathBuf::from("/tmp/app-logs"));
        assert_eq!(config.filename_prefix, "app_");
        assert_eq!(config.filename_suffix, ".txt", "untouched default");
    }

    #[test]
    fn test_bad_time_format() {
        let err = LogConfig::from_vars(vec![("CPDLOG_TIME_FORMAT", "%Q")])
            .expect_err("%Q is not a strftime specifier");

        assert!(err.to_string().contains("time_format"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig = serde_json::from_str(r#"{"filename_suffix": ".log"}"#).unwrap();

        assert_eq!(config.filename_suffix, ".log");
        assert_eq!(config.filename_prefix, "cpdlog_");
        assert_eq!(config.new_block.len(), 80 + config.endl.len());
    }
}
