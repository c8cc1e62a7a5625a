//! Query API configuration
//!
//! Every section has a default, so a config file only needs the values it
//! changes. `CPDSQL_*` environment variables override the defaults, and the
//! `log` section takes the `CPDLOG_*` variables of `cpd_log::LogConfig`.

use std::env;

use cpd_log::LogConfig;
use dotenv::dotenv;
use serde::Deserialize;

use crate::engine::EngineKind;
use crate::error::{ErrorKind, Result};

/// Where engine errors are logged. Engine errors are always returned.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineErrorLog {
    pub log:      bool,
    pub log_file: String,
}

impl Default for EngineErrorLog {
    fn default() -> Self {
        Self {
            log:      true,
            log_file: "sql_error".into(),
        }
    }
}

/// What happens to problems found while making a query.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErrorPolicy {
    pub log:      bool,
    pub log_file: String,
    /// Return the "no data" and "bare string" problems as errors. When unset
    /// they are only logged and the query is made anyway. All other problems
    /// are returned regardless.
    pub halt:     bool,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            log:      true,
            log_file: "sql_error".into(),
            halt:     true,
        }
    }
}

/// Logging of every executed statement.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct QueryLog {
    pub log:      bool,
    pub log_file: String,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self {
            log:      true,
            log_file: "sql_query".into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqlConfig {
    pub engine:                   EngineKind,
    /// `mysql://...` or `odbc:<connection string>`.
    pub url:                      Option<String>,
    pub engine_error:             EngineErrorLog,
    pub cpdsql_error:             ErrorPolicy,
    pub query:                    QueryLog,
    pub enable_no_data_error:     bool,
    pub enable_bare_string_error: bool,
    /// The log files all of the above are written to.
    pub log:                      LogConfig,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            engine:                   EngineKind::default(),
            url:                      None,
            engine_error:             EngineErrorLog::default(),
            cpdsql_error:             ErrorPolicy::default(),
            query:                    QueryLog::default(),
            enable_no_data_error:     true,
            enable_bare_string_error: true,
            log:                      LogConfig::default(),
        }
    }
}

impl SqlConfig {
    /// Defaults overridden by `CPDSQL_*` and `CPDLOG_*` variables from the
    /// process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_vars(env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();

        let mut config = Self::default();

        config.log = LogConfig::from_vars(vars.iter().map(|(k, v)| (k.as_str(), v.clone())))?;

        for (key, value) in vars {
            match key.as_str() {
                "CPDSQL_ENGINE" => config.engine = value.parse()?,
                "CPDSQL_URL" => config.url = Some(value),
                "CPDSQL_ENGINE_ERROR_LOG" => config.engine_error.log = parse_bool(&key, &value)?,
                "CPDSQL_ENGINE_ERROR_LOG_FILE" => config.engine_error.log_file = value,
                "CPDSQL_ERROR_LOG" => config.cpdsql_error.log = parse_bool(&key, &value)?,
                "CPDSQL_ERROR_LOG_FILE" => config.cpdsql_error.log_file = value,
                "CPDSQL_ERROR_HALT" => config.cpdsql_error.halt = parse_bool(&key, &value)?,
                "CPDSQL_QUERY_LOG" => config.query.log = parse_bool(&key, &value)?,
                "CPDSQL_QUERY_LOG_FILE" => config.query.log_file = value,
                "CPDSQL_NO_DATA_ERROR" => {
                    config.enable_no_data_error = parse_bool(&key, &value)?
                }
                "CPDSQL_BARE_STRING_ERROR" => {
                    config.enable_bare_string_error = parse_bool(&key, &value)?
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// True when any of the log sections is switched on.
    pub fn logs_anything(&self) -> bool {
        self.engine_error.log || self.cpdsql_error.log || self.query.log
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ErrorKind::config(
            key,
            format!("'{}' is not a boolean", value),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::SqlConfig;
    use crate::engine::EngineKind;

    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let config = SqlConfig::default();

        assert_eq!(config.engine, EngineKind::Mysql);
        assert!(config.cpdsql_error.halt);
        assert!(config.query.log);
        assert_eq!(config.query.log_file, "sql_query");
        assert_eq!(config.engine_error.log_file, "sql_error");
        assert!(config.enable_no_data_error && config.enable_bare_string_error);
        assert!(config.logs_anything());
    }

    #[test]
    fn test_env_overrides() {
        let config = SqlConfig::from_vars(vec![
            ("CPDSQL_ENGINE", "odbc"),
            ("CPDSQL_URL", "odbc:DSN=test"),
            ("CPDSQL_ERROR_HALT", "off"),
            ("CPDSQL_QUERY_LOG", "0"),
            ("CPDSQL_BARE_STRING_ERROR", "false"),
            ("CPDLOG_OUTPUT_DIR", "/var/log/app"),
        ])
        .expect("vars should be accepted");

        assert_eq!(config.engine, EngineKind::Odbc);
        assert_eq!(config.url.as_ref().map(String::as_str), Some("odbc:DSN=test"));
        assert!(!config.cpdsql_error.halt);
        assert!(!config.query.log);
        assert!(!config.enable_bare_string_error);
        assert!(config.enable_no_data_error);
        assert_eq!(config.log.output_dir, PathBuf::from("/var/log/app"));
    }

    #[test]
    fn test_bad_values() {
        assert!(SqlConfig::from_vars(vec![("CPDSQL_ENGINE", "oracle")]).is_err());

        let err = SqlConfig::from_vars(vec![("CPDSQL_QUERY_LOG", "maybe")])
            .expect_err("not a boolean");
        assert!(err.to_string().contains("CPDSQL_QUERY_LOG"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SqlConfig = serde_json::from_str(
            r#"{
                "engine": "odbc",
                "query": {"log": false},
                "cpdsql_error": {"halt": false},
                "log": {"output_dir": "/tmp/sql-logs"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.engine, EngineKind::Odbc);
        assert!(!config.query.log);
        assert_eq!(config.query.log_file, "sql_query");
        assert!(!config.cpdsql_error.halt);
        assert!(config.cpdsql_error.log);
        assert_eq!(config.log.output_dir, PathBuf::from("/tmp/sql-logs"));
        assert_eq!(config.log.filename_prefix, "cpdlog_");
    }
}
