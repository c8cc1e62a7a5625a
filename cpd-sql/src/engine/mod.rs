//! The seam between the query API and a database driver.
//!
//! An engine runs finished SQL text and reads the whole result back into
//! `Rows`. It also escapes strings for its dialect, which is all the
//! formatter needs, so `EngineKind` offers the escaper of each engine
//! without opening a connection.

pub mod direct;

#[cfg(feature = "dbd-mysql")]
pub mod mysql;
#[cfg(feature = "dbd-odbc")]
pub mod odbc;

pub use direct::DirectEngine;

use crate::error::{ErrorKind, Result};
use crate::escape::{AddSlashes, Escape, MysqlEscape};
use crate::types::Rows;

use serde::Deserialize;

use std::fmt;
use std::str::FromStr;

pub trait Engine: Escape {
    /// Short lowercase name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Runs `sql` and returns every row it produced. Statements without a
    /// result set return empty `Rows` carrying the affected row count.
    fn execute(&mut self, sql: &str) -> Result<Rows>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn execute(&mut self, sql: &str) -> Result<Rows> {
        (**self).execute(sql)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Mysql,
    Odbc,
}

impl Default for EngineKind {
    fn default() -> Self {
        EngineKind::Mysql
    }
}

impl EngineKind {
    pub fn name(self) -> &'static str {
        match self {
            EngineKind::Mysql => "mysql",
            EngineKind::Odbc => "odbc",
        }
    }

    pub fn escaper(self) -> &'static dyn Escape {
        match self {
            EngineKind::Mysql => &MysqlEscape,
            EngineKind::Odbc => &AddSlashes,
        }
    }

    /// Picks the engine from a connection url: `mysql://...` or
    /// `odbc:<connection string>`.
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") {
            Ok(EngineKind::Mysql)
        }
        else if url.starts_with("odbc:") {
            Ok(EngineKind::Odbc)
        }
        else {
            Err(ErrorKind::config("url", format!("unknown url type: {}", url)))
        }
    }
}

impl FromStr for EngineKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(EngineKind::Mysql),
            "odbc" => Ok(EngineKind::Odbc),
            _ => Err(ErrorKind::config("engine", format!("unknown engine: {}", s))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Opens a connection for a `mysql://` or `odbc:` url.
///
/// Fails with a configuration error when the matching `dbd-*` feature was
/// not compiled in.
pub fn connect(url: &str) -> Result<Box<dyn Engine>> {
    match EngineKind::from_url(url)? {
        EngineKind::Mysql => connect_mysql(url),
        EngineKind::Odbc => connect_odbc(&url["odbc:".len()..]),
    }
}

#[cfg(feature = "dbd-mysql")]
fn connect_mysql(url: &str) -> Result<Box<dyn Engine>> {
    Ok(Box::new(mysql::MysqlEngine::new(url)?))
}

#[cfg(not(feature = "dbd-mysql"))]
fn connect_mysql(_url: &str) -> Result<Box<dyn Engine>> {
    Err(ErrorKind::config("url", "built without the dbd-mysql feature"))
}

#[cfg(feature = "dbd-odbc")]
fn connect_odbc(connection_string: &str) -> Result<Box<dyn Engine>> {
    Ok(Box::new(odbc::OdbcEngine::connect(connection_string)?))
}

#[cfg(not(feature = "dbd-odbc"))]
fn connect_odbc(_connection_string: &str) -> Result<Box<dyn Engine>> {
    Err(ErrorKind::config("url", "built without the dbd-odbc feature"))
}
