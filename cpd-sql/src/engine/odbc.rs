use odbc_api::{Connection, ConnectionOptions, Cursor, Environment, ResultSetMetadata};

use super::Engine;

use crate::error::{ErrorKind, Result};
use crate::escape::{AddSlashes, Escape};
use crate::types::{Column, Row, Rows, Value};

use std::sync::OnceLock;

const NAME: &str = "odbc";

// connections borrow the environment, so it lives for the whole process
static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> Result<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }

    let env = Environment::new().map_err(|e| ErrorKind::engine(NAME, e))?;

    // losing a race to another thread leaves its environment in place
    let _ = ENVIRONMENT.set(env);

    ENVIRONMENT
        .get()
        .ok_or_else(|| ErrorKind::engine(NAME, "environment unavailable"))
}

/// Runs queries on a single ODBC connection.
///
/// ODBC has no escaping call, strings are escaped like PHP's `addslashes`.
/// Every column is read back as text; `NULL` stays `Value::Null`.
pub struct OdbcEngine {
    connection: Connection<'static>,
}

impl OdbcEngine {
    /// Connects with a driver connection string such as
    /// `Driver={MariaDB};Server=localhost;Database=test;UID=u;PWD=p;`.
    pub fn connect(connection_string: &str) -> Result<Self> {
        let connection = environment()?
            .connect_with_connection_string(connection_string, ConnectionOptions::default())
            .map_err(|e| ErrorKind::engine(NAME, e))?;

        Ok(Self { connection })
    }
}

impl Escape for OdbcEngine {
    fn escape_string(&self, data: &str) -> String {
        AddSlashes.escape_string(data)
    }
}

impl Engine for OdbcEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn execute(&mut self, sql: &str) -> Result<Rows> {
        let mut cursor = match self
            .connection
            .execute(sql, ())
            .map_err(|e| ErrorKind::engine(NAME, e))?
        {
            Some(cursor) => cursor,
            None => return Ok(Rows::default()),
        };

        let column_names = cursor
            .column_names()
            .map_err(|e| ErrorKind::engine(NAME, e))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| ErrorKind::engine(NAME, e))?;

        let mut rows = Rows::new(column_names.clone());
        let mut buf = Vec::new();

        while let Some(mut driver_row) = cursor.next_row().map_err(|e| ErrorKind::engine(NAME, e))? {
            let mut row = Row::new();

            for (i, name) in column_names.iter().enumerate() {
                // column numbers are one based
                let present = driver_row
                    .get_text((i + 1) as u16, &mut buf)
                    .map_err(|e| ErrorKind::engine(NAME, e))?;

                let v = if present {
                    Value::Text(String::from_utf8_lossy(&buf).into_owned())
                }
                else {
                    Value::Null
                };

                row.push_column(Column::new(name.as_str(), v));
            }

            rows.push_row(row);
        }

        Ok(rows)
    }
}
