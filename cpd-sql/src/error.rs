use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

use crate::types::Position;

//NOTE: this mod borrowed heavily from rust-csv's csv::error:Error to get started

/// A crate private constructor for `Error`.
pub fn new_error(kind: ErrorKind) -> Error {
    // use `pub(crate)` when it stabilizes.
    Error(Box::new(kind))
}

/// A type alias for `Result<T, cpd_sql::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur while making, executing or reading back a query.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns true if the database engine reported this error.
    pub fn is_engine_error(&self) -> bool {
        match *self.0 {
            ErrorKind::Engine { .. } => true,
            _ => false,
        }
    }

    /// Returns true for the problems a caller may choose to log and ignore
    /// (see `ErrorPolicy::halt`): a query without data and a bare string
    /// placeholder.
    pub fn is_recoverable(&self) -> bool {
        match *self.0 {
            ErrorKind::NoData { .. } | ErrorKind::BareString { .. } => true,
            _ => false,
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
pub enum ErrorKind {
    /// An I/O error, e.g. while reading a configuration file.
    Io(io::Error),
    /// Writing one of the query or error log files failed.
    Log(cpd_log::Error),
    /// A query was made without any data values.
    NoData { query: String },
    /// A `%s` placeholder directly follows `=`, so its value ends up unquoted.
    BareString { query: String, position: Position },
    /// A placeholder refers to a value that was not supplied.
    OutOfRange {
        query:    String,
        position: Position,
        /// Zero based index of the missing value.
        index:    usize,
        supplied: usize,
    },
    /// `%0$s` and indices too large to represent.
    InvalidPosition { query: String, position: Position },
    /// A value can not be rendered as the number its placeholder asks for.
    InvalidNumber { query: String, position: Position },
    /// Arguments a query builder can not turn into SQL.
    InvalidInput(String),
    /// A date or time could not be parsed.
    InvalidDate(String),
    /// `verify_table` did not find the table.
    VerifyTable(String),
    /// `verify_column` did not find the column.
    VerifyColumn { table: String, column: String },
    /// The database engine rejected a query or could not be reached.
    Engine {
        engine:  &'static str,
        message: String,
    },
    /// A configuration value could not be used.
    Config { field: String, message: String },
}

impl ErrorKind {
    pub(crate) fn invalid_input<S: Into<String>>(message: S) -> Error {
        new_error(ErrorKind::InvalidInput(message.into()))
    }

    pub fn engine<M: fmt::Display>(engine: &'static str, message: M) -> Error {
        new_error(ErrorKind::Engine {
            engine,
            message: message.to_string(),
        })
    }

    pub fn config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Error {
        new_error(ErrorKind::Config {
            field:   field.into(),
            message: message.into(),
        })
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        new_error(ErrorKind::Io(err))
    }
}

impl From<cpd_log::Error> for Error {
    fn from(err: cpd_log::Error) -> Error {
        new_error(ErrorKind::Log(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Log(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::Log(ref err) => write!(f, "logging failed: {}", err),
            ErrorKind::NoData { ref query } => write!(f, "No data! Query: {}", query),
            ErrorKind::BareString {
                ref query,
                ref position,
            } => write!(f, "Bare string at {}! Query: {}", position, query),
            ErrorKind::OutOfRange {
                ref query,
                ref position,
                index,
                supplied,
            } => write!(
                f,
                "SQL data replacement out of range at {}: value {} requested, {} supplied: {}",
                position,
                index + 1,
                supplied,
                query
            ),
            ErrorKind::InvalidPosition {
                ref query,
                ref position,
            } => write!(
                f,
                "invalid positional placeholder at {}: {}",
                position, query
            ),
            ErrorKind::InvalidNumber {
                ref query,
                ref position,
            } => write!(
                f,
                "value for the placeholder at {} is not a finite number: {}",
                position, query
            ),
            ErrorKind::InvalidInput(ref message) => write!(f, "invalid input: {}", message),
            ErrorKind::InvalidDate(ref input) => write!(f, "unrecognized date/time: {}", input),
            ErrorKind::VerifyTable(ref table) => {
                write!(f, "Table verification failed!: `{}`", table)
            }
            ErrorKind::VerifyColumn {
                ref table,
                ref column,
            } => write!(f, "Column verification failed!: `{}`.`{}`", table, column),
            ErrorKind::Engine {
                engine,
                ref message,
            } => write!(f, "{}: {}", engine, message),
            ErrorKind::Config {
                ref field,
                ref message,
            } => write!(f, "invalid configuration for {}: {}", field, message),
        }
    }
}
