use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::result;

/// A crate private constructor for `Error`.
pub fn new_error(kind: ErrorKind) -> Error {
    Error(Box::new(kind))
}

/// A type alias for `Result<T, cpd_log::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur while configuring a logger or appending to a log file.
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

    /// Returns true if this is an I/O error.
    ///
    /// If this is true, the underlying `ErrorKind` is guaranteed to be
    /// `ErrorKind::Io`.
    pub fn is_io_error(&self) -> bool {
        match *self.0 {
            ErrorKind::Io { .. } => true,
            _ => false,
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
pub enum ErrorKind {
    /// Creating the output directory, appending or deleting a log file failed.
    Io {
        path: Option<PathBuf>,
        err:  io::Error,
    },
    /// A configuration value could not be used.
    Config { field: String, message: String },
    /// A request selector contained a letter outside of `SGPFRNEC`.
    UnknownSelector(char),
    /// A request selector named a section the context does not carry.
    MissingSection(&'static str),
}

impl ErrorKind {
    pub(crate) fn io_at<P: Into<PathBuf>>(path: P, err: io::Error) -> Error {
        new_error(ErrorKind::Io {
            path: Some(path.into()),
            err,
        })
    }

    pub(crate) fn config<F: Into<String>, M: Into<String>>(field: F, message: M) -> Error {
        new_error(ErrorKind::Config {
            field:   field.into(),
            message: message.into(),
        })
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        new_error(ErrorKind::Io { path: None, err })
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
            ErrorKind::Io { ref err, .. } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io {
                path: Some(ref path),
                ref err,
            } => write!(f, "log file {}: {}", path.display(), err),
            ErrorKind::Io { path: None, ref err } => err.fmt(f),
            ErrorKind::Config {
                ref field,
                ref message,
            } => write!(f, "invalid log configuration for {}: {}", field, message),
            ErrorKind::UnknownSelector(c) => write!(
                f,
                "unknown request selector '{}', expected one of SGPFRNEC",
                c
            ),
            ErrorKind::MissingSection(name) => {
                write!(f, "request context has no {} section", name)
            }
        }
    }
}
