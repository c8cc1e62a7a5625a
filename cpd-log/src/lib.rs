//! `cpd-log` appends diagnostic text to plain log files.
//!
//! Log files are named by a short key such as `"sql_error"`; the configured
//! output directory, filename prefix and suffix turn it into a path, so with
//! the defaults `logger.line("decoder", ..)` writes to `log/cpdlog_decoder.txt`.
//!
//! * `line` appends one (optionally timestamped) line.
//! * `compact` squeezes multi-line text such as SQL onto one line first.
//! * `block` appends multi-line text followed by a separator line.
//! * `debug` appends the pretty `Debug` dump of any value as a block.
//! * `request` appends selected sections of a `RequestContext` as a block.
//!
//! Each entry is a single append, so the files can be shared with other
//! writers. Using one kind of entry per file keeps them readable.

pub mod config;
pub mod error;
mod logger;
pub mod request;

pub use config::LogConfig;
pub use error::{Error, ErrorKind, Result};
pub use logger::{compact, Logger};
pub use request::RequestContext;
