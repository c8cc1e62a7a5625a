//! `cpd-sql` builds SQL in a way that keeps data out of the query text.
//!
//! Queries are written as sprintf-style templates and their data handed over
//! separately:
//!
//! ```ignore
//! let sql = db.make(
//!     "SELECT * FROM `person` WHERE `name` = '%s' AND `age` > %d",
//!     &[&name, &age],
//! )?;
//! ```
//!
//! * `%s` is replaced by the value as text, escaped by the engine. The
//!   template supplies the quotes.
//! * `%d` and `%f` are replaced by the value coerced to an integer or float,
//!   so they need no quotes and can not carry SQL.
//! * `%2$s` takes the second value without moving the sequential cursor.
//! * `%%` is a literal `%`.
//!
//! Making a query without any data, or with a `%s` right after `=`, is
//! reported as a likely injection bug. Constant queries pass `&[&Null()]`.
//!
//! The common shapes of query need no template at all. A `Select` (raw, all,
//! where, like or id) combined with a result method of `CpdSql` (`query`,
//! `array`, `row`, `value`, `count`, `exists`, `clause`) covers reading, and
//! `insert`, `update*`, `delete*`, `save` and `replace` cover writing.
//!
//! Table and column names are quoted with backticks but never validated.
//! Names taken from user input must pass `verify_table` / `verify_column`.
//!
//! Engines are pluggable through the `Engine` trait: `mysql` (feature
//! `dbd-mysql`), `odbc` (feature `dbd-odbc`) and `DirectEngine`, which only
//! records what it is asked to run.

pub mod clause;
pub mod composer;
pub mod config;
pub mod datetime;
pub mod engine;
pub mod error;
pub mod escape;
pub mod parser;
mod query;
pub mod types;

pub use clause::{Direction, Matches, Sort, SortKey};
pub use composer::Composer;
pub use config::{EngineErrorLog, ErrorPolicy, QueryLog, SqlConfig};
pub use engine::{DirectEngine, Engine, EngineKind};
pub use error::{Error, ErrorKind, Result};
pub use escape::Escape;
pub use query::{CpdSql, Select};
pub use types::{Null, Row, Rows, ToValue, Value};

/// Collects values for a `Select::raw` query.
///
/// ```ignore
/// let select = Select::raw("SELECT * FROM `t` WHERE `a` = '%s' AND `b` = %d", values!["x", 4]);
/// ```
#[macro_export]
macro_rules! values(
    () => {
        ::std::vec::Vec::<$crate::types::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::types::ToValue::to_value(&$value)),+]
    };
);

/// Builds a `Row` of column names and values for `insert`, `update` and
/// friends.
#[macro_export]
macro_rules! row(
    ($($key:expr => $value:expr),* $(,)?) => {
        {
            #[allow(unused_mut)]
            let mut r = $crate::types::Row::new();

            $(
                r.set($key, $value);
            )*

            r
        }
    };
);
