//! Values handed to queries and the rows read back from them
//!

mod position;
mod rows;
pub mod value;

pub struct Null();

pub use position::Position;

pub use rows::{Column, Row, Rows};

pub use value::{ToValue, Value};
