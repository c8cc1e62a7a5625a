//! where in a query template something was found

use std::fmt;

use nom_locate::LocatedSpan;

#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, Default)]
pub struct Position {
    /// Byte offset from the start of the template.
    pub offset: usize,
    /// One based line number.
    pub line:   u32,
}

impl Position {
    pub fn new(offset: usize, line: u32) -> Self {
        Self { offset, line }
    }
}

impl<'a> From<LocatedSpan<&'a str>> for Position {
    fn from(span: LocatedSpan<&'a str>) -> Self {
        Self::new(span.offset, span.line)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "character {} line {}", self.offset, self.line)
    }
}
