//! String escaping for values inlined into quoted SQL literals.
//!
//! The escapers never add the surrounding quotes themselves; templates and
//! clause builders do.

/// Escapes text so that it can be placed between quotes in a query.
pub trait Escape {
    fn escape_string(&self, data: &str) -> String;
}

/// The character rules of MySQL's `mysql_real_escape_string` for the
/// default SQL mode (backslash escapes enabled).
#[derive(Clone, Copy, Debug, Default)]
pub struct MysqlEscape;

impl Escape for MysqlEscape {
    fn escape_string(&self, data: &str) -> String {
        let mut out = String::with_capacity(data.len() + data.len() / 8);

        for c in data.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\x1a' => out.push_str("\\Z"),
                _ => out.push(c),
            }
        }

        out
    }
}

/// PHP's `addslashes`: a backslash before quotes, backslashes and NUL.
///
/// ODBC has no escaping call of its own, so the ODBC engine uses this.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddSlashes;

impl Escape for AddSlashes {
    fn escape_string(&self, data: &str) -> String {
        let mut out = String::with_capacity(data.len() + data.len() / 8);

        for c in data.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\\' | '\'' | '"' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }

        out
    }
}

impl<'a, E: Escape + ?Sized> Escape for &'a E {
    fn escape_string(&self, data: &str) -> String {
        (**self).escape_string(data)
    }
}

impl<E: Escape + ?Sized> Escape for Box<E> {
    fn escape_string(&self, data: &str) -> String {
        (**self).escape_string(data)
    }
}

/// Wraps a table or column name in backticks, doubling any backtick inside.
///
/// This only keeps the name from breaking out of its quotes. Names taken
/// from user input still have to be checked with `verify_table` /
/// `verify_column`.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::{quote_identifier, AddSlashes, Escape, MysqlEscape};

    #[test]
    fn test_mysql_escape() {
        assert_eq!(
            MysqlEscape.escape_string("a' OR 1=1; --"),
            "a\\' OR 1=1; --"
        );
        assert_eq!(
            MysqlEscape.escape_string("line\r\nnul\0sub\x1a\"q\\"),
            "line\\r\\nnul\\0sub\\Z\\\"q\\\\"
        );
        assert_eq!(MysqlEscape.escape_string("100%"), "100%");
    }

    #[test]
    fn test_add_slashes() {
        assert_eq!(AddSlashes.escape_string("O'Brien \"Bob\""), "O\\'Brien \\\"Bob\\\"");
        assert_eq!(AddSlashes.escape_string("c:\\temp\0"), "c:\\\\temp\\0");
        assert_eq!(AddSlashes.escape_string("two\nlines"), "two\nlines");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("person"), "`person`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
