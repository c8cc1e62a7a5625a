use crate::error::{new_error, Error, ErrorKind, Result};
use crate::escape::Escape;
use crate::parser::{scan, Argument, Conversion, Fragment, Placeholder};
use crate::types::{ToValue, Value};

/// Formats query templates: `%s`, `%d` and `%f` placeholders are replaced by
/// escaped, coerced values.
///
/// Two validation passes guard against templates that were written with
/// their data already interpolated:
///
/// * **no data**: a query made without any values. Constant queries pass a
///   single `Null()` to opt out.
/// * **bare string**: a `%s` directly after `=` (whitespace allowed), which
///   leaves the value unquoted in the finished SQL.
///
/// `check` reports what the passes find without deciding what to do about
/// it, `substitute` does the replacement, and `make` does both and fails on
/// the first problem.
pub struct Composer<'a> {
    escaper:     &'a dyn Escape,
    no_data:     bool,
    bare_string: bool,
}

impl<'a> Composer<'a> {
    pub fn new(escaper: &'a dyn Escape) -> Self {
        Self {
            escaper,
            no_data: true,
            bare_string: true,
        }
    }

    pub fn no_data_check(mut self, enabled: bool) -> Self {
        self.no_data = enabled;
        self
    }

    pub fn bare_string_check(mut self, enabled: bool) -> Self {
        self.bare_string = enabled;
        self
    }

    /// Runs the enabled validation passes over `query`.
    pub fn check(&self, query: &str, values: &[&dyn ToValue]) -> Vec<Error> {
        let mut problems = vec![];

        if self.no_data && values.is_empty() {
            problems.push(new_error(ErrorKind::NoData {
                query: query.to_string(),
            }));
        }

        if self.bare_string {
            let mut previous: Option<Fragment> = None;

            for fragment in scan(query) {
                if let (Some(Fragment::Literal(text)), Fragment::Placeholder(p)) =
                    (previous, fragment)
                {
                    if p.conversion == Conversion::Str && ends_with_equals(text) {
                        problems.push(new_error(ErrorKind::BareString {
                            query:    query.to_string(),
                            position: p.position,
                        }));
                    }
                }

                previous = Some(fragment);
            }
        }

        problems
    }

    /// Replaces every placeholder in `query` with its value.
    ///
    /// The sequential cursor starts at the first value on every call and is
    /// only advanced by placeholders without an index.
    pub fn substitute(&self, query: &str, values: &[&dyn ToValue]) -> Result<String> {
        let values: Vec<Value> = values.iter().map(|v| v.to_value()).collect();

        let mut sql = String::with_capacity(query.len());
        let mut cursor = 0;

        for fragment in scan(query) {
            match fragment {
                Fragment::Literal(text) => sql.push_str(text),
                Fragment::Percent => sql.push('%'),
                Fragment::Placeholder(p) => {
                    let index = match p.argument {
                        Argument::Next => {
                            cursor += 1;
                            cursor - 1
                        }
                        Argument::Index(i) => i - 1,
                        Argument::Invalid => {
                            return Err(new_error(ErrorKind::InvalidPosition {
                                query:    query.to_string(),
                                position: p.position,
                            }));
                        }
                    };

                    let value = values.get(index).ok_or_else(|| {
                        new_error(ErrorKind::OutOfRange {
                            query: query.to_string(),
                            position: p.position,
                            index,
                            supplied: values.len(),
                        })
                    })?;

                    sql.push_str(&self.render(query, &p, value)?);
                }
            }
        }

        Ok(sql)
    }

    /// `check` then `substitute`, failing on the first problem found.
    pub fn make(&self, query: &str, values: &[&dyn ToValue]) -> Result<String> {
        if let Some(e) = self.check(query, values).into_iter().next() {
            return Err(e);
        }

        self.substitute(query, values)
    }

    fn render(&self, query: &str, p: &Placeholder, value: &Value) -> Result<String> {
        match p.conversion {
            Conversion::Str => Ok(self.escaper.escape_string(&value.to_text())),
            Conversion::Int => Ok(value.to_integer().to_string()),
            Conversion::Float => {
                let f = value.to_real();

                if !f.is_finite() {
                    return Err(new_error(ErrorKind::InvalidNumber {
                        query:    query.to_string(),
                        position: p.position,
                    }));
                }

                Ok(f.to_string())
            }
        }
    }
}

// `\s` of a PCRE pattern: space, \t, \n, \x0b, \x0c, \r
fn ends_with_equals(text: &str) -> bool {
    text.trim_end_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b')
        .ends_with('=')
}

#[cfg(test)]
mod tests {
    use super::Composer;
    use crate::error::ErrorKind;
    use crate::escape::{AddSlashes, MysqlEscape};
    use crate::types::{Null, Position, ToValue};

    #[test]
    fn test_make_sequential() {
        let c = Composer::new(&MysqlEscape);

        let sql = c
            .make(
                "SELECT * FROM `person` WHERE `name` = '%s' AND `age` > %d",
                &[&"O'Brien", &"21 years"],
            )
            .expect("make");

        assert_eq!(
            sql,
            "SELECT * FROM `person` WHERE `name` = 'O\\'Brien' AND `age` > 21"
        );
    }

    #[test]
    fn test_make_positional_does_not_move_cursor() {
        let c = Composer::new(&MysqlEscape);

        let sql = c.make("'%2$s' '%s' '%1$s' '%s'", &[&"a", &"b"]).expect("make");

        assert_eq!(sql, "'b' 'a' 'a' 'b'");
    }

    #[test]
    fn test_make_float() {
        let c = Composer::new(&MysqlEscape);

        assert_eq!(c.make("%f", &[&1.5]).expect("make"), "1.5");
        assert_eq!(c.make("%f", &[&"2.25abc"]).expect("make"), "2.25");
        assert_eq!(c.make("%f", &[&Null()]).expect("make"), "0");
        assert_eq!(c.make("%f", &[&3]).expect("make"), "3");

        // full precision, no rounding
        assert_eq!(
            c.make("`lat` = %f", &[&37.7749295]).expect("make"),
            "`lat` = 37.7749295"
        );
        assert_eq!(
            c.make("`eps` = %f", &[&0.0000001]).expect("make"),
            "`eps` = 0.0000001"
        );
        assert_eq!(
            c.make("%f", &[&"-1.0000000000000002"]).expect("make"),
            "-1.0000000000000002"
        );

        let err = c.make("x = %f", &[&std::f64::NAN]).expect_err("nan");

        match err.kind() {
            ErrorKind::InvalidNumber { position, .. } => {
                assert_eq!(*position, Position::new(4, 1))
            }
            _ => panic!("unexpected error {}", err),
        }
    }

    #[test]
    fn test_make_percent_literals() {
        let c = Composer::new(&MysqlEscape);

        assert_eq!(
            c.make("`a` LIKE '50%%' OR `b` = '%%s' OR `c` = '%s'", &[&"x"])
                .expect("make"),
            "`a` LIKE '50%' OR `b` = '%s' OR `c` = 'x'"
        );
        assert_eq!(c.make("100%x", &[&Null()]).expect("make"), "100%x");
    }

    #[test]
    fn test_make_null_opt_out() {
        let c = Composer::new(&MysqlEscape);

        assert_eq!(c.make("SHOW TABLES", &[&Null()]).expect("make"), "SHOW TABLES");
    }

    #[test]
    fn test_no_data() {
        let c = Composer::new(&MysqlEscape);

        let err = c.make("SELECT 1", &[]).expect_err("no data");
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "No data! Query: SELECT 1");

        let c = c.no_data_check(false);
        assert_eq!(c.make("SELECT 1", &[]).expect("make"), "SELECT 1");
    }

    #[test]
    fn test_bare_string() {
        let c = Composer::new(&MysqlEscape);

        for q in &["`a` = %s", "`a` =%1$s", "`a` =\n\t %s"] {
            let problems = c.check(q, &[&"x"]);

            assert_eq!(problems.len(), 1, "{}", q);
            match problems[0].kind() {
                ErrorKind::BareString { .. } => {}
                _ => panic!("unexpected error {}", problems[0]),
            }
        }

        assert!(c.check("`a` = '%s'", &[&"x"]).is_empty());
        assert!(c.check("`a` = %d", &[&1]).is_empty());
        assert!(c.check("`a` = %%s", &[&1]).is_empty());

        let c = c.bare_string_check(false);
        assert_eq!(c.make("`a` = %s", &[&"x"]).expect("make"), "`a` = x");
    }

    #[test]
    fn test_substitute_ignores_checks() {
        let c = Composer::new(&MysqlEscape);

        assert_eq!(c.substitute("`a` = %s", &[&7]).expect("substitute"), "`a` = 7");
    }

    #[test]
    fn test_out_of_range() {
        let c = Composer::new(&MysqlEscape);

        let err = c.make("'%s' '%s'", &[&"a"]).expect_err("out of range");

        match err.kind() {
            ErrorKind::OutOfRange {
                index, supplied, ..
            } => {
                assert_eq!(*index, 1);
                assert_eq!(*supplied, 1);
            }
            _ => panic!("unexpected error {}", err),
        }
        assert!(!err.is_recoverable());

        assert!(c.make("'%3$s'", &[&"a", &"b"]).is_err());
    }

    #[test]
    fn test_invalid_position() {
        let c = Composer::new(&MysqlEscape);

        let err = c.make("'%0$s'", &[&"a"]).expect_err("index 0");

        match err.kind() {
            ErrorKind::InvalidPosition { .. } => {}
            _ => panic!("unexpected error {}", err),
        }
    }

    #[test]
    fn test_odbc_escaping() {
        let c = Composer::new(&AddSlashes);
        let name = String::from("a\"b'c\nd");

        assert_eq!(
            c.make("'%s'", &[&name as &dyn ToValue]).expect("make"),
            "'a\\\"b\\'c\nd'"
        );
    }
}
