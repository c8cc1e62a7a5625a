//! Builders for the `WHERE`, `SET` and `ORDER BY` parts of generated queries.
//!
//! Values are rendered as text, escaped with the engine escaper and wrapped
//! in single quotes. Column names are wrapped in backticks but otherwise
//! trusted; see `quote_identifier`.

use crate::error::{ErrorKind, Result};
use crate::escape::{quote_identifier, Escape};
use crate::types::{Row, ToValue, Value};

use serde::Deserialize;

use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// Column/value pairs joined with `AND` in a `WHERE` clause.
///
/// Setting a column twice keeps its first position and the last value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matches(Row);

impl Matches {
    pub fn new() -> Self {
        Matches(Row::new())
    }

    /// A single `column = value` match.
    pub fn pair<C: Into<String>, V: ToValue>(column: C, value: V) -> Self {
        let mut m = Self::new();
        m.push(column, value);
        m
    }

    /// Pairs up parallel lists of columns and values.
    pub fn zip<C, V>(columns: Vec<C>, values: Vec<V>) -> Result<Self>
    where
        C: Into<String>,
        V: ToValue,
    {
        if columns.len() != values.len() {
            return Err(ErrorKind::invalid_input(format!(
                "{} match columns but {} values",
                columns.len(),
                values.len()
            )));
        }

        Ok(columns.into_iter().zip(values).collect())
    }

    pub fn and<C: Into<String>, V: ToValue>(mut self, column: C, value: V) -> Self {
        self.push(column, value);
        self
    }

    pub fn push<C: Into<String>, V: ToValue>(&mut self, column: C, value: V) {
        self.0.set(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.columns().map(|c| (c.name(), c.value()))
    }
}

impl<C: Into<String>, V: ToValue> From<(C, V)> for Matches {
    fn from((column, value): (C, V)) -> Self {
        Self::pair(column, value)
    }
}

impl From<Row> for Matches {
    fn from(row: Row) -> Self {
        Matches(row)
    }
}

impl<C: Into<String>, V: ToValue> FromIterator<(C, V)> for Matches {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut m = Self::new();

        for (column, value) in iter {
            m.push(column, value);
        }

        m
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Asc,
    Desc,
}

impl FromStr for Direction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(ErrorKind::invalid_input(format!("invalid sort direction: {}", s))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    pub column:    String,
    pub direction: Option<Direction>,
}

impl SortKey {
    pub fn new<C: Into<String>>(column: C) -> Self {
        Self {
            column:    column.into(),
            direction: None,
        }
    }

    pub fn asc<C: Into<String>>(column: C) -> Self {
        Self {
            column:    column.into(),
            direction: Some(Direction::Asc),
        }
    }

    pub fn desc<C: Into<String>>(column: C) -> Self {
        Self {
            column:    column.into(),
            direction: Some(Direction::Desc),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.direction {
            Some(d) => write!(f, "{} {}", quote_identifier(&self.column), d),
            None => write!(f, "{}", quote_identifier(&self.column)),
        }
    }
}

/// The `ORDER BY` of a generated `SELECT`.
#[derive(Clone, Debug, PartialEq)]
pub enum Sort {
    None,
    Column(String),
    Columns(Vec<SortKey>),
}

impl Default for Sort {
    fn default() -> Self {
        Sort::None
    }
}

impl<'a> From<&'a str> for Sort {
    fn from(column: &'a str) -> Self {
        Sort::Column(column.to_string())
    }
}

impl From<String> for Sort {
    fn from(column: String) -> Self {
        Sort::Column(column)
    }
}

impl From<Vec<SortKey>> for Sort {
    fn from(keys: Vec<SortKey>) -> Self {
        Sort::Columns(keys)
    }
}

impl<T: Into<Sort>> From<Option<T>> for Sort {
    fn from(sort: Option<T>) -> Self {
        sort.map(Into::into).unwrap_or_default()
    }
}

fn conditions(escaper: &dyn Escape, matches: &Matches, operator: &str) -> Result<String> {
    if matches.is_empty() {
        return Err(ErrorKind::invalid_input("no columns to match"));
    }

    let conditions: Vec<String> = matches
        .iter()
        .map(|(column, value)| {
            format!(
                "{} {} '{}'",
                quote_identifier(column),
                operator,
                escaper.escape_string(&value.to_text())
            )
        })
        .collect();

    Ok(format!("WHERE {}", conditions.join(" AND ")))
}

/// ``WHERE `c1` = 'v1' AND `c2` = 'v2'``
pub fn clause_where(escaper: &dyn Escape, matches: &Matches) -> Result<String> {
    conditions(escaper, matches, "=")
}

/// ``WHERE `c1` LIKE 'v1' AND `c2` LIKE 'v2'``
pub fn clause_like(escaper: &dyn Escape, matches: &Matches) -> Result<String> {
    conditions(escaper, matches, "LIKE")
}

/// ``WHERE `id` = n``; `id` goes through integer coercion and needs no
/// escaping.
pub fn clause_id<V: ToValue + ?Sized>(id: &V) -> String {
    format!("WHERE `id` = {}", id.to_value().to_integer())
}

/// ``SET `c1` = 'v1', `c2` = 'v2'``
pub fn clause_set(escaper: &dyn Escape, data: &Row) -> Result<String> {
    if data.is_empty() {
        return Err(ErrorKind::invalid_input("no columns to set"));
    }

    let updates: Vec<String> = data
        .columns()
        .map(|c| {
            format!(
                "{} = '{}'",
                quote_identifier(c.name()),
                escaper.escape_string(&c.value().to_text())
            )
        })
        .collect();

    Ok(format!("SET {}", updates.join(", ")))
}

/// The `ORDER BY` clause for `sort`, empty for `Sort::None` and for an empty
/// list of keys.
pub fn clause_order(sort: &Sort) -> String {
    match sort {
        Sort::None => String::new(),
        Sort::Column(column) => format!("ORDER BY {}", quote_identifier(column)),
        Sort::Columns(keys) if keys.is_empty() => String::new(),
        Sort::Columns(keys) => {
            let keys: Vec<String> = keys.iter().map(SortKey::to_string).collect();

            format!("ORDER BY {}", keys.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{clause_id, clause_like, clause_order, clause_set, clause_where, Direction,
                Matches, Sort, SortKey};
    use crate::escape::MysqlEscape;
    use crate::types::{Null, Row, Value};

    #[test]
    fn test_clause_where() {
        let m = Matches::pair("name", "O'Brien").and("age", 40);

        assert_eq!(
            clause_where(&MysqlEscape, &m).expect("where"),
            "WHERE `name` = 'O\\'Brien' AND `age` = '40'"
        );
        assert_eq!(
            clause_like(&MysqlEscape, &Matches::pair("name", "St%")).expect("like"),
            "WHERE `name` LIKE 'St%'"
        );
    }

    #[test]
    fn test_clause_where_null() {
        assert_eq!(
            clause_where(&MysqlEscape, &Matches::pair("deleted", Null())).expect("where"),
            "WHERE `deleted` = ''"
        );
    }

    #[test]
    fn test_matches_constructors() {
        let zipped = Matches::zip(vec!["a", "b"], vec![1, 2]).expect("zip");
        let listed: Matches = vec![("a", 1), ("b", 2)].into_iter().collect();
        let converted: Matches = ("a", 1).into();

        assert_eq!(zipped, listed);
        assert_eq!(converted.get("a"), Some(&Value::Integer(1)));
        assert!(Matches::zip(vec!["a", "b"], vec![1]).is_err());

        let dup = Matches::pair("a", 1).and("b", 2).and("a", 3);
        assert_eq!(dup.iter().map(|(c, _)| c).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(dup.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_empty_matches_are_rejected() {
        assert!(clause_where(&MysqlEscape, &Matches::new()).is_err());
        assert!(clause_like(&MysqlEscape, &Matches::new()).is_err());
        assert!(clause_set(&MysqlEscape, &Row::new()).is_err());
    }

    #[test]
    fn test_clause_id() {
        assert_eq!(clause_id(&7), "WHERE `id` = 7");
        assert_eq!(clause_id("12; DROP TABLE x"), "WHERE `id` = 12");
        assert_eq!(clause_id("abc"), "WHERE `id` = 0");
    }

    #[test]
    fn test_clause_set() {
        let mut row = Row::new();
        row.set("name", "Bob");
        row.set("note", "say \"hi\"");

        assert_eq!(
            clause_set(&MysqlEscape, &row).expect("set"),
            "SET `name` = 'Bob', `note` = 'say \\\"hi\\\"'"
        );
    }

    #[test]
    fn test_clause_order() {
        assert_eq!(clause_order(&Sort::None), "");
        assert_eq!(clause_order(&"name".into()), "ORDER BY `name`");
        assert_eq!(clause_order(&Sort::Columns(vec![])), "");
        assert_eq!(
            clause_order(&vec![SortKey::new("a"), SortKey::desc("b"), SortKey::asc("c")].into()),
            "ORDER BY `a`, `b` DESC, `c` ASC"
        );
        assert_eq!(clause_order(&Sort::from(None::<&str>)), "");
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("desc".parse::<Direction>().expect("desc"), Direction::Desc);
        assert_eq!(" Asc ".parse::<Direction>().expect("asc"), Direction::Asc);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
