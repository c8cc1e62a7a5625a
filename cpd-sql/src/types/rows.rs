use super::value::{ToValue, Value};

#[cfg(feature = "composer-serde")]
use serde::ser::{Serialize, SerializeMap, Serializer};

use std::iter::FromIterator;

/// A fully read result set, in the order the engine returned it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rows {
    rows:          Vec<Row>,
    column_names:  Vec<String>,
    affected_rows: u64,
}

impl Rows {
    pub fn new(cn: Vec<String>) -> Self {
        Rows {
            rows:          vec![],
            column_names:  cn,
            affected_rows: 0,
        }
    }

    /// The outcome of a statement that returns no rows.
    pub fn affected(count: u64) -> Self {
        Rows {
            affected_rows: count,
            ..Default::default()
        }
    }

    pub fn push_row(&mut self, r: Row) {
        self.rows.push(r);
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows changed by an `INSERT`, `UPDATE`, `DELETE` or similar, when the
    /// engine reports it.
    pub fn affected_rows(&self) -> u64 {
        self.affected_rows
    }

    pub fn set_affected_rows(&mut self, count: u64) {
        self.affected_rows = count;
    }
}

impl IntoIterator for Rows {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

/// One record: named columns in a fixed order.
///
/// Result rows, default rows and the data handed to `insert`/`update` all
/// use this type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    columns: Vec<Column>,
}

impl Row {
    pub fn new() -> Self {
        Row { columns: vec![] }
    }

    pub fn push_column(&mut self, c: Column) {
        self.columns.push(c);
    }

    /// Sets `name` to `value`, replacing an existing column of that name in
    /// place or appending a new one.
    pub fn set<N: Into<String>, V: ToValue>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.to_value();

        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(c) => c.value = value,
            None => self.columns.push(Column::new(name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let i = self.columns.iter().position(|c| c.name == name)?;

        Some(self.columns.remove(i).value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn first_value(&self) -> Option<&Value> {
        self.columns.first().map(|c| &c.value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut row = Row::new();

        for (name, value) in iter {
            row.set(name, value);
        }

        row
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name:  String,
    value: Value,
}

impl Column {
    pub fn new<N: Into<String>>(name: N, v: Value) -> Self {
        Column {
            name:  name.into(),
            value: v,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

// columns are written in result order, not sorted by name
#[cfg(feature = "composer-serde")]
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;

        for c in &self.columns {
            map.serialize_entry(&c.name, &serde_value::Value::from(c.value.clone()))?;
        }

        map.end()
    }
}

#[cfg(feature = "composer-serde")]
impl Serialize for Rows {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.rows)
    }
}
