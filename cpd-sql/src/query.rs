use cpd_log::Logger;

use crate::clause::{clause_id, clause_like, clause_order, clause_set, clause_where, Matches,
                    Sort};
use crate::composer::Composer;
use crate::config::SqlConfig;
use crate::engine::Engine;
use crate::error::{new_error, Error, ErrorKind, Result};
use crate::escape::quote_identifier;
use crate::types::{Row, Rows, ToValue, Value};

/// The condition half of a query: which rows of which table, in what order.
///
/// Combined with one of the result methods of `CpdSql` (`query`, `array`,
/// `row`, `value`, `count`, `exists`, `clause`) this covers every pairing of
/// condition and result shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Select {
    /// A formatted query template with its values; see `CpdSql::make`.
    Raw { query: String, values: Vec<Value> },
    /// ``SELECT * FROM `table` ``
    All { table: String, sort: Sort },
    /// ``SELECT * FROM `table` WHERE `c` = 'v'``
    Where {
        table:   String,
        matches: Matches,
        sort:    Sort,
    },
    /// ``SELECT * FROM `table` WHERE `c` LIKE 'v'``
    Like {
        table:   String,
        matches: Matches,
        sort:    Sort,
    },
    /// ``SELECT * FROM `table` WHERE `id` = n``
    Id {
        table: String,
        id:    Value,
        sort:  Sort,
    },
}

impl Select {
    pub fn raw<Q: Into<String>>(query: Q, values: Vec<Value>) -> Self {
        Select::Raw {
            query: query.into(),
            values,
        }
    }

    pub fn all<T: Into<String>>(table: T) -> Self {
        Select::All {
            table: table.into(),
            sort:  Sort::None,
        }
    }

    pub fn where_<T: Into<String>, M: Into<Matches>>(table: T, matches: M) -> Self {
        Select::Where {
            table:   table.into(),
            matches: matches.into(),
            sort:    Sort::None,
        }
    }

    pub fn like<T: Into<String>, M: Into<Matches>>(table: T, matches: M) -> Self {
        Select::Like {
            table:   table.into(),
            matches: matches.into(),
            sort:    Sort::None,
        }
    }

    pub fn id<T: Into<String>, V: ToValue>(table: T, id: V) -> Self {
        Select::Id {
            table: table.into(),
            id:    id.to_value(),
            sort:  Sort::None,
        }
    }

    /// The table of a generated query; empty for raw queries.
    pub fn table(&self) -> &str {
        match self {
            Select::Raw { .. } => "",
            Select::All { table, .. }
            | Select::Where { table, .. }
            | Select::Like { table, .. }
            | Select::Id { table, .. } => table,
        }
    }

    /// Sets the `ORDER BY` of a generated query. Raw queries carry their own
    /// and are left as they are.
    pub fn sorted<S: Into<Sort>>(mut self, sort: S) -> Self {
        match self {
            Select::Raw { .. } => {}
            Select::All { sort: ref mut s, .. }
            | Select::Where { sort: ref mut s, .. }
            | Select::Like { sort: ref mut s, .. }
            | Select::Id { sort: ref mut s, .. } => *s = sort.into(),
        }

        self
    }
}

// parts of a statement joined by single spaces, empty parts skipped
fn statement(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Injection aware queries against one engine.
///
/// Values only ever reach SQL through the formatter or the clause builders,
/// which escape them for the engine. Table and column names are quoted but
/// not checked; names that come from user input have to pass `verify_table`
/// or `verify_column` first.
///
/// Problems are logged to the files named in the configuration and returned
/// as errors, except that "no data" and "bare string" problems only stop a
/// query when `cpdsql_error.halt` is set.
pub struct CpdSql<E: Engine> {
    engine: E,
    config: SqlConfig,
    logger: Option<Logger>,
}

impl<E: Engine> CpdSql<E> {
    /// Creates the log directory when any logging is switched on.
    pub fn new(engine: E, config: SqlConfig) -> Result<Self> {
        let logger = if config.logs_anything() {
            Some(Logger::new(config.log.clone())?)
        }
        else {
            None
        };

        Ok(Self {
            engine,
            config,
            logger,
        })
    }

    pub fn config(&self) -> &SqlConfig {
        &self.config
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn escape_string(&self, data: &str) -> String {
        self.engine.escape_string(data)
    }

    fn composer(&self) -> Composer {
        Composer::new(&self.engine)
            .no_data_check(self.config.enable_no_data_error)
            .bare_string_check(self.config.enable_bare_string_error)
    }

    /// Formats `query`, replacing `%s`, `%d` and `%f` (optionally indexed,
    /// `%2$s`) with `values`; `%%` is a literal `%`.
    ///
    /// At least one value is required; constant queries pass `&[&Null()]`.
    pub fn make(&self, query: &str, values: &[&dyn ToValue]) -> Result<String> {
        self.make_for("make", query, values)
    }

    fn make_for(&self, op: &'static str, query: &str, values: &[&dyn ToValue]) -> Result<String> {
        let composer = self.composer();

        for problem in composer.check(query, values) {
            let problem = self.internal_error(op, problem);

            if self.config.cpdsql_error.halt {
                return Err(problem);
            }

            log::warn!("continuing after: {}", problem);
        }

        composer
            .substitute(query, values)
            .map_err(|e| self.internal_error(op, e))
    }

    /// The SQL text for `select`.
    pub fn make_select(&self, select: &Select) -> Result<String> {
        self.make_select_for("make_select", select)
    }

    fn make_select_for(&self, op: &'static str, select: &Select) -> Result<String> {
        match select {
            Select::Raw { query, values } => {
                let values: Vec<&dyn ToValue> = values.iter().map(|v| v as &dyn ToValue).collect();

                self.make_for(op, query, &values)
            }
            Select::All { table, sort } => Ok(statement(&[
                &select_from(table),
                &clause_order(sort),
            ])),
            Select::Where { table, sort, .. }
            | Select::Like { table, sort, .. }
            | Select::Id { table, sort, .. } => Ok(statement(&[
                &select_from(table),
                &self.clause_for(op, select)?,
                &clause_order(sort),
            ])),
        }
    }

    /// Only the `WHERE` clause of a where, like or id select.
    pub fn clause(&self, select: &Select) -> Result<String> {
        self.clause_for("clause", select)
    }

    fn clause_for(&self, op: &'static str, select: &Select) -> Result<String> {
        let clause = match select {
            Select::Where { matches, .. } => clause_where(&self.engine, matches),
            Select::Like { matches, .. } => clause_like(&self.engine, matches),
            Select::Id { id, .. } => Ok(clause_id(id)),
            Select::Raw { .. } | Select::All { .. } => Err(ErrorKind::invalid_input(
                "only where, like and id selects have a clause",
            )),
        };

        clause.map_err(|e| self.internal_error(op, e))
    }

    /// Runs `select` and returns the whole result.
    pub fn query(&mut self, select: &Select) -> Result<Rows> {
        self.query_for("query", select)
    }

    fn query_for(&mut self, op: &'static str, select: &Select) -> Result<Rows> {
        let sql = self.make_select_for(op, select)?;

        self.run(op, &sql)
    }

    pub fn array(&mut self, select: &Select) -> Result<Vec<Row>> {
        Ok(self.query_for("array", select)?.into_rows())
    }

    /// The first row of the result.
    pub fn row(&mut self, select: &Select) -> Result<Option<Row>> {
        Ok(self.query_for("row", select)?.into_iter().next())
    }

    /// The first column of the first row.
    pub fn value(&mut self, select: &Select) -> Result<Option<Value>> {
        Ok(self
            .query_for("value", select)?
            .into_iter()
            .next()
            .and_then(|row| row.columns().next().map(|c| c.value().clone())))
    }

    pub fn count(&mut self, select: &Select) -> Result<usize> {
        Ok(self.query_for("count", select)?.len())
    }

    pub fn exists(&mut self, select: &Select) -> Result<bool> {
        Ok(!self.query_for("exists", select)?.is_empty())
    }

    /// Runs finished SQL as is. Values must already be escaped.
    pub fn execute(&mut self, sql: &str) -> Result<Rows> {
        self.run("execute", sql)
    }

    fn run(&mut self, op: &'static str, sql: &str) -> Result<Rows> {
        if self.config.query.log {
            self.write_log(&self.config.query.log_file, sql);
        }

        log::debug!("{}: {}", self.engine.name(), sql);

        self.engine
            .execute(sql)
            .map_err(|e| self.engine_error(op, e))
    }

    /// ``TRUNCATE `table` ``
    pub fn delete_all(&mut self, table: &str) -> Result<Rows> {
        let sql = statement(&["TRUNCATE", &quote_identifier(table)]);

        self.run("delete_all", &sql)
    }

    pub fn delete_where<M: Into<Matches>>(&mut self, table: &str, matches: M) -> Result<Rows> {
        self.delete_matching("delete_where", &Select::where_(table, matches))
    }

    pub fn delete_like<M: Into<Matches>>(&mut self, table: &str, matches: M) -> Result<Rows> {
        self.delete_matching("delete_like", &Select::like(table, matches))
    }

    pub fn delete_id<V: ToValue>(&mut self, table: &str, id: V) -> Result<Rows> {
        self.delete_matching("delete_id", &Select::id(table, id))
    }

    fn delete_matching(&mut self, op: &'static str, select: &Select) -> Result<Rows> {
        let clause = self.clause_for(op, select)?;
        let sql = statement(&["DELETE FROM", &quote_identifier(select.table()), &clause]);

        self.run(op, &sql)
    }

    /// ``INSERT INTO `table` (`a`, `b`) VALUES ('x', 'y')``
    pub fn insert(&mut self, table: &str, data: &Row) -> Result<Rows> {
        self.insert_for("insert", table, data)
    }

    fn insert_for(&mut self, op: &'static str, table: &str, data: &Row) -> Result<Rows> {
        if data.is_empty() {
            return Err(self.internal_error(op, ErrorKind::invalid_input(format!(
                "nothing to insert into {}",
                quote_identifier(table)
            ))));
        }

        let columns: Vec<String> = data.names().map(quote_identifier).collect();
        let values: Vec<String> = data
            .columns()
            .map(|c| format!("'{}'", self.engine.escape_string(&c.value().to_text())))
            .collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(table),
            columns.join(", "),
            values.join(", ")
        );

        self.run(op, &sql)
    }

    /// Updates the row whose `key` column matches `data[key]` with every
    /// other column of `data`.
    pub fn update(&mut self, table: &str, key: &str, data: &Row) -> Result<Rows> {
        self.update_for("update", table, key, data)
    }

    fn update_for(&mut self, op: &'static str, table: &str, key: &str, data: &Row) -> Result<Rows> {
        let mut data = data.clone();

        let index = match data.remove(key) {
            Some(index) => index,
            None => {
                return Err(self.internal_error(op, ErrorKind::invalid_input(format!(
                    "update of {} without its key column {}",
                    quote_identifier(table),
                    quote_identifier(key)
                ))))
            }
        };

        self.update_matching(op, &Select::where_(table, (key, index)), &data)
    }

    pub fn update_where<M: Into<Matches>>(
        &mut self,
        table: &str,
        matches: M,
        data: &Row,
    ) -> Result<Rows> {
        self.update_matching("update_where", &Select::where_(table, matches), data)
    }

    pub fn update_like<M: Into<Matches>>(
        &mut self,
        table: &str,
        matches: M,
        data: &Row,
    ) -> Result<Rows> {
        self.update_matching("update_like", &Select::like(table, matches), data)
    }

    pub fn update_id<V: ToValue>(&mut self, table: &str, id: V, data: &Row) -> Result<Rows> {
        self.update_matching("update_id", &Select::id(table, id), data)
    }

    fn update_matching(&mut self, op: &'static str, select: &Select, data: &Row) -> Result<Rows> {
        let set = clause_set(&self.engine, data).map_err(|e| self.internal_error(op, e))?;
        let clause = self.clause_for(op, select)?;
        let sql = statement(&["UPDATE", &quote_identifier(select.table()), &set, &clause]);

        self.run(op, &sql)
    }

    /// Updates when `data[key]` holds a truthy value, otherwise inserts
    /// `data` without its key column.
    pub fn save(&mut self, table: &str, key: &str, data: &Row) -> Result<Rows> {
        if data.get(key).map_or(false, Value::is_truthy) {
            return self.update_for("save", table, key, data);
        }

        let mut data = data.clone();
        data.remove(key);

        self.insert_for("save", table, &data)
    }

    /// Deletes the rows matching `data[key]`, then inserts `data`.
    pub fn replace(&mut self, table: &str, key: &str, data: &Row) -> Result<Rows> {
        let index = match data.get(key) {
            Some(index) => index.clone(),
            None => {
                return Err(self.internal_error("replace", ErrorKind::invalid_input(format!(
                    "replace in {} without its key column {}",
                    quote_identifier(table),
                    quote_identifier(key)
                ))))
            }
        };

        self.delete_matching("replace", &Select::where_(table, (key, index)))?;

        self.insert_for("replace", table, data)
    }

    /// Column names of `table` mapped to their default values.
    pub fn default_row(&mut self, table: &str) -> Result<Row> {
        let columns = self.show_columns("default_row", table)?;

        Ok(columns
            .into_iter()
            .map(|c| {
                let name = c.get("Field").map(Value::to_text).unwrap_or_default();
                let default = c.get("Default").cloned().unwrap_or_default();

                (name, default)
            })
            .collect())
    }

    /// `table` itself when the database has a table of exactly that name.
    pub fn verify_table(&mut self, table: &str) -> Result<String> {
        let tables = self.run("verify_table", "SHOW TABLES")?;

        let found = tables
            .rows()
            .filter_map(|r| r.first_value())
            .any(|v| v.to_text() == table);

        if found {
            Ok(table.to_string())
        }
        else {
            let err = new_error(ErrorKind::VerifyTable(table.to_string()));

            Err(self.internal_error("verify_table", err))
        }
    }

    /// `column` itself when `table` has a column of exactly that name.
    pub fn verify_column(&mut self, table: &str, column: &str) -> Result<String> {
        let columns = self.show_columns("verify_column", table)?;

        let found = columns
            .rows()
            .filter_map(|r| r.get("Field"))
            .any(|v| v.to_text() == column);

        if found {
            Ok(column.to_string())
        }
        else {
            let err = new_error(ErrorKind::VerifyColumn {
                table:  table.to_string(),
                column: column.to_string(),
            });

            Err(self.internal_error("verify_column", err))
        }
    }

    fn show_columns(&mut self, op: &'static str, table: &str) -> Result<Rows> {
        let sql = statement(&["SHOW COLUMNS FROM", &quote_identifier(table)]);

        self.run(op, &sql)
    }

    // log entries end with the public operation that failed: `message [insert]`
    fn internal_error(&self, op: &str, err: Error) -> Error {
        if self.config.cpdsql_error.log {
            self.write_log(&self.config.cpdsql_error.log_file, &format!("{} [{}]", err, op));
        }

        err
    }

    fn engine_error(&self, op: &str, err: Error) -> Error {
        if self.config.engine_error.log {
            self.write_log(&self.config.engine_error.log_file, &format!("{} [{}]", err, op));
        }

        err
    }

    // a log that can not be written must not hide the error being logged
    fn write_log(&self, file: &str, text: &str) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.compact(file, text, true) {
                log::warn!("unable to write {}: {}", logger.filepath(file).display(), e);
            }
        }
    }
}

fn select_from(table: &str) -> String {
    format!("SELECT * FROM {}", quote_identifier(table))
}
