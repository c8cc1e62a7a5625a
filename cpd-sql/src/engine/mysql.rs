use mysql::{Opts, Pool, Value as MySqlValue};

use super::Engine;

use crate::error::{ErrorKind, Result};
use crate::escape::{Escape, MysqlEscape};
use crate::types::{Column, Row, Rows, ToValue, Value};

const NAME: &str = "mysql";

/// Runs queries over the text protocol on a `mysql::Pool`.
pub struct MysqlEngine {
    pool: Pool,
}

impl MysqlEngine {
    pub fn new(url: &str) -> Result<Self> {
        let opts = Opts::from_url(url).map_err(|e| ErrorKind::engine(NAME, e))?;
        let pool = Pool::new(opts).map_err(|e| ErrorKind::engine(NAME, e))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl Escape for MysqlEngine {
    fn escape_string(&self, data: &str) -> String {
        MysqlEscape.escape_string(data)
    }
}

impl Engine for MysqlEngine {
    fn name(&self) -> &'static str {
        NAME
    }

    fn execute(&mut self, sql: &str) -> Result<Rows> {
        let mut conn = self.pool.get_conn().map_err(|e| ErrorKind::engine(NAME, e))?;
        let result = conn.query(sql).map_err(|e| ErrorKind::engine(NAME, e))?;

        let column_names: Vec<String> = result
            .columns_ref()
            .iter()
            .map(|c| c.name_str().to_string())
            .collect();

        let mut rows = Rows::new(column_names.clone());
        rows.set_affected_rows(result.affected_rows());

        for driver_row in result {
            let driver_row = driver_row.map_err(|e| ErrorKind::engine(NAME, e))?;
            let mut row = Row::new();

            for (i, name) in column_names.iter().enumerate() {
                let v = driver_row.as_ref(i).map(value).unwrap_or(Value::Null);

                row.push_column(Column::new(name.as_str(), v));
            }

            rows.push_row(row);
        }

        Ok(rows)
    }
}

fn value(v: &MySqlValue) -> Value {
    match v {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(b) => match String::from_utf8(b.to_vec()) {
            Ok(s) => Value::Text(s),
            Err(e) => Value::Blob(e.into_bytes()),
        },
        MySqlValue::Int(i) => Value::Integer(*i),
        MySqlValue::UInt(u) => u.to_value(),
        MySqlValue::Float(f) => Value::Real(*f),
        MySqlValue::Date(year, month, day, hour, minutes, seconds, micro_seconds) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minutes, seconds
            );

            if *micro_seconds > 0 {
                text.push_str(&format!(".{:06}", micro_seconds));
            }

            Value::Text(text)
        }
        MySqlValue::Time(is_negative, days, hours, minutes, seconds, micro_seconds) => {
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if *is_negative { "-" } else { "" },
                days * 24 + u32::from(*hours),
                minutes,
                seconds
            );

            if *micro_seconds > 0 {
                text.push_str(&format!(".{:06}", micro_seconds));
            }

            Value::Text(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{value, MysqlEngine};

    use crate::engine::Engine;
    use crate::types::Value;
    use crate::tests::quiet_config;
    use crate::{values, CpdSql, Matches, Select};

    use dotenv::dotenv;
    use mysql::Value as MySqlValue;
    use std::env;

    #[test]
    fn test_value_mapping() {
        assert_eq!(value(&MySqlValue::NULL), Value::Null);
        assert_eq!(value(&MySqlValue::Bytes(b"abc".to_vec())), Value::Text("abc".into()));
        assert_eq!(value(&MySqlValue::UInt(7)), Value::Integer(7));
        assert_eq!(
            value(&MySqlValue::Date(2019, 4, 1, 13, 5, 9, 0)),
            Value::Text("2019-04-01 13:05:09".into())
        );
        assert_eq!(
            value(&MySqlValue::Time(true, 1, 2, 3, 4, 0)),
            Value::Text("-26:03:04".into())
        );
    }

    fn engine() -> Option<MysqlEngine> {
        dotenv().ok();

        let url = env::var("MYSQL_DATABASE_URL").ok()?;

        Some(MysqlEngine::new(&url).expect("connect to MYSQL_DATABASE_URL"))
    }

    #[test]
    fn test_round_trip() {
        let engine = match engine() {
            Some(e) => e,
            None => return,
        };

        let mut sql = CpdSql::new(engine, quiet_config()).expect("cpdsql");

        sql.execute("DROP TABLE IF EXISTS cpd_person").expect("drop");
        sql.execute(
            "CREATE TABLE cpd_person (
                id INT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(50) NOT NULL,
                data VARCHAR(50) NOT NULL DEFAULT 'none'
            )",
        )
        .expect("create");

        let mut row = crate::types::Row::new();
        row.set("name", "O'Brien");
        row.set("data", "a\"b");
        sql.insert("cpd_person", &row).expect("insert");

        let found = sql
            .row(&Select::where_("cpd_person", Matches::pair("name", "O'Brien")))
            .expect("row")
            .expect("a row");
        assert_eq!(found.get("data"), Some(&Value::Text("a\"b".into())));

        let count = sql
            .value(&Select::raw(
                "SELECT COUNT(*) FROM cpd_person WHERE name LIKE '%s'",
                values!["O%"],
            ))
            .expect("value");
        assert_eq!(count.map(|v| v.to_integer()), Some(1));

        assert_eq!(sql.verify_table("cpd_person").expect("verify"), "cpd_person");
        assert!(sql.verify_column("cpd_person", "missing").is_err());

        let defaults = sql.default_row("cpd_person").expect("default row");
        assert_eq!(defaults.get("data"), Some(&Value::Text("none".into())));

        sql.delete_all("cpd_person").expect("truncate");
        assert!(!sql.exists(&Select::all("cpd_person")).expect("exists"));

        assert_eq!(sql.engine().name(), "mysql");
    }
}
