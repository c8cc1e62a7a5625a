use std::collections::VecDeque;

use super::{Engine, EngineKind};

use crate::error::{ErrorKind, Result};
use crate::escape::Escape;
use crate::types::Rows;

/// An engine that never connects anywhere.
///
/// Every executed statement is recorded, and answered with the next scripted
/// response (or an empty result set once the script runs out). Escaping
/// follows the dialect it was created for, so the SQL it records is exactly
/// what the real engine would have received.
#[derive(Debug, Default)]
pub struct DirectEngine {
    kind:      EngineKind,
    executed:  Vec<String>,
    responses: VecDeque<std::result::Result<Rows, String>>,
}

impl DirectEngine {
    pub fn new(kind: EngineKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Queues `rows` as the answer to a future statement.
    pub fn respond(&mut self, rows: Rows) -> &mut Self {
        self.responses.push_back(Ok(rows));
        self
    }

    /// Queues an engine error as the answer to a future statement.
    pub fn fail<M: Into<String>>(&mut self, message: M) -> &mut Self {
        self.responses.push_back(Err(message.into()));
        self
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Statements executed so far, oldest first.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn last_executed(&self) -> Option<&str> {
        self.executed.last().map(String::as_str)
    }

    pub fn take_executed(&mut self) -> Vec<String> {
        std::mem::replace(&mut self.executed, vec![])
    }
}

impl Escape for DirectEngine {
    fn escape_string(&self, data: &str) -> String {
        self.kind.escaper().escape_string(data)
    }
}

impl Engine for DirectEngine {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn execute(&mut self, sql: &str) -> Result<Rows> {
        self.executed.push(sql.to_string());

        match self.responses.pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(ErrorKind::engine(self.name(), message)),
            None => Ok(Rows::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DirectEngine;
    use crate::engine::{Engine, EngineKind};
    use crate::escape::Escape;
    use crate::types::Rows;

    #[test]
    fn test_scripted_responses() {
        let mut engine = DirectEngine::new(EngineKind::Mysql);

        engine.respond(Rows::affected(2)).fail("gone away");

        assert_eq!(engine.execute("DELETE FROM `t`").expect("first").affected_rows(), 2);

        let err = engine.execute("SELECT 1").expect_err("second");
        assert!(err.is_engine_error());
        assert_eq!(err.to_string(), "direct: gone away");

        assert!(engine.execute("SELECT 2").expect("third").is_empty());

        assert_eq!(engine.last_executed(), Some("SELECT 2"));
        assert_eq!(engine.take_executed().len(), 3);
        assert!(engine.executed().is_empty());
    }

    #[test]
    fn test_escapes_like_its_dialect() {
        assert_eq!(DirectEngine::new(EngineKind::Mysql).escape_string("\r"), "\\r");
        assert_eq!(DirectEngine::new(EngineKind::Odbc).escape_string("\r"), "\r");
    }
}
