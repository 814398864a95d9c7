#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

use fluent_sql::{
    ColumnMeta, Connection, DriverError, ErrorMode, Outcome, Query, ResultSet, Row, SqlValue,
};

/// A connection replaying scripted outcomes and recording what it ran.
#[derive(Default)]
pub struct ScriptedConnection {
    mode: ErrorMode,
    replies: RefCell<VecDeque<Result<Outcome, DriverError>>>,
    executed: RefCell<Vec<(String, Vec<SqlValue>)>>,
}

impl ScriptedConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raising() -> Arc<Self> {
        Arc::new(Self {
            mode: ErrorMode::Raise,
            ..Self::default()
        })
    }

    pub fn reply(&self, outcome: Outcome) {
        self.replies.borrow_mut().push_back(Ok(outcome));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .borrow_mut()
            .push_back(Err(DriverError::new(message).with_code("HY000")));
    }

    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.executed.borrow().clone()
    }

    pub fn last_sql(&self) -> String {
        self.executed
            .borrow()
            .last()
            .map(|(sql, _)| sql.clone())
            .unwrap_or_default()
    }
}

impl Connection for ScriptedConnection {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Outcome, DriverError> {
        self.executed
            .borrow_mut()
            .push((sql.to_string(), params.to_vec()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(Outcome::default()))
    }

    fn error_mode(&self) -> ErrorMode {
        self.mode
    }
}

pub fn query(conn: &Arc<ScriptedConnection>) -> Query {
    Query::new(conn.clone())
}

pub fn text(value: &str) -> SqlValue {
    SqlValue::Text(value.to_string())
}

/// Rows of text values under the given `(name, native type)` columns.
pub fn rows(columns: &[(&str, &str)], values: &[&[&str]]) -> Outcome {
    let meta = columns
        .iter()
        .map(|(name, native)| ColumnMeta::new(*name, Some(*native)))
        .collect();
    let rows = values
        .iter()
        .map(|row| {
            columns
                .iter()
                .zip(row.iter())
                .map(|((name, _), value)| (*name, text(value)))
                .collect::<Row>()
        })
        .collect();
    Outcome {
        rows_affected: 0,
        last_insert_id: None,
        result: ResultSet::new(meta, rows),
    }
}

pub fn affected(rows_affected: u64) -> Outcome {
    Outcome {
        rows_affected,
        ..Outcome::default()
    }
}

pub fn inserted(id: i64) -> Outcome {
    Outcome {
        rows_affected: 1,
        last_insert_id: Some(id),
        ..Outcome::default()
    }
}
