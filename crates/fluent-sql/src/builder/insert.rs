//! INSERT statement builder.

use std::fmt;

use super::base::{execute, parameters, render, ClauseContent, ClauseDef, StatementState};
use super::Statement;
use crate::error::Result;
use crate::query::Query;
use crate::value::{SqlValue, ToSqlValue};

const INSERT_INTO: &str = "INSERT INTO";
const VALUES: &str = "VALUES";
const ON_DUPLICATE_KEY_UPDATE: &str = "ON DUPLICATE KEY UPDATE";

const IGNORE: &str = "IGNORE";
const DELAYED: &str = "DELAYED";

const CLAUSES: &[ClauseDef] = &[
    ClauseDef::renderer(INSERT_INTO, insert_into_clause),
    ClauseDef::renderer(VALUES, values_clause),
    ClauseDef::separator(ON_DUPLICATE_KEY_UPDATE, ", "),
];

fn insert_into_clause(state: &StatementState) -> Option<String> {
    let mut clause = String::from("INSERT");
    for modifier in [IGNORE, DELAYED] {
        if state.has_modifier(modifier) {
            clause.push(' ');
            clause.push_str(modifier);
        }
    }
    (!state.table().is_empty()).then(|| format!("{clause} INTO {}", state.table()))
}

fn values_clause(state: &StatementState) -> Option<String> {
    let Some(ClauseContent::Rows { columns, rows }) = state.content(VALUES) else {
        return None;
    };
    let rows: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(SqlValue::sql_fragment).collect();
            format!("({})", values.join(", "))
        })
        .collect();
    Some(format!("({}) VALUES {}", columns.join(", "), rows.join(", ")))
}

/// An INSERT statement.
///
/// Rows are given as `(column, value)` pairs and must all name the same
/// columns in the same order. Literal values are inlined; everything else is
/// bound.
#[derive(Debug, Clone)]
pub struct Insert<'q> {
    query: &'q Query,
    state: StatementState,
}

impl<'q> Insert<'q> {
    pub(crate) fn new(query: &'q Query, table: &str) -> Self {
        Self {
            query,
            state: StatementState::new(table),
        }
    }

    /// Adds one row. An empty row is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when the row's columns differ
    /// from the first row's.
    pub fn values<I, K, V>(mut self, row: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        let row: Vec<(String, SqlValue)> = row
            .into_iter()
            .map(|(column, value)| (column.into(), value.to_sql_value()))
            .collect();
        if !row.is_empty() {
            self.state.push_row(VALUES, row)?;
        }
        Ok(self)
    }

    /// Adds several rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] when a row's columns differ
    /// from the first row's.
    pub fn values_many<R, I, K, V>(mut self, rows: R) -> Result<Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        for row in rows {
            self = self.values(row)?;
        }
        Ok(self)
    }

    /// Adds `ON DUPLICATE KEY UPDATE` assignments. A column assigned again
    /// keeps its position and takes the new value.
    #[must_use]
    pub fn on_duplicate_key_update<I, K, V>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToSqlValue,
    {
        for (column, value) in assignments {
            self.state
                .assign(ON_DUPLICATE_KEY_UPDATE, column, value.to_sql_value());
        }
        self
    }

    /// Renders `INSERT IGNORE`.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.state.add_modifier(IGNORE);
        self
    }

    /// Renders `INSERT DELAYED`.
    #[must_use]
    pub fn delayed(mut self) -> Self {
        self.state.add_modifier(DELAYED);
        self
    }

    /// Runs the statement and returns the generated identifier.
    ///
    /// `None` when the driver reports no identifier or, in silent mode, when
    /// the statement failed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn execute(&self) -> Result<Option<i64>> {
        Ok(execute(self.query, self)?.and_then(|outcome| outcome.last_insert_id))
    }

    /// Runs the statement and reports whether it succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn execute_without_id(&self) -> Result<bool> {
        Ok(execute(self.query, self)?.is_some())
    }
}

impl Statement for Insert<'_> {
    fn render(&self) -> String {
        render(CLAUSES, &self.state)
    }

    fn parameters(&self) -> Vec<SqlValue> {
        parameters(CLAUSES, &self.state, self.query.config().convert_write())
    }
}

impl fmt::Display for Insert<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_formatted())
    }
}
