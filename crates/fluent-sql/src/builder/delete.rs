//! DELETE statement builder.

use std::fmt;

use super::base::{execute, parameters, render, ClauseDef, StatementState};
use super::common::{join_clause, resolve_joins, FROM, JOIN, LIMIT, ORDER_BY, WHERE};
use super::Statement;
use crate::error::{Error, Result};
use crate::query::Query;
use crate::value::SqlValue;

const IGNORE: &str = "IGNORE";

const CLAUSES: &[ClauseDef] = &[
    ClauseDef::renderer("DELETE FROM", delete_from_clause),
    ClauseDef::renderer("DELETE", delete_clause),
    ClauseDef::scalar(FROM),
    ClauseDef::renderer(JOIN, join_clause),
    ClauseDef::separator(WHERE, " AND "),
    ClauseDef::separator(ORDER_BY, ", "),
    ClauseDef::scalar(LIMIT),
];

fn delete_keyword(state: &StatementState) -> &'static str {
    if state.has_modifier(IGNORE) {
        "DELETE IGNORE"
    } else {
        "DELETE"
    }
}

// Single-table form, used unless `from` was called.
fn delete_from_clause(state: &StatementState) -> Option<String> {
    if state.has(FROM) {
        return None;
    }
    Some(format!("{} FROM {}", delete_keyword(state), state.table()))
}

// Multi-table form: `DELETE t FROM t JOIN ...`.
fn delete_clause(state: &StatementState) -> Option<String> {
    if !state.has(FROM) {
        return None;
    }
    Some(format!("{} {}", delete_keyword(state), state.table()))
}

/// A DELETE statement.
///
/// Refuses to run without a WHERE condition.
#[derive(Debug, Clone)]
pub struct Delete<'q> {
    query: &'q Query,
    state: StatementState,
}

impl<'q> Delete<'q> {
    pub(crate) fn new(query: &'q Query, table: &str) -> Self {
        Self {
            query,
            state: StatementState::new(table),
        }
    }

    /// Switches to the multi-table form `DELETE <table> FROM <from> ...`.
    #[must_use]
    pub fn from(mut self, table: &str) -> Self {
        self.state.set_scalar(FROM, table.trim());
        self
    }

    /// Renders `DELETE IGNORE`.
    #[must_use]
    pub fn ignore(mut self) -> Self {
        self.state.add_modifier(IGNORE);
        self
    }

    /// Runs the statement and returns the number of deleted rows.
    ///
    /// `None` when the statement failed in silent mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Safety`] without a WHERE condition, and
    /// [`Error::Driver`] when the statement fails and the query returns
    /// driver failures as errors.
    pub fn execute(&self) -> Result<Option<u64>> {
        if !self.state.has(WHERE) {
            return Err(Error::safety(
                "DELETE queries must contain a WHERE clause to prevent unwanted data loss",
            ));
        }
        Ok(execute(self.query, self)?.map(|outcome| outcome.rows_affected))
    }
}

impl_common_clauses!(Delete);

impl Statement for Delete<'_> {
    fn render(&self) -> String {
        render(CLAUSES, &resolve_joins(&self.state, self.query.structure()))
    }

    fn parameters(&self) -> Vec<SqlValue> {
        parameters(CLAUSES, &self.state, self.query.config().convert_write())
    }
}

impl fmt::Display for Delete<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_formatted())
    }
}
