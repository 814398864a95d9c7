//! UPDATE statement builder.

use std::fmt;

use super::base::{execute, parameters, render, ClauseDef, StatementState};
use super::common::{join_clause, resolve_joins, JOIN, LIMIT, ORDER_BY, WHERE};
use super::Statement;
use crate::error::{Error, Result};
use crate::literal::Literal;
use crate::query::Query;
use crate::value::{SqlValue, ToSqlValue};

const UPDATE: &str = "UPDATE";
const SET: &str = "SET";

const CLAUSES: &[ClauseDef] = &[
    ClauseDef::scalar(UPDATE),
    ClauseDef::renderer(JOIN, join_clause),
    ClauseDef::separator(SET, ", "),
    ClauseDef::separator(WHERE, " AND "),
    ClauseDef::separator(ORDER_BY, ", "),
    ClauseDef::scalar(LIMIT),
];

/// An UPDATE statement.
///
/// Refuses to run without a WHERE condition.
#[derive(Debug, Clone)]
pub struct Update<'q> {
    query: &'q Query,
    state: StatementState,
}

impl<'q> Update<'q> {
    pub(crate) fn new(query: &'q Query, table: &str) -> Self {
        let mut state = StatementState::new(table);
        state.set_scalar(UPDATE, table.trim());
        Self { query, state }
    }

    /// Sets one column. A null value renders `column = NULL`.
    #[must_use]
    pub fn set<T: ToSqlValue>(mut self, column: &str, value: T) -> Self {
        let value = match value.to_sql_value() {
            SqlValue::Null => SqlValue::Literal(Literal::null()),
            other => other,
        };
        self.state.assign(SET, column, value);
        self
    }

    /// Sets several columns. A column set again keeps its position and
    /// takes the new value.
    #[must_use]
    pub fn set_all<I, K, V>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToSqlValue,
    {
        for (column, value) in assignments {
            self = self.set(column.as_ref(), value);
        }
        self
    }

    /// Runs the statement and returns the number of affected rows.
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
                "UPDATE queries must contain a WHERE clause to prevent unwanted data loss",
            ));
        }
        Ok(execute(self.query, self)?.map(|outcome| outcome.rows_affected))
    }
}

impl_common_clauses!(Update);

impl Statement for Update<'_> {
    fn render(&self) -> String {
        render(CLAUSES, &resolve_joins(&self.state, self.query.structure()))
    }

    fn parameters(&self) -> Vec<SqlValue> {
        parameters(CLAUSES, &self.state, self.query.config().convert_write())
    }
}

impl fmt::Display for Update<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_formatted())
    }
}
