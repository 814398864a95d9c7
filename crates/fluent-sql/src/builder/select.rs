//! SELECT statement builder.

use std::fmt;

use super::base::{execute, parameters, render, ClauseDef, StatementState};
use super::common::{
    add_condition, join_clause, resolve_joins, FROM, GROUP_BY, HAVING, JOIN, LIMIT, OFFSET,
    ORDER_BY, SELECT, WHERE,
};
use super::Statement;
use crate::connection::{ResultSet, Row};
use crate::error::Result;
use crate::query::Query;
use crate::value::{SqlValue, ToSqlValue};

const CLAUSES: &[ClauseDef] = &[
    ClauseDef::separator(SELECT, ", "),
    ClauseDef::scalar(FROM),
    ClauseDef::renderer(JOIN, join_clause),
    ClauseDef::separator(WHERE, " AND "),
    ClauseDef::separator(GROUP_BY, ", "),
    ClauseDef::separator(HAVING, " AND "),
    ClauseDef::separator(ORDER_BY, ", "),
    ClauseDef::scalar(LIMIT),
    ClauseDef::scalar(OFFSET),
];

/// A SELECT statement.
///
/// Selects `<table>.*` until columns are added or replaced. Columns and
/// conditions referring to other tables (`author.name`) join them
/// automatically.
#[derive(Debug, Clone)]
pub struct Select<'q> {
    query: &'q Query,
    state: StatementState,
}

impl<'q> Select<'q> {
    pub(crate) fn new(query: &'q Query, table: &str) -> Self {
        let mut state = StatementState::new(table);
        state.set_scalar(FROM, table.trim());
        let all = format!("{}.*", state.alias());
        state.push(SELECT, all, None);
        Self { query, state }
    }

    /// The selected table, without its alias.
    #[must_use]
    pub fn from_table(&self) -> &str {
        self.state.base_table()
    }

    /// The name the selected table goes by in this statement.
    #[must_use]
    pub fn from_alias(&self) -> &str {
        self.state.alias()
    }

    /// Adds columns or expressions to the select list.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.state.push(SELECT, columns, None);
        self
    }

    /// Replaces the select list, default `<table>.*` included.
    #[must_use]
    pub fn select_only(self, columns: &str) -> Self {
        self.clear_select().select(columns)
    }

    /// Empties the select list.
    #[must_use]
    pub fn clear_select(mut self) -> Self {
        self.state.reset(SELECT);
        self
    }

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expression: &str) -> Self {
        self.state.push(GROUP_BY, expression, None);
        self
    }

    /// Adds a raw HAVING condition.
    #[must_use]
    pub fn having_raw(mut self, condition: &str) -> Self {
        self.state.push(HAVING, condition, None);
        self
    }

    /// Adds a HAVING condition, with the same value rules as `where_`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] for an empty list value.
    pub fn having<T: ToSqlValue>(mut self, condition: &str, value: T) -> Result<Self> {
        add_condition(
            &mut self.state,
            HAVING,
            None,
            condition,
            value.to_sql_value(),
            false,
        )?;
        Ok(self)
    }

    /// Sets the OFFSET.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.state.set_scalar(OFFSET, offset.to_string());
        self
    }

    /// Runs the statement and returns the first row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch(&self) -> Result<Option<Row>> {
        Ok(self
            .result_set()?
            .and_then(|result| result.rows.into_iter().next()))
    }

    /// Runs the statement and returns one column of the first row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch_value(&self, column: &str) -> Result<Option<SqlValue>> {
        Ok(self.fetch()?.and_then(|row| row.get(column).cloned()))
    }

    /// Runs the statement and returns every row.
    ///
    /// A failed statement in silent mode yields no rows.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch_all(&self) -> Result<Vec<Row>> {
        Ok(self
            .result_set()?
            .map(|result| result.rows)
            .unwrap_or_default())
    }

    /// Runs the statement and returns every row keyed by a column.
    ///
    /// Rows without that column are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch_keyed(&self, column: &str) -> Result<Vec<(SqlValue, Row)>> {
        let rows = self.fetch_all()?;
        Ok(rows
            .into_iter()
            .filter_map(|row| Some((row.get(column)?.clone(), row)))
            .collect())
    }

    /// Selects only `key` and `value` and returns them as pairs.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch_pairs(&self, key: &str, value: &str) -> Result<Vec<(SqlValue, SqlValue)>> {
        let rows = self.clone().select_only(key).select(value).fetch_all()?;
        Ok(rows
            .iter()
            .filter_map(|row| Some((row.get_index(0)?.clone(), row.get_index(1)?.clone())))
            .collect())
    }

    /// Runs the statement and returns the column at a zero-based position
    /// from every row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn fetch_column(&self, index: usize) -> Result<Vec<SqlValue>> {
        let rows = self.fetch_all()?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get_index(index).cloned())
            .collect())
    }

    /// Counts the rows this statement would return.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Driver`] when the statement fails and the
    /// query returns driver failures as errors.
    pub fn count(&self) -> Result<u64> {
        let counted = Counted { select: self };
        let Some(outcome) = execute(self.query, &counted)? else {
            return Ok(0);
        };
        let count = outcome
            .result
            .rows
            .first()
            .and_then(|row| row.get_index(0))
            .and_then(|value| value.clone().into_numeric().as_int())
            .and_then(|count| u64::try_from(count).ok())
            .unwrap_or(0);
        Ok(count)
    }

    fn result_set(&self) -> Result<Option<ResultSet>> {
        let Some(outcome) = execute(self.query, self)? else {
            return Ok(None);
        };
        if self.query.config().convert_read() {
            Ok(Some(outcome.result.with_numeric_values()))
        } else {
            Ok(Some(outcome.result))
        }
    }
}

impl_common_clauses!(Select);

impl Statement for Select<'_> {
    fn render(&self) -> String {
        render(CLAUSES, &resolve_joins(&self.state, self.query.structure()))
    }

    fn parameters(&self) -> Vec<SqlValue> {
        parameters(CLAUSES, &self.state, self.query.config().convert_write())
    }
}

impl fmt::Display for Select<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_formatted())
    }
}

/// `SELECT COUNT(*)` over a select.
struct Counted<'s, 'q> {
    select: &'s Select<'q>,
}

impl Statement for Counted<'_, '_> {
    fn render(&self) -> String {
        format!("SELECT COUNT(*) FROM ({}) AS counted", self.select.render())
    }

    fn parameters(&self) -> Vec<SqlValue> {
        self.select.parameters()
    }
}
