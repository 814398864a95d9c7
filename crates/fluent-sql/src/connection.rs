//! The database seam.
//!
//! Statements are rendered by the builders and handed to a [`Connection`]
//! together with their bound parameters. The crate ships no driver; callers
//! implement the trait over the client library they use.

use std::cell::RefCell;

use crate::value::SqlValue;

/// Native column types whose text values are converted to numbers on read.
const NUMERIC_TYPES: &[&str] = &[
    "DECIMAL",
    "DOUBLE",
    "FLOAT",
    "INT24",
    "LONG",
    "LONGLONG",
    "NEWDECIMAL",
    "SHORT",
    "TINY",
];

/// How a connection wants driver failures reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Failures are logged and the operation yields an empty result.
    #[default]
    Silent,
    /// Failures are returned as [`crate::Error::Driver`].
    Raise,
}

/// Error reported by a driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DriverError {
    /// Driver-specific error code (SQLSTATE or vendor code).
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl DriverError {
    /// Creates an error without a code.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// Attaches a driver error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Metadata of a result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name as reported by the driver.
    pub name: String,
    /// Native type name (`LONG`, `VAR_STRING`, ...), when the driver knows it.
    pub native_type: Option<String>,
}

impl ColumnMeta {
    /// Creates column metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.map(String::from),
        }
    }

    /// Returns true when values of this column should be read as numbers.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.native_type.as_deref().is_some_and(|native| {
            NUMERIC_TYPES
                .iter()
                .any(|numeric| native.eq_ignore_ascii_case(numeric))
        })
    }
}

/// One result row: column names with their values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates a row from `(column, value)` pairs.
    #[must_use]
    pub const fn new(values: Vec<(String, SqlValue)>) -> Self {
        Self { values }
    }

    /// Returns the value of the named column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the value at a zero-based position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// Number of columns.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Rows returned by a statement, with their column metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column metadata, in select order.
    pub columns: Vec<ColumnMeta>,
    /// Result rows.
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Creates a result set.
    #[must_use]
    pub const fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Converts text in numeric-typed columns into numbers.
    #[must_use]
    pub(crate) fn with_numeric_values(self) -> Self {
        let numeric: Vec<&str> = self
            .columns
            .iter()
            .filter(|column| column.is_numeric())
            .map(|column| column.name.as_str())
            .collect();
        if numeric.is_empty() {
            return self;
        }
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(name, value)| {
                        let value = if numeric.contains(&name) {
                            value.clone().into_numeric()
                        } else {
                            value.clone()
                        };
                        (name, value)
                    })
                    .collect::<Row>()
            })
            .collect();
        Self {
            columns: self.columns,
            rows,
        }
    }
}

/// What the driver reports after running a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Number of rows changed by the statement.
    pub rows_affected: u64,
    /// Identifier generated by an INSERT, if any.
    pub last_insert_id: Option<i64>,
    /// Rows produced by the statement.
    pub result: ResultSet,
}

/// A database connection able to run parameterized statements.
pub trait Connection {
    /// Runs `sql` with `params` bound to its `?` placeholders, in order.
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Outcome, DriverError>;

    /// The error mode configured on the connection itself.
    fn error_mode(&self) -> ErrorMode {
        ErrorMode::Silent
    }
}

/// A connection that records statements instead of running them.
///
/// Every call succeeds with an empty [`Outcome`].
#[derive(Debug, Default)]
pub struct DryRun {
    statements: RefCell<Vec<(String, Vec<SqlValue>)>>,
}

impl DryRun {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements received so far, with their parameters.
    #[must_use]
    pub fn statements(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.statements.borrow().clone()
    }
}

impl Connection for DryRun {
    fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Outcome, DriverError> {
        self.statements
            .borrow_mut()
            .push((String::from(sql), params.to_vec()));
        Ok(Outcome::default())
    }
}
