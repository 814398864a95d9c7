//! Entry point: creates statements bound to a connection.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::builder::{Delete, Insert, Select, Statement, Update};
use crate::connection::{Connection, ErrorMode};
use crate::error::{Error, Result};
use crate::structure::Structure;
use crate::value::ToSqlValue;

/// Callback invoked with every statement right before it is executed.
pub type DebugHook = Arc<dyn Fn(&dyn Statement) + Send + Sync>;

/// Plain settings of a [`Query`], loadable from a configuration file.
///
/// ```rust
/// use fluent_sql::Options;
///
/// let options: Options = serde_json::from_str(
///     r#"{ "convert_write": true, "table_prefix": "app", "table_separator": "_" }"#,
/// )?;
/// assert!(options.convert_write);
/// assert_eq!(options.exception_on_error, None);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Convert numeric text read from numeric columns into numbers.
    pub convert_read: bool,
    /// Convert booleans and structured values into driver-friendly values.
    pub convert_write: bool,
    /// Return driver failures as errors. Unset keeps the mode inherited from
    /// the connection.
    pub exception_on_error: Option<bool>,
    /// Prefix prepended to every table name.
    pub table_prefix: String,
    /// Inserted between the prefix and the table name.
    pub table_separator: String,
}

/// Settings shared by every statement created from one [`Query`].
#[derive(Clone, Default)]
pub struct QueryConfig {
    convert_read: bool,
    convert_write: bool,
    exception_on_error: bool,
    table_prefix: String,
    table_separator: String,
    debug: Option<DebugHook>,
}

impl QueryConfig {
    /// Whether numeric text is converted on read.
    #[must_use]
    pub const fn convert_read(&self) -> bool {
        self.convert_read
    }

    /// Whether parameters are converted on write.
    #[must_use]
    pub const fn convert_write(&self) -> bool {
        self.convert_write
    }

    /// Whether driver failures are returned as errors.
    #[must_use]
    pub const fn exception_on_error(&self) -> bool {
        self.exception_on_error
    }

    /// The debug hook, if any.
    #[must_use]
    pub const fn debug_hook(&self) -> Option<&DebugHook> {
        self.debug.as_ref()
    }

    /// Applies the full table name: prefix, separator, table.
    #[must_use]
    pub fn full_table_name(&self, table: &str) -> String {
        format!("{}{}{}", self.table_prefix, self.table_separator, table.trim())
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("convert_read", &self.convert_read)
            .field("convert_write", &self.convert_write)
            .field("exception_on_error", &self.exception_on_error)
            .field("table_prefix", &self.table_prefix)
            .field("table_separator", &self.table_separator)
            .field("debug", &self.debug.is_some())
            .finish()
    }
}

/// Creates SELECT, INSERT, UPDATE and DELETE statements on one connection.
///
/// Configuration methods consume and return the query; statements borrow
/// it, so configure first and build afterwards.
#[derive(Clone)]
pub struct Query {
    connection: Arc<dyn Connection>,
    structure: Structure,
    config: QueryConfig,
}

impl Query {
    /// Creates a query with the default key naming (`id`, `<table>_id`).
    ///
    /// Failures are returned as errors when the connection itself raises.
    #[must_use]
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self::with_structure(connection, Structure::default())
    }

    /// Creates a query with custom key naming.
    #[must_use]
    pub fn with_structure(connection: Arc<dyn Connection>, structure: Structure) -> Self {
        let config = QueryConfig {
            exception_on_error: connection.error_mode() == ErrorMode::Raise,
            ..QueryConfig::default()
        };
        Self {
            connection,
            structure,
            config,
        }
    }

    /// Applies plain settings.
    #[must_use]
    pub fn with_options(mut self, options: &Options) -> Self {
        self.config.convert_read = options.convert_read;
        self.config.convert_write = options.convert_write;
        if let Some(raise) = options.exception_on_error {
            self.config.exception_on_error = raise;
        }
        self.config.table_prefix.clone_from(&options.table_prefix);
        self.config.table_separator.clone_from(&options.table_separator);
        self
    }

    /// Calls `hook` with every statement before it runs.
    #[must_use]
    pub fn debug(mut self, hook: impl Fn(&dyn Statement) + Send + Sync + 'static) -> Self {
        self.config.debug = Some(Arc::new(hook));
        self
    }

    /// Sets read and write conversion at once.
    #[must_use]
    pub fn convert_types(self, read: bool, write: bool) -> Self {
        self.convert_read_types(read).convert_write_types(write)
    }

    /// Converts numeric text from numeric columns into numbers.
    #[must_use]
    pub fn convert_read_types(mut self, enabled: bool) -> Self {
        self.config.convert_read = enabled;
        self
    }

    /// Binds booleans as `0`/`1` and structured values as JSON text.
    #[must_use]
    pub fn convert_write_types(mut self, enabled: bool) -> Self {
        self.config.convert_write = enabled;
        self
    }

    /// Returns driver failures as errors instead of logging them.
    #[must_use]
    pub fn throw_exception_on_error(mut self, enabled: bool) -> Self {
        self.config.exception_on_error = enabled;
        self
    }

    /// Prefixes every table name: `prefix + separator + table`.
    #[must_use]
    pub fn table_prefix(mut self, prefix: &str, separator: &str) -> Self {
        self.config.table_prefix = prefix.to_string();
        self.config.table_separator = separator.to_string();
        self
    }

    /// The connection statements run on.
    #[must_use]
    pub fn connection(&self) -> &dyn Connection {
        self.connection.as_ref()
    }

    /// The key naming rules.
    #[must_use]
    pub const fn structure(&self) -> &Structure {
        &self.structure
    }

    /// The shared settings.
    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Starts a SELECT on `table` (`"article"` or `"article AS a"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn from(&self, table: &str) -> Result<Select<'_>> {
        Ok(Select::new(self, &self.table_name(table)?))
    }

    /// Starts a SELECT of the row with primary key `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn from_key<T: ToSqlValue>(&self, table: &str, key: T) -> Result<Select<'_>> {
        let select = self.from(table)?;
        let condition = format!(
            "{}.{}",
            select.from_alias(),
            self.structure.primary_key(select.from_table())
        );
        select.where_(&condition, key)
    }

    /// Starts an INSERT into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn insert_into(&self, table: &str) -> Result<Insert<'_>> {
        Ok(Insert::new(self, &self.table_name(table)?))
    }

    /// Starts an UPDATE of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn update(&self, table: &str) -> Result<Update<'_>> {
        Ok(Update::new(self, &self.table_name(table)?))
    }

    /// Starts an UPDATE of the row with primary key `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn update_key<T: ToSqlValue>(&self, table: &str, key: T) -> Result<Update<'_>> {
        let primary_key = self.primary_key(table)?;
        self.update(table)?.where_(&primary_key, key)
    }

    /// Starts a DELETE from `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn delete(&self, table: &str) -> Result<Delete<'_>> {
        Ok(Delete::new(self, &self.table_name(table)?))
    }

    /// Same as [`Self::delete`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn delete_from(&self, table: &str) -> Result<Delete<'_>> {
        self.delete(table)
    }

    /// Starts a DELETE of the row with primary key `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `table` is blank.
    pub fn delete_key<T: ToSqlValue>(&self, table: &str, key: T) -> Result<Delete<'_>> {
        let primary_key = self.primary_key(table)?;
        self.delete(table)?.where_(&primary_key, key)
    }

    // Primary key of the table behind `table`, alias dropped.
    fn primary_key(&self, table: &str) -> Result<String> {
        let name = self.table_name(table)?;
        let base = name.split_whitespace().next().unwrap_or(&name);
        Ok(self.structure.primary_key(base))
    }

    fn table_name(&self, table: &str) -> Result<String> {
        if table.trim().is_empty() {
            return Err(Error::configuration("table name cannot be empty"));
        }
        Ok(self.config.full_table_name(table))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("structure", &self.structure)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
