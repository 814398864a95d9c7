//! Primary and foreign key naming conventions.
//!
//! Join inference never inspects the database schema. It derives key column
//! names from table names through a [`Structure`].

use std::fmt;
use std::sync::Arc;

/// How a key column name is derived from a table name.
#[derive(Clone)]
pub enum KeyRule {
    /// A template where the first `%s` is replaced by the table name.
    /// A template without `%s` is used as is.
    Template(String),
    /// A function computing the key name from the table name.
    Function(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl KeyRule {
    /// Creates a rule backed by a function.
    #[must_use]
    pub fn function(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    /// Applies the rule to a table name.
    #[must_use]
    pub fn apply(&self, table: &str) -> String {
        match self {
            Self::Template(template) => template.replacen("%s", table, 1),
            Self::Function(f) => f(table),
        }
    }
}

impl fmt::Debug for KeyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for KeyRule {
    fn from(template: &str) -> Self {
        Self::Template(String::from(template))
    }
}

impl From<String> for KeyRule {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

/// Schema hints: primary and foreign key naming rules.
///
/// The default names the primary key `id` and foreign keys `<table>_id`.
#[derive(Debug, Clone)]
pub struct Structure {
    primary_key: KeyRule,
    foreign_key: KeyRule,
}

impl Structure {
    /// Creates schema hints from two rules.
    #[must_use]
    pub fn new(primary_key: impl Into<KeyRule>, foreign_key: impl Into<KeyRule>) -> Self {
        Self {
            primary_key: primary_key.into(),
            foreign_key: foreign_key.into(),
        }
    }

    /// Primary key column of `table`.
    #[must_use]
    pub fn primary_key(&self, table: &str) -> String {
        self.primary_key.apply(table)
    }

    /// Column in other tables that references `table`.
    #[must_use]
    pub fn foreign_key(&self, table: &str) -> String {
        self.foreign_key.apply(table)
    }
}

impl Default for Structure {
    fn default() -> Self {
        Self::new("id", "%s_id")
    }
}
