//! # fluent-sql
//!
//! A fluent SQL statement builder with join inference.
//!
//! This crate provides:
//! - SELECT, INSERT, UPDATE and DELETE builders driven by chained calls
//! - Automatic JOINs from `table.column` (forward) and `table:column`
//!   (backward) references, keyed by configurable naming rules
//! - Bound `?` parameters for every value, with [`Literal`] for raw SQL
//!
//! ## Join Inference
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_sql::{DryRun, Query, Statement};
//!
//! let query = Query::new(Arc::new(DryRun::new()));
//! let select = query
//!     .from("article")?
//!     .select_only("article.title, user.name")
//!     .where_("comment:content", None::<String>)?;
//!
//! assert_eq!(
//!     select.render(),
//!     "SELECT article.title, user.name FROM article \
//!      INNER JOIN user ON user.id = article.user_id \
//!      INNER JOIN comment ON comment.article_id = article.id \
//!      WHERE comment.content IS NULL"
//! );
//! # Ok::<(), fluent_sql::Error>(())
//! ```
//!
//! ## Safety
//!
//! UPDATE and DELETE refuse to run without a WHERE condition:
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_sql::{DryRun, Error, Query};
//!
//! let query = Query::new(Arc::new(DryRun::new()));
//! let result = query.delete_from("user")?.execute();
//! assert!(matches!(result, Err(Error::Safety(_))));
//! # Ok::<(), fluent_sql::Error>(())
//! ```

pub mod builder;
pub mod connection;
pub mod error;
pub mod literal;
pub mod pattern;
pub mod query;
pub mod structure;
pub mod value;

pub use builder::{Delete, Insert, Select, Statement, Update};
pub use connection::{
    ColumnMeta, Connection, DriverError, DryRun, ErrorMode, Outcome, ResultSet, Row,
};
pub use error::{Error, Result};
pub use literal::Literal;
pub use query::{DebugHook, Options, Query, QueryConfig};
pub use structure::{KeyRule, Structure};
pub use value::{SqlValue, ToSqlValue};

/// Builds a row of `(column, value)` pairs for INSERT or UPDATE.
///
/// ```rust
/// use fluent_sql::{row, Literal, SqlValue};
///
/// let row = row! {
///     "title" => "Hello",
///     "views" => 0,
///     "created_at" => Literal::new("NOW()"),
/// };
/// assert_eq!(row[1], (String::from("views"), SqlValue::Int(0)));
/// ```
#[macro_export]
macro_rules! row {
    ($($column:expr => $value:expr),* $(,)?) => {
        vec![$((
            ::std::string::String::from($column),
            $crate::ToSqlValue::to_sql_value($value),
        )),*]
    };
}
