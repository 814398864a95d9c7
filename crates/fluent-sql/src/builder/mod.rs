//! Statement builders.
//!
//! Each builder is created by a [`crate::Query`] factory, configured through
//! chained calls and finally rendered or executed:
//!
//! ```rust
//! use std::sync::Arc;
//! use fluent_sql::{DryRun, Query, Statement};
//!
//! let query = Query::new(Arc::new(DryRun::new()));
//! let select = query
//!     .from("article")?
//!     .select("author.name")
//!     .where_("article.published", true)?;
//!
//! assert_eq!(
//!     select.render(),
//!     "SELECT article.*, author.name FROM article \
//!      INNER JOIN author ON author.id = article.author_id \
//!      WHERE article.published = ?"
//! );
//! # Ok::<(), fluent_sql::Error>(())
//! ```

#[macro_use]
mod common;

mod base;
mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::Select;
pub use update::Update;

use crate::pattern::format_query;
use crate::value::SqlValue;

/// A rendered statement: SQL text plus the values bound to its placeholders.
pub trait Statement {
    /// Renders the SQL text with `?` placeholders.
    ///
    /// Rendering never mutates the builder; calling it twice yields the same
    /// text.
    fn render(&self) -> String;

    /// Values bound to the placeholders, in placeholder order.
    fn parameters(&self) -> Vec<SqlValue>;

    /// Multi-line rendering for logs. Never executed.
    fn render_formatted(&self) -> String {
        format_query(&self.render())
    }
}
