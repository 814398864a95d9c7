//! Raw SQL fragments.

use std::fmt;

/// SQL text inserted verbatim into a statement instead of being bound.
///
/// Use it for engine functions and keywords such as `NOW()` or
/// `CURRENT_TIMESTAMP`. Never wrap user input in a `Literal`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal(String);

impl Literal {
    /// Creates a literal from raw SQL text.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// The literal `NULL`.
    #[must_use]
    pub fn null() -> Self {
        Self(String::from("NULL"))
    }

    /// Returns the raw SQL text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Literal {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

impl From<String> for Literal {
    fn from(sql: String) -> Self {
        Self(sql)
    }
}
