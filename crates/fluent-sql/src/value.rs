//! SQL values and parameter handling.
//!
//! Every value handed to a builder becomes a [`SqlValue`]. Plain values are
//! bound as `?` parameters; [`SqlValue::Literal`] is inlined into the SQL text
//! and never bound.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;

use crate::literal::Literal;

/// A SQL value that can be used as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Structured value, written as JSON text when write conversion is on.
    Json(JsonValue),
    /// A sequence of values. In a condition it expands to `IN (?, ?, ...)`.
    List(Vec<SqlValue>),
    /// Raw SQL, inlined verbatim.
    Literal(Literal),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Only used for human-readable output; statements are always executed
    /// with bound parameters.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "TRUE" } else { "FALSE" }),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(text) => quote(text),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Json(json) => quote(&json.to_string()),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::to_sql_inline).collect();
                format!("({})", inner.join(", "))
            }
            Self::Literal(literal) => literal.to_string(),
        }
    }

    /// Returns the parameter placeholder.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }

    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for [`SqlValue::Literal`].
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns the text in the value, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer in the value, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Placeholder or inlined literal for this value inside SQL text.
    pub(crate) fn sql_fragment(&self) -> String {
        match self {
            Self::Literal(literal) => literal.to_string(),
            _ => String::from(Self::placeholder()),
        }
    }

    /// Converts the value into a form every driver can bind.
    ///
    /// Booleans become `0`/`1`; JSON and lists become JSON text.
    #[must_use]
    pub fn for_write(self) -> Self {
        match self {
            Self::Bool(b) => Self::Int(i64::from(b)),
            Self::Json(json) => Self::Text(json.to_string()),
            list @ Self::List(_) => Self::Text(list.to_json().to_string()),
            other => other,
        }
    }

    /// Converts numeric text into a number, leaving other values unchanged.
    ///
    /// Integers are preferred; text that is not an integer but parses as a
    /// float becomes [`SqlValue::Float`].
    #[must_use]
    pub fn into_numeric(self) -> Self {
        match self {
            Self::Text(text) => {
                let trimmed = text.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    Self::Int(n)
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Self::Float(f)
                } else {
                    Self::Text(text)
                }
            }
            other => other,
        }
    }

    /// Returns the JSON representation of the value.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::Blob(b) => JsonValue::Array(b.iter().map(|byte| JsonValue::from(*byte)).collect()),
            Self::Json(json) => json.clone(),
            Self::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Literal(literal) => JsonValue::String(literal.to_string()),
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for Literal {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Literal(self)
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

/// Integers that widen to `i64` without loss.
macro_rules! impl_to_sql_value_int {
    ($($int:ty),*) => {
        $(
            impl ToSqlValue for $int {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )*
    };
}

impl_to_sql_value_int!(i32, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, ToSqlValue::to_sql_value)
    }
}

impl<T: ToSqlValue> ToSqlValue for Vec<T> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl<T: ToSqlValue, const N: usize> ToSqlValue for [T; N] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for JsonValue {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Json(self)
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        self.naive_utc().to_sql_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sql_value_inline_null() {
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_sql_value_inline_literal_and_list() {
        assert_eq!(SqlValue::Literal(Literal::new("NOW()")).to_sql_inline(), "NOW()");
        assert_eq!(vec![1, 2].to_sql_value().to_sql_inline(), "(1, 2)");
    }

    #[test]
    fn test_sql_value_inline_scalars() {
        assert_eq!(true.to_sql_value().to_sql_inline(), "TRUE");
        assert_eq!(false.to_sql_value().to_sql_inline(), "FALSE");
        assert_eq!(2.5_f64.to_sql_value().to_sql_inline(), "2.5");
        assert_eq!(u32::MAX.to_sql_value(), SqlValue::Int(4_294_967_295));
        assert_eq!((-7_i32).to_sql_value().to_sql_inline(), "-7");
    }

    #[test]
    fn test_write_conversion() {
        assert_eq!(true.to_sql_value().for_write(), SqlValue::Int(1));
        assert_eq!(false.to_sql_value().for_write(), SqlValue::Int(0));
        assert_eq!(
            json!({"a": 1}).to_sql_value().for_write(),
            SqlValue::Text(String::from(r#"{"a":1}"#))
        );
        assert_eq!(
            vec!["x", "y"].to_sql_value().for_write(),
            SqlValue::Text(String::from(r#"["x","y"]"#))
        );
        assert_eq!("keep".to_sql_value().for_write(), "keep".to_sql_value());
    }

    #[test]
    fn test_numeric_conversion() {
        assert_eq!("42".to_sql_value().into_numeric(), SqlValue::Int(42));
        assert_eq!("2.5".to_sql_value().into_numeric(), SqlValue::Float(2.5));
        assert_eq!(
            "abc".to_sql_value().into_numeric(),
            SqlValue::Text(String::from("abc"))
        );
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(
            [1_i64, 2].to_sql_value(),
            SqlValue::List(vec![SqlValue::Int(1), SqlValue::Int(2)])
        );
        assert_eq!(
            Literal::new("NOW()").to_sql_value(),
            SqlValue::Literal(Literal::new("NOW()"))
        );
        let date = NaiveDate::from_ymd_opt(2011, 12, 10)
            .and_then(|d| d.and_hms_opt(12, 10, 0))
            .unwrap();
        assert_eq!(
            date.to_sql_value(),
            SqlValue::Text(String::from("2011-12-10 12:10:00"))
        );
    }
}
