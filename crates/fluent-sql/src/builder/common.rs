//! Conditions and join inference shared by SELECT, UPDATE and DELETE.
//!
//! Joins come from two places. Explicit joins (`left_join("author")`) are
//! added when called. Every other `table.column` or `table:column`
//! reference found in SELECT, WHERE, GROUP BY, HAVING or ORDER BY is resolved
//! at render time into an `INNER JOIN`, using the schema hints to name the
//! keys:
//!
//! - `author.name` on `article` (forward reference, `article` holds the
//!   foreign key): `INNER JOIN author ON author.id = article.author_id`
//! - `comment:text` on `article` (backward reference, `comment` holds the
//!   foreign key): `INNER JOIN comment ON comment.article_id = article.id`
//!
//! References chain hop by hop (`article.author.country.name`) and the
//! rendered fragment keeps only the last hop (`country.name`).

use crate::error::{Error, Result};
use crate::pattern::{
    collapse_chained_join_ref_keeping, full_join_tokens, has_join_condition, is_bound_parameter,
    is_numeric_token, join_tokens, replace_unquoted, table_alias, unquoted_parts,
};
use crate::structure::Structure;
use crate::value::SqlValue;

use super::base::{Glue, StatementState};

pub const SELECT: &str = "SELECT";
pub const FROM: &str = "FROM";
pub const JOIN: &str = "JOIN";
pub const WHERE: &str = "WHERE";
pub const GROUP_BY: &str = "GROUP BY";
pub const HAVING: &str = "HAVING";
pub const ORDER_BY: &str = "ORDER BY";
pub const LIMIT: &str = "LIMIT";
pub const OFFSET: &str = "OFFSET";

/// Clauses scanned for undeclared table references, in scan order.
const REFERENCING_CLAUSES: [&str; 5] = [SELECT, WHERE, GROUP_BY, HAVING, ORDER_BY];

/// Renders the JOIN clause: join statements separated by spaces.
pub fn join_clause(state: &StatementState) -> Option<String> {
    let joins = state.fragments(JOIN);
    if joins.is_empty() {
        return None;
    }
    let texts: Vec<&str> = joins.iter().map(|join| join.text.as_str()).collect();
    Some(texts.join(" "))
}

/// Adds a condition to WHERE or HAVING.
///
/// Without a placeholder in `condition` the comparison is derived from the
/// value: `IS NULL` for null, `IN (...)` for a list, `= <literal>` for a
/// literal and `= ?` otherwise. `negate` flips each comparison. With a
/// placeholder the value is bound as is, a list binding one value per
/// element; a literal replaces its `?` in the text instead.
pub fn add_condition(
    state: &mut StatementState,
    clause: &'static str,
    glue: Option<Glue>,
    condition: &str,
    value: SqlValue,
    negate: bool,
) -> Result<()> {
    if is_bound_parameter(condition) {
        let values = match value {
            SqlValue::List(items) => items,
            other => vec![other],
        };
        let (text, params) = inline_literals(condition, values);
        state.push(clause, text, glue);
        state.push_parameters(clause, params);
        return Ok(());
    }

    let not = if negate { "NOT " } else { "" };
    let (text, params) = match value {
        SqlValue::Null => (format!("{condition} IS {not}NULL"), Vec::new()),
        SqlValue::List(items) => {
            if items.is_empty() {
                return Err(Error::configuration("cannot build IN () with no values"));
            }
            let placeholders: Vec<String> = items.iter().map(SqlValue::sql_fragment).collect();
            (
                format!("{condition} {not}IN ({})", placeholders.join(", ")),
                items,
            )
        }
        other => {
            let operator = if negate { "<>" } else { "=" };
            let text = format!("{condition} {operator} {}", other.sql_fragment());
            let params = if other.is_literal() {
                Vec::new()
            } else {
                vec![other]
            };
            (text, params)
        }
    };
    state.push(clause, text, glue);
    state.push_parameters(clause, params);
    Ok(())
}

/// Writes literal values in place of their `?` and returns the values left
/// to bind. `?` inside quoted strings is not a placeholder.
fn inline_literals(condition: &str, values: Vec<SqlValue>) -> (String, Vec<SqlValue>) {
    if !values.iter().any(SqlValue::is_literal) {
        return (condition.to_string(), values);
    }
    let mut values = values.into_iter();
    let mut params = Vec::new();
    let text = replace_unquoted(condition, |part| {
        let mut out = String::with_capacity(part.len());
        for c in part.chars() {
            if c != '?' {
                out.push(c);
                continue;
            }
            match values.next() {
                Some(SqlValue::Literal(literal)) => out.push_str(literal.as_str()),
                Some(value) => {
                    out.push('?');
                    params.push(value);
                }
                None => out.push('?'),
            }
        }
        out
    });
    params.extend(values.filter(|value| !value.is_literal()));
    (text, params)
}

/// Adds an explicit join of the given kind (`INNER`, `LEFT`, ...).
///
/// A statement with its own `ON` or `USING`, in any case, is kept verbatim. Anything else
/// is a table reference, possibly chained and possibly aliased, resolved
/// like an inferred join.
pub fn add_join(state: &mut StatementState, structure: &Structure, kind: &str, statement: &str) {
    let statement = statement.trim();
    if statement.is_empty() {
        return;
    }
    let reference = statement.split_whitespace().next().unwrap_or(statement);
    if state.is_known(reference.trim_end_matches(['.', ':'])) {
        return;
    }
    let alias = table_alias(statement)
        .and_then(|parsed| parsed.alias)
        .filter(|alias| !alias.eq_ignore_ascii_case("ON") && !alias.eq_ignore_ascii_case("USING"));

    if has_join_condition(statement) {
        let table = reference.trim_matches('`');
        state.push(JOIN, format!("{kind} JOIN {statement}"), None);
        state.remember(alias.as_deref().unwrap_or(table), table);
        return;
    }

    let chain = if reference.ends_with(['.', ':']) {
        reference.to_string()
    } else {
        format!("{reference}.")
    };
    join_chain(state, structure, kind, &chain, alias.as_deref());
}

/// Joins every hop of `chain` (`"author.country."`) not joined yet.
///
/// `alias` names the last hop only.
fn join_chain(
    state: &mut StatementState,
    structure: &Structure,
    kind: &str,
    chain: &str,
    alias: Option<&str>,
) {
    let tokens = join_tokens(chain);
    let last = tokens.len().saturating_sub(1);
    let mut previous = state.alias().to_string();

    for (index, token) in tokens.into_iter().enumerate() {
        let backward = token.ends_with(':');
        let name = token.trim_end_matches(['.', ':']);
        if name == previous {
            continue;
        }
        let alias = if index == last { alias } else { None };
        let join_alias = alias.unwrap_or(name);

        if !state.is_known(join_alias) {
            let previous_table = state.table_of(&previous).unwrap_or(&previous).to_string();
            let condition = if backward {
                format!(
                    "{join_alias}.{} = {previous}.{}",
                    structure.foreign_key(&previous_table),
                    structure.primary_key(&previous_table)
                )
            } else {
                format!(
                    "{join_alias}.{} = {previous}.{}",
                    structure.primary_key(name),
                    structure.foreign_key(name)
                )
            };
            let as_alias = alias.map(|alias| format!(" AS {alias}")).unwrap_or_default();
            state.push(JOIN, format!("{kind} JOIN {name}{as_alias} ON {condition}"), None);
            state.remember(join_alias, name);
        }
        previous = join_alias.to_string();
    }
}

/// Returns a copy of the state with every undeclared reference joined and
/// chained references collapsed to their last hop.
pub fn resolve_joins(state: &StatementState, structure: &Structure) -> StatementState {
    let mut resolved = state.clone();
    if !resolved.smart_join() {
        return resolved;
    }
    for clause in REFERENCING_CLAUSES {
        let fragments = resolved.fragments(clause).to_vec();
        if fragments.is_empty() {
            continue;
        }
        let rewritten = fragments
            .into_iter()
            .map(|mut fragment| {
                fragment.text = join_references(&mut resolved, structure, &fragment.text);
                fragment
            })
            .collect();
        resolved.replace_fragments(clause, rewritten);
    }
    resolved
}

fn join_references(state: &mut StatementState, structure: &Structure, text: &str) -> String {
    for part in unquoted_parts(text) {
        for token in full_join_tokens(part) {
            let name = token.table.trim_end_matches(['.', ':']);
            if is_numeric_token(name) || state.is_known(name) {
                continue;
            }
            join_chain(state, structure, "INNER", token.table, None);
        }
    }

    // `db.table.column` names a table in another database; keep it whole.
    let qualified: Vec<String> = state
        .known_tables()
        .iter()
        .filter(|known| known.alias.contains('.'))
        .map(|known| format!("{}.", known.alias))
        .collect();
    collapse_chained_join_ref_keeping(text, |reference| {
        qualified.iter().any(|prefix| reference.starts_with(prefix.as_str()))
    })
}

/// Methods shared by the statements that filter and join: WHERE
/// composition, joins, ORDER BY and LIMIT.
macro_rules! impl_common_clauses {
    ($builder:ident) => {
        impl $builder<'_> {
            /// Adds a raw WHERE condition, joined with `AND`.
            #[must_use]
            pub fn where_raw(mut self, condition: &str) -> Self {
                self.state.push(
                    $crate::builder::common::WHERE,
                    condition,
                    Some($crate::builder::base::Glue::And),
                );
                self
            }

            /// Adds a WHERE condition comparing against `value`, joined with
            /// `AND`.
            ///
            /// `where_("id", 1)` renders `id = ?`, a null renders `IS NULL`
            /// and a list renders `IN (?, ...)`. A condition that already
            /// holds a placeholder (`"id > ?"`) binds the value as is.
            ///
            /// # Errors
            ///
            /// Returns [`crate::Error::Configuration`] for an empty list value.
            pub fn where_<T: $crate::value::ToSqlValue>(
                mut self,
                condition: &str,
                value: T,
            ) -> $crate::error::Result<Self> {
                $crate::builder::common::add_condition(
                    &mut self.state,
                    $crate::builder::common::WHERE,
                    Some($crate::builder::base::Glue::And),
                    condition,
                    value.to_sql_value(),
                    false,
                )?;
                Ok(self)
            }

            /// Like [`Self::where_`], joined with `OR`.
            ///
            /// # Errors
            ///
            /// Returns [`crate::Error::Configuration`] for an empty list value.
            pub fn where_or<T: $crate::value::ToSqlValue>(
                mut self,
                condition: &str,
                value: T,
            ) -> $crate::error::Result<Self> {
                $crate::builder::common::add_condition(
                    &mut self.state,
                    $crate::builder::common::WHERE,
                    Some($crate::builder::base::Glue::Or),
                    condition,
                    value.to_sql_value(),
                    false,
                )?;
                Ok(self)
            }

            /// Negated [`Self::where_`]: `IS NOT NULL`, `NOT IN (...)`, `<> ?`.
            ///
            /// # Errors
            ///
            /// Returns [`crate::Error::Configuration`] for an empty list value.
            pub fn where_not<T: $crate::value::ToSqlValue>(
                mut self,
                condition: &str,
                value: T,
            ) -> $crate::error::Result<Self> {
                $crate::builder::common::add_condition(
                    &mut self.state,
                    $crate::builder::common::WHERE,
                    Some($crate::builder::base::Glue::And),
                    condition,
                    value.to_sql_value(),
                    true,
                )?;
                Ok(self)
            }

            /// Adds one `AND` condition per `(column, value)` pair.
            ///
            /// # Errors
            ///
            /// Returns [`crate::Error::Configuration`] for an empty list value.
            pub fn where_all<I, K, V>(mut self, conditions: I) -> $crate::error::Result<Self>
            where
                I: IntoIterator<Item = (K, V)>,
                K: AsRef<str>,
                V: $crate::value::ToSqlValue,
            {
                for (condition, value) in conditions {
                    self = self.where_(condition.as_ref(), value)?;
                }
                Ok(self)
            }

            /// Removes every WHERE condition and its parameters.
            #[must_use]
            pub fn reset_where(mut self) -> Self {
                self.state.reset($crate::builder::common::WHERE);
                self
            }

            /// Adds an `INNER JOIN`.
            ///
            /// Takes a table (`"author"`, `"user AS author"`), a chain
            /// (`"author.country"`) or a complete statement with `ON`/`USING`.
            #[must_use]
            pub fn inner_join(self, statement: &str) -> Self {
                self.join_kind("INNER", statement)
            }

            /// Adds a `LEFT JOIN`. See [`Self::inner_join`].
            #[must_use]
            pub fn left_join(self, statement: &str) -> Self {
                self.join_kind("LEFT", statement)
            }

            /// Adds a `RIGHT JOIN`. See [`Self::inner_join`].
            #[must_use]
            pub fn right_join(self, statement: &str) -> Self {
                self.join_kind("RIGHT", statement)
            }

            /// Adds an `OUTER JOIN`. See [`Self::inner_join`].
            #[must_use]
            pub fn outer_join(self, statement: &str) -> Self {
                self.join_kind("OUTER", statement)
            }

            /// Adds a `FULL JOIN`. See [`Self::inner_join`].
            #[must_use]
            pub fn full_join(self, statement: &str) -> Self {
                self.join_kind("FULL", statement)
            }

            fn join_kind(mut self, kind: &str, statement: &str) -> Self {
                $crate::builder::common::add_join(
                    &mut self.state,
                    self.query.structure(),
                    kind,
                    statement,
                );
                self
            }

            /// Removes every join, explicit or not yet inferred.
            #[must_use]
            pub fn reset_joins(mut self) -> Self {
                self.state.reset($crate::builder::common::JOIN);
                self.state.forget_joins();
                self
            }

            /// Enables or disables join inference from column references.
            #[must_use]
            pub fn smart_join(mut self, enabled: bool) -> Self {
                self.state.set_smart_join(enabled);
                self
            }

            /// Adds an ORDER BY expression.
            #[must_use]
            pub fn order_by(mut self, expression: &str) -> Self {
                self.state
                    .push($crate::builder::common::ORDER_BY, expression, None);
                self
            }

            /// Sets the LIMIT.
            #[must_use]
            pub fn limit(mut self, limit: u64) -> Self {
                self.state
                    .set_scalar($crate::builder::common::LIMIT, limit.to_string());
                self
            }
        }
    };
}
