//! Clause bookkeeping, rendering and execution shared by every statement.
//!
//! A statement kind is described by an ordered list of [`ClauseDef`]s. The
//! builder accumulates content per clause in a [`StatementState`]; rendering
//! walks the definitions in order and joins the non-empty clauses with a
//! single space.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use super::Statement;
use crate::connection::Outcome;
use crate::error::{Error, Result};
use crate::pattern::table_alias;
use crate::query::Query;
use crate::value::SqlValue;

/// Produces the complete text of a clause, or nothing.
pub type Renderer = fn(&StatementState) -> Option<String>;

/// How a clause turns its content into SQL.
#[derive(Clone, Copy)]
pub enum ClauseKind {
    /// `<NAME> <fragments joined by the separator>`.
    Separator(&'static str),
    /// A function of the state renders the whole clause.
    Renderer(Renderer),
    /// `<NAME> <value>` for a single value.
    Scalar,
}

/// One clause of a statement kind.
#[derive(Clone, Copy)]
pub struct ClauseDef {
    pub name: &'static str,
    pub kind: ClauseKind,
}

impl ClauseDef {
    pub const fn separator(name: &'static str, separator: &'static str) -> Self {
        Self {
            name,
            kind: ClauseKind::Separator(separator),
        }
    }

    pub const fn renderer(name: &'static str, renderer: Renderer) -> Self {
        Self {
            name,
            kind: ClauseKind::Renderer(renderer),
        }
    }

    pub const fn scalar(name: &'static str) -> Self {
        Self {
            name,
            kind: ClauseKind::Scalar,
        }
    }
}

/// Boolean operator placed in front of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glue {
    And,
    Or,
}

impl Glue {
    /// The operator with surrounding spaces.
    const fn joiner(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// A piece of clause text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub glue: Option<Glue>,
}

/// Accumulated content of one clause.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseContent {
    Fragments(Vec<Fragment>),
    Scalar(String),
    /// `column = value` pairs; a later assignment to a column replaces the
    /// earlier one in place.
    Assignments(Vec<(String, SqlValue)>),
    /// Rows sharing one column list.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<SqlValue>>,
    },
}

/// A table the statement already refers to, by alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownTable {
    pub alias: String,
    pub table: String,
}

/// Everything a builder has accumulated so far.
#[derive(Debug, Clone)]
pub struct StatementState {
    table: String,
    base_table: String,
    alias: String,
    statements: HashMap<&'static str, ClauseContent>,
    parameters: HashMap<&'static str, Vec<SqlValue>>,
    joins: Vec<KnownTable>,
    modifiers: Vec<&'static str>,
    smart_join: bool,
}

impl StatementState {
    /// Creates the state of a statement on `table` (`"article"`,
    /// `"article AS a"` or `"article a"`).
    pub fn new(table: &str) -> Self {
        let table = table.trim();
        let (base_table, alias) = table_alias(table).map_or_else(
            || (table.to_string(), table.to_string()),
            |parsed| {
                let alias = parsed.alias.unwrap_or_else(|| parsed.reference.clone());
                (parsed.reference, alias)
            },
        );
        let mut state = Self {
            table: table.to_string(),
            base_table,
            alias,
            statements: HashMap::new(),
            parameters: HashMap::new(),
            joins: Vec::new(),
            modifiers: Vec::new(),
            smart_join: true,
        };
        state.forget_joins();
        state
    }

    /// The table as given, alias included.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The table without its alias.
    pub fn base_table(&self) -> &str {
        &self.base_table
    }

    /// The name other clauses use for the base table.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn content(&self, clause: &str) -> Option<&ClauseContent> {
        self.statements.get(clause)
    }

    pub fn has(&self, clause: &str) -> bool {
        match self.statements.get(clause) {
            Some(ClauseContent::Fragments(fragments)) => !fragments.is_empty(),
            Some(ClauseContent::Scalar(_)) => true,
            Some(ClauseContent::Assignments(assignments)) => !assignments.is_empty(),
            Some(ClauseContent::Rows { rows, .. }) => !rows.is_empty(),
            None => false,
        }
    }

    /// Appends a fragment to a clause.
    pub fn push(&mut self, clause: &'static str, text: impl Into<String>, glue: Option<Glue>) {
        let fragment = Fragment {
            text: text.into(),
            glue,
        };
        match self
            .statements
            .entry(clause)
            .or_insert_with(|| ClauseContent::Fragments(Vec::new()))
        {
            ClauseContent::Fragments(fragments) => fragments.push(fragment),
            other => *other = ClauseContent::Fragments(vec![fragment]),
        }
    }

    pub fn push_parameters(&mut self, clause: &'static str, values: Vec<SqlValue>) {
        if values.is_empty() {
            return;
        }
        self.parameters.entry(clause).or_default().extend(values);
    }

    pub fn fragments(&self, clause: &str) -> &[Fragment] {
        let Some(ClauseContent::Fragments(fragments)) = self.statements.get(clause) else {
            return &[];
        };
        fragments
    }

    pub fn replace_fragments(&mut self, clause: &'static str, fragments: Vec<Fragment>) {
        self.statements
            .insert(clause, ClauseContent::Fragments(fragments));
    }

    pub fn set_scalar(&mut self, clause: &'static str, value: impl Into<String>) {
        self.statements
            .insert(clause, ClauseContent::Scalar(value.into()));
    }

    pub fn scalar(&self, clause: &str) -> Option<&str> {
        let Some(ClauseContent::Scalar(value)) = self.statements.get(clause) else {
            return None;
        };
        Some(value)
    }

    /// Sets `column = value`, replacing an earlier assignment to `column`.
    pub fn assign(&mut self, clause: &'static str, column: impl Into<String>, value: SqlValue) {
        let column = column.into();
        let entry = self
            .statements
            .entry(clause)
            .or_insert_with(|| ClauseContent::Assignments(Vec::new()));
        if !matches!(entry, ClauseContent::Assignments(_)) {
            *entry = ClauseContent::Assignments(Vec::new());
        }
        let ClauseContent::Assignments(assignments) = entry else {
            return;
        };
        if let Some(existing) = assignments.iter_mut().find(|existing| existing.0 == column) {
            existing.1 = value;
            return;
        }
        assignments.push((column, value));
    }

    /// Appends a row, fixing the column list on the first row.
    ///
    /// Every row must name the same columns in the same order.
    pub fn push_row(&mut self, clause: &'static str, row: Vec<(String, SqlValue)>) -> Result<()> {
        let (names, values): (Vec<String>, Vec<SqlValue>) = row.into_iter().unzip();
        if let Some(ClauseContent::Rows { columns, rows }) = self.statements.get_mut(clause) {
            if *columns != names {
                return Err(Error::configuration(format!(
                    "all rows must have the same columns in the same order: expected ({}), got ({})",
                    columns.join(", "),
                    names.join(", ")
                )));
            }
            rows.push(values);
            return Ok(());
        }
        self.statements.insert(
            clause,
            ClauseContent::Rows {
                columns: names,
                rows: vec![values],
            },
        );
        Ok(())
    }

    /// Removes everything a clause holds, parameters included.
    pub fn reset(&mut self, clause: &str) {
        self.statements.remove(clause);
        self.parameters.remove(clause);
    }

    /// Parameters bound by one clause, literals included.
    pub fn clause_parameters(&self, clause: &str) -> Vec<SqlValue> {
        match self.statements.get(clause) {
            Some(ClauseContent::Assignments(assignments)) => {
                assignments.iter().map(|(_, value)| value.clone()).collect()
            }
            Some(ClauseContent::Rows { rows, .. }) => rows.iter().flatten().cloned().collect(),
            _ => self.parameters.get(clause).cloned().unwrap_or_default(),
        }
    }

    pub fn is_known(&self, alias: &str) -> bool {
        self.joins.iter().any(|known| known.alias == alias)
    }

    /// Real table behind an alias.
    pub fn table_of(&self, alias: &str) -> Option<&str> {
        self.joins
            .iter()
            .find(|known| known.alias == alias)
            .map(|known| known.table.as_str())
    }

    pub fn remember(&mut self, alias: impl Into<String>, table: impl Into<String>) {
        let alias = alias.into();
        if !self.is_known(&alias) {
            self.joins.push(KnownTable {
                alias,
                table: table.into(),
            });
        }
    }

    pub fn known_tables(&self) -> &[KnownTable] {
        &self.joins
    }

    /// Forgets every joined table except the base table.
    pub fn forget_joins(&mut self) {
        self.joins = vec![KnownTable {
            alias: self.alias.clone(),
            table: self.base_table.clone(),
        }];
    }

    pub fn add_modifier(&mut self, modifier: &'static str) {
        if !self.has_modifier(modifier) {
            self.modifiers.push(modifier);
        }
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub const fn smart_join(&self) -> bool {
        self.smart_join
    }

    pub const fn set_smart_join(&mut self, enabled: bool) {
        self.smart_join = enabled;
    }
}

/// Renders every clause with content, in definition order.
pub fn render(clauses: &[ClauseDef], state: &StatementState) -> String {
    clauses
        .iter()
        .filter_map(|def| render_clause(def, state))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_clause(def: &ClauseDef, state: &StatementState) -> Option<String> {
    match def.kind {
        ClauseKind::Renderer(renderer) => renderer(state),
        ClauseKind::Scalar => state
            .scalar(def.name)
            .map(|value| format!("{} {value}", def.name)),
        ClauseKind::Separator(separator) => {
            let body = match state.content(def.name)? {
                ClauseContent::Fragments(fragments) => join_fragments(fragments, separator),
                ClauseContent::Assignments(assignments) => assignments
                    .iter()
                    .map(|(column, value)| format!("{column} = {}", value.sql_fragment()))
                    .collect::<Vec<_>>()
                    .join(separator),
                ClauseContent::Scalar(value) => value.clone(),
                ClauseContent::Rows { .. } => return None,
            };
            if body.is_empty() {
                None
            } else {
                Some(format!("{} {body}", def.name))
            }
        }
    }
}

/// Joins fragments with the separator, or with their own glue when set.
pub fn join_fragments(fragments: &[Fragment], separator: &str) -> String {
    let mut out = String::new();
    for (index, fragment) in fragments.iter().enumerate() {
        if index > 0 {
            out.push_str(fragment.glue.map_or(separator, |glue| glue.joiner()));
        }
        out.push_str(&fragment.text);
    }
    out
}

/// Bound parameters in placeholder order. Literals are inlined in the SQL
/// text and never bound.
pub fn parameters(
    clauses: &[ClauseDef],
    state: &StatementState,
    convert_write: bool,
) -> Vec<SqlValue> {
    clauses
        .iter()
        .flat_map(|def| state.clause_parameters(def.name))
        .filter(|value| !value.is_literal())
        .map(|value| if convert_write { value.for_write() } else { value })
        .collect()
}

/// Runs a statement on the query's connection.
///
/// `Ok(None)` means the driver failed and the query is in silent mode.
pub fn execute(query: &Query, statement: &dyn Statement) -> Result<Option<Outcome>> {
    let sql = statement.render();
    let params = statement.parameters();
    debug!(
        sql = %sql,
        parameters = %inline_parameters(&params),
        "Executing statement"
    );
    if let Some(hook) = query.config().debug_hook() {
        hook(statement);
    }

    let started = Instant::now();
    match query.connection().execute(&sql, &params) {
        Ok(outcome) => {
            debug!(
                elapsed = ?started.elapsed(),
                rows_affected = outcome.rows_affected,
                rows = outcome.result.rows.len(),
                "Statement executed"
            );
            Ok(Some(outcome))
        }
        Err(err) if query.config().exception_on_error() => Err(Error::Driver(err)),
        Err(err) => {
            warn!(
                sql = %sql,
                code = ?err.code,
                error = %err,
                "Statement failed"
            );
            Ok(None)
        }
    }
}

fn inline_parameters(params: &[SqlValue]) -> String {
    let inline: Vec<String> = params.iter().map(SqlValue::to_sql_inline).collect();
    format!("[{}]", inline.join(", "))
}
