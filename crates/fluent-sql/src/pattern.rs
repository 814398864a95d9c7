//! Text patterns used to format SQL and to discover table references.
//!
//! All functions are pure and operate on UTF-8 text; identifiers may contain
//! any Unicode letter or digit plus connector, dash and quote punctuation.

use std::sync::LazyLock;

use regex::{Captures, Match, Regex};

/// Unicode letters, digits and punctuation allowed in identifiers.
const SQL_CHARS: &str = r"\p{L}\p{N}\p{Pc}\p{Pd}\p{Pf}\p{Pi}";

static CLAUSES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(WHERE|FROM|GROUP BY|HAVING|ORDER BY|LIMIT|OFFSET|UNION|ON DUPLICATE KEY UPDATE|VALUES|SET)\b",
    )
    .expect("unable to compile clause regex")
});

static SUB_CLAUSES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(INNER|OUTER|LEFT|RIGHT|FULL|CASE|WHEN|END|ELSE|AND|OR)\b")
        .expect("unable to compile sub-clause regex")
});

static LINE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\r\f\v]+\n").expect("unable to compile line end regex"));

static CHAINED_JOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"(?:[{SQL_CHARS}`]+[.:])*([{SQL_CHARS}`]+)[.:]([{SQL_CHARS}`*]*)");
    Regex::new(&pattern).expect("unable to compile chained join regex")
});

static QUOTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#)
        .expect("unable to compile quoted string regex")
});

static JOIN_CONDITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s(?:ON|USING)\b").expect("unable to compile join condition regex")
});

static PARAMETER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\?|(?:^|[\s(,=<>!]):\w+").expect("unable to compile parameter regex")
});

static TABLE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)`?([{SQL_CHARS}]+[.:]?[{SQL_CHARS}*]*)`?(\s+AS)?(\s+`?([{SQL_CHARS}]*)`?)?"
    );
    Regex::new(&pattern).expect("unable to compile table alias regex")
});

static TABLE_JOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[{SQL_CHARS}]+[.:]?")).expect("unable to compile table join regex")
});

static TABLE_JOIN_FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([^\s()]+[.:])[{SQL_CHARS}]*"))
        .expect("unable to compile full table join regex")
});

/// Puts each top-level clause keyword on its own line.
///
/// `"SELECT * FROM user WHERE id = 1"` becomes
/// `"SELECT * \nFROM user \nWHERE id = 1"`.
#[must_use]
pub fn split_clauses(sql: &str) -> String {
    CLAUSES_RE.replace_all(sql, "\n$0").into_owned()
}

/// Puts joins and boolean operators on their own indented line.
#[must_use]
pub fn split_sub_clauses(sql: &str) -> String {
    SUB_CLAUSES_RE.replace_all(sql, "\n    $0").into_owned()
}

/// Removes trailing whitespace at the end of every line.
#[must_use]
pub fn remove_line_end_whitespace(sql: &str) -> String {
    LINE_END_RE.replace_all(sql, "\n").into_owned()
}

/// Multi-line rendering of a statement for logs and debugging.
#[must_use]
pub fn format_query(sql: &str) -> String {
    let sql = split_clauses(sql);
    let sql = split_sub_clauses(&sql);
    remove_line_end_whitespace(&sql).trim().to_string()
}

/// Returns true when the text contains a `?` or `:name` placeholder.
///
/// A colon directly after an identifier (`article:title`) is a join
/// reference, not a placeholder.
#[must_use]
pub fn is_bound_parameter(text: &str) -> bool {
    PARAMETER_RE.is_match(text)
}

/// Returns true when a join statement carries its own `ON` or `USING`
/// condition, in any letter case.
#[must_use]
pub fn has_join_condition(text: &str) -> bool {
    JOIN_CONDITION_RE.is_match(text)
}

/// Returns true for numbers and times (`1.5`, `10:30:00`), which look like
/// references but never name a table.
#[must_use]
pub fn is_numeric_token(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ':')
}

/// The parts of `text` outside single- or double-quoted strings.
#[must_use]
pub fn unquoted_parts(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut last = 0;
    for quoted in QUOTED_RE.find_iter(text) {
        parts.push(&text[last..quoted.start()]);
        last = quoted.end();
    }
    parts.push(&text[last..]);
    parts
}

/// Rewrites the parts of `text` outside quoted strings with `rewrite`,
/// copying quoted strings unchanged.
#[must_use]
pub fn replace_unquoted(text: &str, mut rewrite: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for quoted in QUOTED_RE.find_iter(text) {
        out.push_str(&rewrite(&text[last..quoted.start()]));
        out.push_str(quoted.as_str());
        last = quoted.end();
    }
    out.push_str(&rewrite(&text[last..]));
    out
}

/// A table (or column) reference with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    /// The referenced table or `table.column`, without quoting backticks.
    pub reference: String,
    /// Alias following the reference, with or without `AS`.
    pub alias: Option<String>,
}

/// Parses `"table AS alias"`, `"table alias"` or `"table.column"`.
///
/// Returns `None` when the text holds no identifier at all.
#[must_use]
pub fn table_alias(text: &str) -> Option<TableAlias> {
    let caps = TABLE_ALIAS_RE.captures(text)?;
    let reference = caps.get(1)?.as_str().to_string();
    let alias = caps
        .get(4)
        .map(|m| m.as_str().to_string())
        .filter(|alias| !alias.is_empty());
    Some(TableAlias { reference, alias })
}

/// Finds every identifier, each optionally followed by `.` or `:`.
///
/// `"comment:user."` yields `["comment:", "user."]`.
#[must_use]
pub fn join_tokens(text: &str) -> Vec<&str> {
    TABLE_JOIN_RE
        .find_iter(text)
        .map(|found: Match<'_>| found.as_str())
        .collect()
}

/// A `table.` or `table:` reference found inside a larger fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinToken<'a> {
    /// The table part including its trailing separator (`"author."`).
    pub table: &'a str,
    /// The whole match, including any column suffix (`"author.name"`).
    pub full: &'a str,
}

/// Finds every `table.column` / `table:column` reference in a fragment.
///
/// A space between the identifier and the separator is not a reference.
#[must_use]
pub fn full_join_tokens(text: &str) -> Vec<JoinToken<'_>> {
    TABLE_JOIN_FULL_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(JoinToken {
                table: caps.get(1)?.as_str(),
                full: caps.get(0)?.as_str(),
            })
        })
        .collect()
}

/// Keeps only the last hop of chained references: `"a.b:c"` becomes `"b.c"`.
///
/// Numbers and quoted strings are left alone.
#[must_use]
pub fn collapse_chained_join_ref(text: &str) -> String {
    collapse_chained_join_ref_keeping(text, |_| false)
}

/// Same as [`collapse_chained_join_ref`], also leaving every reference for
/// which `keep` returns true as written.
#[must_use]
pub fn collapse_chained_join_ref_keeping(text: &str, keep: impl Fn(&str) -> bool) -> String {
    replace_unquoted(text, |part| {
        CHAINED_JOIN_RE
            .replace_all(part, |caps: &Captures<'_>| {
                let whole = &caps[0];
                if is_numeric_token(whole) || keep(whole) {
                    whole.to_string()
                } else {
                    format!("{}.{}", &caps[1], &caps[2])
                }
            })
            .into_owned()
    })
}
