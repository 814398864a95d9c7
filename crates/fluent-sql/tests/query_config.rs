//! Tests for query configuration and formatting.

mod common;
use common::*;

use std::sync::{Arc, Mutex};

use fluent_sql::pattern::{collapse_chained_join_ref, split_clauses};
use fluent_sql::{Error, Options, Query, Statement};

#[test]
fn options_from_json() {
    let options: Options = serde_json::from_str(
        r#"{ "convert_read": true, "table_prefix": "wp", "table_separator": "_" }"#,
    )
    .unwrap();
    let conn = ScriptedConnection::new();
    let query = Query::new(conn.clone()).with_options(&options);

    assert!(query.config().convert_read());
    assert!(!query.config().convert_write());
    assert!(!query.config().exception_on_error());
    assert_eq!(
        query.from("post").unwrap().render(),
        "SELECT wp_post.* FROM wp_post"
    );
}

#[test]
fn raising_connection_sets_exception_mode() {
    let conn = ScriptedConnection::raising();
    let query = query(&conn);
    assert!(query.config().exception_on_error());

    let options = Options {
        exception_on_error: Some(false),
        ..Options::default()
    };
    let query = query.with_options(&options);
    assert!(!query.config().exception_on_error());
}

#[test]
fn blank_table_is_a_configuration_error() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    assert!(matches!(query.from("   "), Err(Error::Configuration(_))));
}

#[test]
fn empty_in_list_is_a_configuration_error() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let result = query.from("user").unwrap().where_("id", Vec::<i64>::new());

    match result {
        Err(Error::Configuration(message)) => {
            assert_eq!(message, "cannot build IN () with no values");
        }
        other => panic!("Expected configuration error, got {other:?}"),
    }
}

#[test]
fn debug_hook_runs_before_execution() {
    let conn = ScriptedConnection::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let query = query(&conn).debug(move |statement| {
        sink.lock()
            .unwrap()
            .push((statement.render_formatted(), statement.parameters().len()));
    });

    query
        .from("user")
        .unwrap()
        .where_("id", 1)
        .unwrap()
        .fetch()
        .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(String::from("SELECT user.*\nFROM user\nWHERE id = ?"), 1)]
    );
}

#[test]
fn formatted_rendering() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .where_("user.type", "author")
        .unwrap()
        .where_or("article.views", 0)
        .unwrap();

    assert_eq!(
        select.to_string(),
        "SELECT article.*\n\
         FROM article\n    \
         INNER JOIN user ON user.id = article.user_id\n\
         WHERE user.type = ?\n    \
         OR article.views = ?"
    );
}

#[test]
fn pattern_helpers() {
    assert_eq!(collapse_chained_join_ref("user.article:id"), "article.id");
    assert_eq!(
        split_clauses("SELECT * FROM user WHERE id = 1 ORDER BY id"),
        "SELECT * \nFROM user \nWHERE id = 1 \nORDER BY id"
    );
}
