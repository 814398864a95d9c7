//! Tests for SELECT rendering, join inference and fetching.

mod common;
use common::*;

use fluent_sql::{KeyRule, Literal, Query, SqlValue, Statement, Structure};

// ===================================================================
// Join inference
// ===================================================================

#[test]
fn forward_reference_joins_once() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .select("author.name")
        .select("author.email");

    let sql = select.render();
    assert_eq!(
        sql,
        "SELECT article.*, author.name, author.email FROM article \
         INNER JOIN author ON author.id = article.author_id"
    );
    assert_eq!(sql.matches("INNER JOIN author").count(), 1);
}

#[test]
fn backward_reference_joins_referencing_table() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("user")
        .unwrap()
        .select_only("user.name")
        .where_("article:published_at", None::<String>)
        .unwrap();

    assert_eq!(
        select.render(),
        "SELECT user.name FROM user \
         INNER JOIN article ON article.user_id = user.id \
         WHERE article.published_at IS NULL"
    );
    assert!(select.parameters().is_empty());
}

#[test]
fn two_hop_chain() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("comment")
        .unwrap()
        .select_only("comment.content")
        .order_by("article.user.name");

    assert_eq!(
        select.render(),
        "SELECT comment.content FROM comment \
         INNER JOIN article ON article.id = comment.article_id \
         INNER JOIN user ON user.id = article.user_id \
         ORDER BY user.name"
    );
}

#[test]
fn mixed_direction_chain() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("user")
        .unwrap()
        .select_only("user.name")
        .where_("article:comment:content", "spam")
        .unwrap();

    assert_eq!(
        select.render(),
        "SELECT user.name FROM user \
         INNER JOIN article ON article.user_id = user.id \
         INNER JOIN comment ON comment.article_id = article.id \
         WHERE comment.content = ?"
    );
}

#[test]
fn alias_wins_over_table_name() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .left_join("user AS author")
        .select("author.name");

    assert_eq!(
        select.render(),
        "SELECT article.*, author.name FROM article \
         LEFT JOIN user AS author ON author.id = article.user_id"
    );
}

#[test]
fn explicit_join_with_condition_is_verbatim() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .inner_join("user USING (user_id)")
        .where_("user.type", "author")
        .unwrap();

    assert_eq!(
        select.render(),
        "SELECT article.* FROM article INNER JOIN user USING (user_id) WHERE user.type = ?"
    );
}

#[test]
fn lowercase_join_condition_is_verbatim() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .left_join("user u on u.uid = article.owner_uid")
        .select("u.name");

    assert_eq!(
        select.render(),
        "SELECT article.*, u.name FROM article LEFT JOIN user u on u.uid = article.owner_uid"
    );
}

#[test]
fn custom_key_naming() {
    let conn = ScriptedConnection::new();
    let structure = Structure::new(
        "%s_id",
        KeyRule::function(|table| format!("id_{table}")),
    );
    let query = Query::with_structure(conn.clone(), structure);
    let select = query.from("article").unwrap().select_only("user.name");

    assert_eq!(
        select.render(),
        "SELECT user.name FROM article INNER JOIN user ON user.user_id = article.id_user"
    );
}

#[test]
fn other_database_table_is_not_rewritten() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("archive.article")
        .unwrap()
        .where_("archive.article.id", 1)
        .unwrap();

    assert_eq!(
        select.render(),
        "SELECT archive.article.* FROM archive.article WHERE archive.article.id = ?"
    );
}

#[test]
fn qualified_table_later_in_condition_is_not_rewritten() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("archive.article")
        .unwrap()
        .where_raw("x = 1 AND archive.article.id = 2");

    assert_eq!(
        select.render(),
        "SELECT archive.article.* FROM archive.article WHERE x = 1 AND archive.article.id = 2"
    );
}

#[test]
fn quoted_times_are_not_references() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("event")
        .unwrap()
        .where_raw("starts_at > '2020-01-01 10:30:00'")
        .where_("room.name", "a.b")
        .unwrap();

    assert_eq!(
        select.render(),
        "SELECT event.* FROM event INNER JOIN room ON room.id = event.room_id \
         WHERE starts_at > '2020-01-01 10:30:00' AND room.name = ?"
    );
    assert_eq!(select.parameters(), vec![text("a.b")]);
}

#[test]
fn literal_for_placeholder_is_inlined() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .where_("published_at < ?", Literal::new("NOW()"))
        .unwrap()
        .where_(
            "views BETWEEN ? AND ?",
            vec![SqlValue::Int(10), SqlValue::Literal(Literal::new("@max"))],
        )
        .unwrap();

    let sql = select.render();
    assert_eq!(
        sql,
        "SELECT article.* FROM article WHERE published_at < NOW() AND views BETWEEN ? AND @max"
    );
    assert_eq!(select.parameters(), vec![SqlValue::Int(10)]);
    assert_eq!(sql.matches('?').count(), select.parameters().len());
}

#[test]
fn render_twice_is_identical() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let select = query
        .from("article")
        .unwrap()
        .where_("author.name", "alice")
        .unwrap()
        .where_("comment:id", vec![1, 2])
        .unwrap();

    let first = (select.render(), select.parameters());
    let second = (select.render(), select.parameters());
    assert_eq!(first, second);
    assert_eq!(
        first.1,
        vec![text("alice"), SqlValue::Int(1), SqlValue::Int(2)]
    );
}

// ===================================================================
// Fetching
// ===================================================================

#[test]
fn fetch_converts_numeric_columns() {
    let conn = ScriptedConnection::new();
    conn.reply(rows(
        &[("id", "LONG"), ("title", "VAR_STRING")],
        &[&["1", "first"]],
    ));
    let query = query(&conn).convert_read_types(true);

    let row = query.from_key("article", 1).unwrap().fetch().unwrap().unwrap();
    assert_eq!(row.get("id"), Some(&SqlValue::Int(1)));
    assert_eq!(row.get("title"), Some(&text("first")));
    assert_eq!(
        conn.last_sql(),
        "SELECT article.* FROM article WHERE article.id = ?"
    );
}

#[test]
fn fetch_keeps_text_without_conversion() {
    let conn = ScriptedConnection::new();
    conn.reply(rows(&[("id", "LONG")], &[&["1"]]));
    let query = query(&conn);

    let value = query.from("article").unwrap().fetch_value("id").unwrap();
    assert_eq!(value, Some(text("1")));
}

#[test]
fn fetch_all_and_column() {
    let conn = ScriptedConnection::new();
    let outcome = rows(
        &[("id", "LONG"), ("name", "VAR_STRING")],
        &[&["1", "alice"], &["2", "bob"]],
    );
    conn.reply(outcome.clone());
    conn.reply(outcome);
    let query = query(&conn);
    let select = query.from("user").unwrap();

    assert_eq!(select.fetch_all().unwrap().len(), 2);
    assert_eq!(
        select.fetch_column(1).unwrap(),
        vec![text("alice"), text("bob")]
    );
}

#[test]
fn fetch_keyed_and_pairs() {
    let conn = ScriptedConnection::new();
    conn.reply(rows(
        &[("id", "LONG"), ("name", "VAR_STRING")],
        &[&["1", "alice"], &["2", "bob"]],
    ));
    conn.reply(rows(
        &[("id", "LONG"), ("name", "VAR_STRING")],
        &[&["1", "alice"]],
    ));
    let query = query(&conn).convert_read_types(true);
    let select = query.from("user").unwrap();

    let keyed = select.fetch_keyed("id").unwrap();
    assert_eq!(keyed[1].0, SqlValue::Int(2));
    assert_eq!(keyed[1].1.get("name"), Some(&text("bob")));

    let pairs = select.fetch_pairs("id", "name").unwrap();
    assert_eq!(pairs, vec![(SqlValue::Int(1), text("alice"))]);
    assert_eq!(conn.last_sql(), "SELECT id, name FROM user");
}

#[test]
fn count_reads_first_column() {
    let conn = ScriptedConnection::new();
    conn.reply(rows(&[("COUNT(*)", "LONGLONG")], &[&["42"]]));
    let query = query(&conn);

    let count = query
        .from("article")
        .unwrap()
        .where_("author.name", "alice")
        .unwrap()
        .count()
        .unwrap();

    assert_eq!(count, 42);
    assert_eq!(
        conn.executed(),
        vec![(
            String::from(
                "SELECT COUNT(*) FROM (SELECT article.* FROM article \
                 INNER JOIN author ON author.id = article.author_id \
                 WHERE author.name = ?) AS counted"
            ),
            vec![text("alice")]
        )]
    );
}

#[test]
fn failed_fetch_in_silent_mode_is_empty() {
    let conn = ScriptedConnection::new();
    conn.fail("table missing");
    let query = query(&conn);

    assert_eq!(query.from("missing").unwrap().fetch().unwrap(), None);
}

#[test]
fn failed_fetch_in_raise_mode_is_an_error() {
    let conn = ScriptedConnection::raising();
    conn.fail("table missing");
    let query = query(&conn);

    let err = query.from("missing").unwrap().fetch_all().unwrap_err();
    assert_eq!(err.to_string(), "Driver error: table missing");
}
