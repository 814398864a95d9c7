//! Tests for UPDATE and DELETE statements.

mod common;
use common::*;

use fluent_sql::{row, Error, Literal, SqlValue, Statement};

// ===================================================================
// UPDATE
// ===================================================================

#[test]
fn update_with_inferred_join() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let update = query
        .update("article")
        .unwrap()
        .set_all(row! {
            "published_at" => Literal::new("NOW()"),
            "title" => "new title",
        })
        .where_("user.name", "alice")
        .unwrap();

    assert_eq!(
        update.render(),
        "UPDATE article INNER JOIN user ON user.id = article.user_id \
         SET published_at = NOW(), title = ? WHERE user.name = ?"
    );
    assert_eq!(update.parameters(), vec![text("new title"), text("alice")]);
}

#[test]
fn update_key_returns_affected_rows() {
    let conn = ScriptedConnection::new();
    conn.reply(affected(1));
    let query = query(&conn);

    let updated = query
        .update_key("user", 3)
        .unwrap()
        .set("name", "carol")
        .execute()
        .unwrap();

    assert_eq!(updated, Some(1));
    assert_eq!(
        conn.executed(),
        vec![(
            String::from("UPDATE user SET name = ? WHERE id = ?"),
            vec![text("carol"), SqlValue::Int(3)]
        )]
    );
}

#[test]
fn update_without_where_never_reaches_connection() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);

    let result = query.update("user").unwrap().set("name", "x").execute();

    assert!(matches!(result, Err(Error::Safety(_))));
    assert!(conn.executed().is_empty());
}

// ===================================================================
// DELETE
// ===================================================================

#[test]
fn delete_without_where_is_refused() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);

    let result = query.delete_from("user").unwrap().execute();

    assert!(matches!(result, Err(Error::Safety(_))));
    assert!(conn.executed().is_empty());
}

#[test]
fn delete_returns_affected_rows() {
    let conn = ScriptedConnection::new();
    conn.reply(affected(2));
    let query = query(&conn);

    let deleted = query
        .delete_from("comment")
        .unwrap()
        .where_("article.published_at", None::<String>)
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(deleted, Some(2));
    assert_eq!(
        conn.last_sql(),
        "DELETE FROM comment INNER JOIN article ON article.id = comment.article_id \
         WHERE article.published_at IS NULL"
    );
}

#[test]
fn delete_key() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let delete = query.delete_key("user", 9).unwrap();

    assert_eq!(delete.render(), "DELETE FROM user WHERE id = ?");
    assert_eq!(delete.parameters(), vec![SqlValue::Int(9)]);
}

#[test]
fn delete_multi_table_form() {
    let conn = ScriptedConnection::new();
    let query = query(&conn);
    let delete = query
        .delete("user")
        .unwrap()
        .ignore()
        .from("user")
        .where_("article:id", vec![1, 2])
        .unwrap();

    assert_eq!(
        delete.render(),
        "DELETE IGNORE user FROM user INNER JOIN article ON article.user_id = user.id \
         WHERE article.id IN (?, ?)"
    );
}

#[test]
fn delete_failure_in_silent_mode() {
    let conn = ScriptedConnection::new();
    conn.fail("lock wait timeout");
    let query = query(&conn);

    let deleted = query
        .delete_from("user")
        .unwrap()
        .where_("id", 1)
        .unwrap()
        .execute()
        .unwrap();

    assert_eq!(deleted, None);
}
