// ABOUTME: Integration tests for the generic row engine operations
// ABOUTME: Covers set/get/edit/del statement shapes, identity selection, and race outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{engine, row, MockPool};
use rowgate::database::DatabaseError;
use rowgate::models::{BindPayload, BindValue, ColumnMetadata, ResultHeader, Row};
use serde_json::{json, Value};
use std::time::Duration;

fn users() -> MockPool {
    MockPool::with_table(
        vec![
            ColumnMetadata::primary_key("id"),
            ColumnMetadata::unique("email"),
            ColumnMetadata::new("name"),
        ],
        vec![
            row(json!({"id": 18, "email": "ann@example.com", "name": "Ann"})),
            row(json!({"id": 19, "email": "bob@example.com", "name": "Bob"})),
        ],
    )
}

fn named(payload: Option<&BindPayload>, name: &str) -> BindValue {
    payload
        .and_then(BindPayload::as_named)
        .and_then(|params| params.get(name))
        .cloned()
        .unwrap()
}

#[tokio::test]
async fn test_set_inserts_each_row_and_keeps_input_order() {
    let pool = MockPool::with_table_and_writes(vec![], vec![], |statement| {
        let id = match statement.payload.as_ref().and_then(BindPayload::as_positional) {
            Some([BindValue::Scalar(rowgate::models::Scalar::Int(id)), ..]) => *id as u64,
            _ => 0,
        };
        Ok(ResultHeader {
            affected_rows: 1,
            last_insert_id: Some(id),
        })
    });
    let engine = engine(&pool);

    let rows = vec![
        row(json!({"a": 1, "b": "x"})),
        row(json!({"a": 2, "b": "y"})),
        row(json!({"a": 3, "b": {"nested": true}})),
    ];
    let headers = engine.set("t", &rows).await.unwrap();

    let ids: Vec<_> = headers.iter().map(|h| h.last_insert_id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

    let writes = pool.writes();
    assert_eq!(writes.len(), 3);
    assert!(writes
        .iter()
        .all(|s| s.sql == "INSERT INTO `t` (`a`, `b`) VALUES (?, ?)"));
    assert!(writes.iter().any(|s| s.payload
        == Some(BindPayload::Positional(vec![
            BindValue::from(3_i64),
            BindValue::JsonText(r#"{"nested":true}"#.to_owned()),
        ]))));
    assert_eq!(pool.acquired(), pool.released());
}

#[tokio::test]
async fn test_set_with_no_rows_sends_nothing() {
    let pool = users();
    let headers = engine(&pool).set("t", &[]).await.unwrap();
    assert!(headers.is_empty());
    assert_eq!(pool.acquired(), 0);
}

#[tokio::test]
async fn test_get_filters_rows_but_keeps_full_metadata() {
    let pool = users();
    let engine = engine(&pool);

    let ann = |r: &Row| r["name"] == "Ann";
    let selection = engine.get("users", None, Some(&ann)).await.unwrap();

    assert_eq!(selection.rows.len(), 1);
    assert_eq!(selection.rows[0]["id"], json!(18));
    assert_eq!(selection.columns.len(), 3);

    let read = &pool.statements()[0];
    assert_eq!(read.sql, "SELECT * FROM `users`");
    assert_eq!(read.source_table.as_deref(), Some("users"));
}

#[tokio::test]
async fn test_get_with_column_list() {
    let pool = users();
    engine(&pool)
        .get("app.users", Some(&["id", "email"]), None)
        .await
        .unwrap();
    assert_eq!(
        pool.statements()[0].sql,
        "SELECT `id`, `email` FROM `app`.`users`"
    );
}

#[tokio::test]
async fn test_invalid_table_name_is_rejected_before_reading() {
    let pool = users();
    let err = engine(&pool)
        .get("users WHERE 1=1", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::InvalidIdentifier { .. }));
    assert_eq!(pool.acquired(), 0);
}

#[tokio::test]
async fn test_edit_with_no_match_issues_no_writes() {
    let pool = users();
    let nobody = |_: &Row| false;
    let transform = |r: Row| r;
    let headers = engine(&pool)
        .edit("users", &transform, Some(&nobody))
        .await
        .unwrap();

    assert!(headers.is_empty());
    assert_eq!(pool.statements().len(), 1);
    assert!(pool.writes().is_empty());
}

#[tokio::test]
async fn test_edit_sets_changed_columns_and_matches_old_primary_key() {
    let pool = MockPool::with_table(
        vec![ColumnMetadata::primary_key("id"), ColumnMetadata::new("email")],
        vec![row(json!({"id": 18, "email": "old@example.com"}))],
    );
    let transform = |mut r: Row| {
        r.insert("email".to_owned(), json!("new@example.com"));
        r.insert("id".to_owned(), json!(99));
        r
    };
    let headers = engine(&pool)
        .edit("users", &transform, None)
        .await
        .unwrap();

    assert_eq!(headers, vec![ResultHeader::affected(1)]);
    let writes = pool.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].sql,
        "UPDATE `users` SET `email`=:email WHERE `id`=:oldid"
    );
    let payload = writes[0].payload.as_ref();
    assert_eq!(named(payload, "email"), BindValue::from("new@example.com"));
    assert_eq!(named(payload, "oldid"), BindValue::from(18_i64));
}

#[tokio::test]
async fn test_edit_uses_unique_index_without_primary_key() {
    let pool = MockPool::with_table(
        vec![ColumnMetadata::unique("email"), ColumnMetadata::new("name")],
        vec![row(json!({"email": "ann@example.com", "name": "Ann"}))],
    );
    let transform = |mut r: Row| {
        r.insert("name".to_owned(), json!("Anne"));
        r
    };
    engine(&pool).edit("people", &transform, None).await.unwrap();

    let writes = pool.writes();
    assert_eq!(
        writes[0].sql,
        "UPDATE `people` SET `name`=:name WHERE `email`=:oldemail"
    );
    assert_eq!(
        named(writes[0].payload.as_ref(), "oldemail"),
        BindValue::from("ann@example.com")
    );
}

#[tokio::test]
async fn test_edit_omits_columns_missing_from_transform_output() {
    let pool = users();
    let transform = |r: Row| {
        let mut out = Row::new();
        out.insert("id".to_owned(), r["id"].clone());
        out.insert("name".to_owned(), json!("renamed"));
        out
    };
    engine(&pool).edit("users", &transform, None).await.unwrap();

    for write in pool.writes() {
        assert!(write.sql.starts_with("UPDATE `users` SET `name`=:name WHERE "));
        assert!(!write.sql.contains(":email"));
    }
}

#[tokio::test]
async fn test_edit_skips_rows_with_nothing_to_assign() {
    let pool = users();
    let transform = |r: Row| {
        let mut out = Row::new();
        out.insert("id".to_owned(), r["id"].clone());
        out
    };
    let headers = engine(&pool).edit("users", &transform, None).await.unwrap();
    assert_eq!(headers, vec![ResultHeader::default(); 2]);
    assert!(pool.writes().is_empty());
}

#[tokio::test]
async fn test_edit_race_reports_zero_affected_rows() {
    let pool = MockPool::with_table_and_writes(
        vec![ColumnMetadata::primary_key("id"), ColumnMetadata::new("n")],
        vec![row(json!({"id": 1, "n": 1})), row(json!({"id": 2, "n": 2}))],
        |statement| {
            // row 2 was deleted between the read and the write
            let old_id = statement
                .payload
                .as_ref()
                .and_then(BindPayload::as_named)
                .and_then(|p| p.get("oldid"));
            let gone = old_id == Some(&BindValue::from(2_i64));
            Ok(ResultHeader::affected(u64::from(!gone)))
        },
    );
    let transform = |mut r: Row| {
        let n = r["n"].as_i64().unwrap();
        r.insert("n".to_owned(), json!(n + 10));
        r
    };
    let headers = engine(&pool).edit("t", &transform, None).await.unwrap();
    assert_eq!(
        headers.iter().map(|h| h.affected_rows).collect::<Vec<_>>(),
        vec![1, 0]
    );
}

#[tokio::test]
async fn test_del_matches_snapshot_identity() {
    let pool = users();
    let bob = |r: &Row| r["name"] == "Bob";
    let headers = engine(&pool).del("users", Some(&bob)).await.unwrap();

    assert_eq!(headers.len(), 1);
    let writes = pool.writes();
    assert_eq!(writes[0].sql, "DELETE FROM `users` WHERE `id`=:id");
    assert_eq!(named(writes[0].payload.as_ref(), "id"), BindValue::from(19_i64));
}

#[tokio::test]
async fn test_del_falls_back_to_every_column() {
    let pool = MockPool::with_table(
        vec![ColumnMetadata::new("a"), ColumnMetadata::new("b")],
        vec![row(json!({"a": 1, "b": null}))],
    );
    engine(&pool).del("log", None).await.unwrap();
    assert_eq!(
        pool.writes()[0].sql,
        "DELETE FROM `log` WHERE `a`=:a AND `b`<=>:b"
    );
}

#[tokio::test]
async fn test_first_failure_decides_batch_outcome() {
    let pool = MockPool::with_table_and_writes(
        vec![ColumnMetadata::primary_key("id")],
        vec![row(json!({"id": 1})), row(json!({"id": 2}))],
        |statement| match statement.payload.as_ref().and_then(BindPayload::as_named) {
            Some(params) if params.get("id") == Some(&BindValue::from(2_i64)) => {
                Err(DatabaseError::QueryError {
                    context: "lock wait timeout".to_owned(),
                })
            }
            _ => Ok(ResultHeader::affected(1)),
        },
    );
    let err = engine(&pool).del("t", None).await.unwrap_err();
    assert!(matches!(err, DatabaseError::QueryError { .. }));
    assert_eq!(pool.acquired(), pool.released());
}

#[tokio::test]
async fn test_failure_waits_for_slower_rows_to_hand_back_connections() {
    let id_is = |statement: &rowgate::database::Statement, id: i64| {
        statement
            .payload
            .as_ref()
            .and_then(BindPayload::as_named)
            .and_then(|params| params.get("id"))
            == Some(&BindValue::from(id))
    };
    let pool = MockPool::with_table_and_writes(
        vec![ColumnMetadata::primary_key("id")],
        vec![row(json!({"id": 1})), row(json!({"id": 2}))],
        move |statement| {
            if id_is(statement, 2) {
                Err(DatabaseError::QueryError {
                    context: "boom".to_owned(),
                })
            } else {
                Ok(ResultHeader::affected(1))
            }
        },
    );
    pool.delay(move |statement| id_is(statement, 1).then_some(Duration::from_millis(20)));

    let err = engine(&pool).del("t", None).await.unwrap_err();
    assert!(matches!(err, DatabaseError::QueryError { .. }));
    assert_eq!(pool.acquired(), 3);
    assert_eq!(pool.released() + pool.destroyed(), 3);
    assert_eq!(pool.completed(), 3);
}

#[tokio::test]
async fn test_del_race_reports_zero_affected_rows() {
    let pool = MockPool::with_table_and_writes(
        vec![ColumnMetadata::primary_key("id")],
        vec![row(json!({"id": 1})), row(json!({"id": 2}))],
        |statement| {
            // row 1 was already deleted by someone else
            let id = statement
                .payload
                .as_ref()
                .and_then(BindPayload::as_named)
                .and_then(|p| p.get("id"));
            let gone = id == Some(&BindValue::from(1_i64));
            Ok(ResultHeader::affected(u64::from(!gone)))
        },
    );
    let headers = engine(&pool).del("t", None).await.unwrap();
    assert_eq!(
        headers.iter().map(|h| h.affected_rows).collect::<Vec<_>>(),
        vec![0, 1]
    );
    assert_eq!(pool.writes().len(), 2);
}

#[tokio::test]
async fn test_json_values_in_rows_are_bound_as_json_text() {
    let pool = MockPool::with_table(
        vec![ColumnMetadata::primary_key("id"), ColumnMetadata::new("tags")],
        vec![row(json!({"id": 1, "tags": ["a"]}))],
    );
    let transform = |mut r: Row| {
        r.insert("tags".to_owned(), json!(["a", "b"]));
        r
    };
    engine(&pool).edit("t", &transform, None).await.unwrap();
    assert_eq!(
        named(pool.writes()[0].payload.as_ref(), "tags"),
        BindValue::JsonText(Value::from(vec!["a", "b"]).to_string())
    );
}
