// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::DateTime;
use rust_decimal::Decimal;
use tempfile::tempdir;
use tuckshop::commands::items::{ItemChanges, add_item, update_item};
use tuckshop::commands::students::add_student;
use tuckshop::db;
use tuckshop::utils::{get_currency, now_ts, set_currency};

#[test]
fn fresh_database_is_at_latest_version() {
    let conn = db::open_in_memory().unwrap();
    assert_eq!(db::schema_version(&conn).unwrap(), db::latest_version());
}

#[test]
fn reopening_keeps_data_and_version() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("tuckshop.db");
    {
        let conn = db::open_at(&path).unwrap();
        add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
        set_currency(&conn, "UGX").unwrap();
    }
    let mut conn = db::open_at(&path).unwrap();
    db::init_schema(&mut conn).unwrap();
    assert_eq!(db::schema_version(&conn).unwrap(), db::latest_version());
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(get_currency(&conn).unwrap(), "UGX");
}

#[test]
fn currency_defaults_to_kes() {
    let conn = db::open_in_memory().unwrap();
    assert_eq!(get_currency(&conn).unwrap(), "KES");
}

#[test]
fn schema_rejects_negative_balances_and_stock() {
    let conn = db::open_in_memory().unwrap();
    add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
    assert!(
        conn.execute(
            "UPDATE students SET balance='-1' WHERE admission_no='ADM-001'",
            [],
        )
        .is_err()
    );
    assert!(
        conn.execute(
            "INSERT INTO stock_items(name, quantity, created_at, updated_at)
             VALUES ('Pen', -3, '2025-01-01T00:00:00.000000Z', '2025-01-01T00:00:00.000000Z')",
            [],
        )
        .is_err()
    );
}

#[test]
fn schema_rejects_unknown_transaction_kinds() {
    let conn = db::open_in_memory().unwrap();
    let student = add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
    let res = conn.execute(
        "INSERT INTO transactions(student_id, amount, type, method, created_at)
         VALUES (?1, '10', 'refund', 'cash', '2025-01-01T00:00:00.000000Z')",
        [student.id],
    );
    assert!(res.is_err());
    let res = conn.execute(
        "INSERT INTO transactions(student_id, amount, type, method, created_at)
         VALUES (?1, '10', 'deposit', 'cheque', '2025-01-01T00:00:00.000000Z')",
        [student.id],
    );
    assert!(res.is_err());
}

#[test]
fn foreign_keys_are_enforced() {
    let conn = db::open_in_memory().unwrap();
    let res = conn.execute(
        "INSERT INTO transactions(student_id, amount, type, method, created_at)
         VALUES (42, '10', 'deposit', 'cash', '2025-01-01T00:00:00.000000Z')",
        [],
    );
    assert!(res.is_err());
}

#[test]
fn row_timestamps_share_the_ledger_format() {
    let conn = db::open_in_memory().unwrap();
    add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
    add_item(&conn, "Juice", 5, Decimal::new(20, 0), Decimal::new(35, 0)).unwrap();
    update_item(
        &conn,
        "Juice",
        &ItemChanges {
            quantity: Some(6),
            ..Default::default()
        },
    )
    .unwrap();

    let student_ts: String = conn
        .query_row("SELECT created_at FROM students", [], |r| r.get(0))
        .unwrap();
    let (created, updated): (String, String) = conn
        .query_row("SELECT created_at, updated_at FROM stock_items", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    for ts in [&student_ts, &created, &updated] {
        assert!(DateTime::parse_from_rfc3339(ts).is_ok(), "bad timestamp {ts}");
        assert_eq!(ts.len(), now_ts().len());
        assert!(ts.ends_with('Z'));
    }
    assert!(updated >= created);
}
