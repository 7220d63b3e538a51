// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use tuckshop::commands::doctor::find_issues;
use tuckshop::commands::items::add_item;
use tuckshop::commands::purchases::record_purchase;
use tuckshop::commands::students::add_student;
use tuckshop::commands::transactions::record_transaction;
use tuckshop::db;
use tuckshop::models::{PaymentMethod, TxType};

fn busy_ledger() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
    add_student(&conn, "Brian Otieno", "ADM-002", "7A").unwrap();
    add_item(&conn, "Pencil", 20, "5".parse().unwrap(), "10".parse().unwrap()).unwrap();
    record_transaction(
        &mut conn,
        "ADM-001",
        TxType::Deposit,
        "100".parse().unwrap(),
        PaymentMethod::Online,
        None,
    )
    .unwrap();
    record_purchase(&mut conn, "ADM-001", "Pencil", 3).unwrap();
    conn
}

#[test]
fn healthy_ledger_has_no_issues() {
    let conn = busy_ledger();
    assert!(find_issues(&conn).unwrap().is_empty());
}

#[test]
fn detects_balance_that_disagrees_with_totals() {
    let conn = busy_ledger();
    conn.execute(
        "UPDATE students SET balance='999' WHERE admission_no='ADM-001'",
        [],
    )
    .unwrap();
    let issues = find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "balance_mismatch");
    assert!(issues[0][1].starts_with("ADM-001"));
}

#[test]
fn detects_totals_that_disagree_with_the_log() {
    let conn = busy_ledger();
    conn.execute(
        "UPDATE students SET total_paid='50', balance='50' WHERE admission_no='ADM-002'",
        [],
    )
    .unwrap();
    let issues = find_issues(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "ledger_drift");
    assert!(issues[0][1].contains("ADM-002"));
}
