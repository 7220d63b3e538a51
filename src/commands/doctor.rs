// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::add_amount;
use crate::utils::{decimal_at, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Each issue is `[kind, detail]`.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Cached wallet fields that disagree with each other
    let mut stmt = conn.prepare(
        "SELECT admission_no, balance, total_paid, total_spent FROM students ORDER BY admission_no",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let adm: String = r.get(0)?;
        let balance = decimal_at(r, 1)?;
        let paid = decimal_at(r, 2)?;
        let spent = decimal_at(r, 3)?;
        if balance != paid - spent {
            rows.push(vec![
                "balance_mismatch".into(),
                format!("{}: balance {} != paid {} - spent {}", adm, balance, paid, spent),
            ]);
        }
    }

    // 2) Cached totals that disagree with the transaction log
    let mut stmt2 = conn.prepare(
        "SELECT s.id, s.admission_no, s.total_paid, s.total_spent FROM students s ORDER BY s.admission_no",
    )?;
    let mut cur2 = stmt2.query([])?;
    let mut log_stmt =
        conn.prepare("SELECT type, amount FROM transactions WHERE student_id=?1")?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let adm: String = r.get(1)?;
        let paid = decimal_at(r, 2)?;
        let spent = decimal_at(r, 3)?;
        let mut log_paid = Decimal::ZERO;
        let mut log_spent = Decimal::ZERO;
        let mut entries = log_stmt.query([id])?;
        while let Some(e) = entries.next()? {
            let kind: String = e.get(0)?;
            let amount = decimal_at(e, 1)?;
            if kind == "deposit" {
                log_paid = add_amount(log_paid, amount)?;
            } else {
                log_spent = add_amount(log_spent, amount)?;
            }
        }
        if log_paid != paid || log_spent != spent {
            rows.push(vec![
                "ledger_drift".into(),
                format!(
                    "{}: cached paid/spent {}/{} but log shows {}/{}",
                    adm, paid, spent, log_paid, log_spent
                ),
            ]);
        }
    }

    // 3) Negative stock
    let mut stmt3 =
        conn.prepare("SELECT name, quantity FROM stock_items WHERE quantity < 0 ORDER BY name")?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let name: String = r.get(0)?;
        let qty: i64 = r.get(1)?;
        rows.push(vec!["negative_stock".into(), format!("{}: {}", name, qty)]);
    }

    Ok(rows)
}
