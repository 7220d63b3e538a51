// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::BalanceView;
use crate::utils::{
    STUDENT_COLUMNS, fmt_money, get_currency, maybe_print_json, pretty_table,
    student_by_admission, student_from_row,
};
use anyhow::Result;
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = if let Some(adm) = sub.get_one::<String>("admission") {
        vec![balance_by_admission(conn, adm)?]
    } else if let Some(class) = sub.get_one::<String>("class") {
        let found = balance_by_class(conn, class)?;
        if let Some(notice) =
            empty_class_notice(class, &found, sub.get_flag("json") || sub.get_flag("jsonl"))
        {
            println!("{}", notice);
            return Ok(());
        }
        found
    } else {
        Vec::new()
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = get_currency(conn)?;
        let rows = data
            .iter()
            .map(|b| {
                vec![
                    b.admission_no.clone(),
                    b.name.clone(),
                    b.class_code.clone(),
                    fmt_money(&b.balance, &ccy),
                    fmt_money(&b.total_paid, &ccy),
                    fmt_money(&b.total_spent, &ccy),
                    b.last_payment.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "Admission",
                    "Name",
                    "Class",
                    "Balance",
                    "Paid",
                    "Spent",
                    "Last payment"
                ],
                rows
            )
        );
    }
    Ok(())
}

/// Table output says so when a class is empty; JSON output stays `[]`.
fn empty_class_notice(class: &str, found: &[BalanceView], as_json: bool) -> Option<String> {
    if as_json || !found.is_empty() {
        return None;
    }
    Some(format!("No students in class {}", class.trim()))
}

pub fn balance_by_admission(conn: &Connection, admission_no: &str) -> Result<BalanceView> {
    Ok(student_by_admission(conn, admission_no)?.into())
}

pub fn balance_by_class(conn: &Connection, class_code: &str) -> Result<Vec<BalanceView>> {
    let sql = format!(
        "SELECT {} FROM students WHERE class_code=?1 ORDER BY name, admission_no",
        STUDENT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![class_code.trim()], student_from_row)?;
    let mut out: Vec<BalanceView> = Vec::new();
    for row in rows {
        out.push(row?.into());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn empty_class_prints_notice_only_for_tables() {
        assert_eq!(
            empty_class_notice(" 9Z ", &[], false).as_deref(),
            Some("No students in class 9Z")
        );
        assert_eq!(empty_class_notice("9Z", &[], true), None);
    }

    #[test]
    fn empty_class_serializes_as_empty_array() {
        let conn = db::open_in_memory().unwrap();
        let found = balance_by_class(&conn, "9Z").unwrap();
        assert!(found.is_empty());
        assert_eq!(empty_class_notice("9Z", &found, true), None);
        assert_eq!(serde_json::to_string(&found).unwrap(), "[]");
    }
}
