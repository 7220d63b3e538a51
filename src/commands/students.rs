// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{WalletError, is_unique_violation};
use crate::models::Student;
use crate::utils::{
    STUDENT_COLUMNS, fmt_money, get_currency, maybe_print_json, now_ts, pretty_table, required,
    student_by_admission, student_from_row, validate_code,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let s = add_student(
                conn,
                sub.get_one::<String>("name").unwrap(),
                sub.get_one::<String>("admission").unwrap(),
                sub.get_one::<String>("class").unwrap(),
            )?;
            println!(
                "Added student '{}' ({}, class {})",
                s.name, s.admission_no, s.class_code
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => {
            let s = find_student(conn, sub.get_one::<String>("admission").unwrap())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
                let ccy = get_currency(conn)?;
                println!("{}", student_table(&[s], &ccy));
            }
        }
        Some(("update", sub)) => {
            let changes = StudentChanges {
                name: sub.get_one::<String>("name").cloned(),
                class_code: sub.get_one::<String>("class").cloned(),
                admission_no: sub.get_one::<String>("new-admission").cloned(),
            };
            let s = update_student(conn, sub.get_one::<String>("admission").unwrap(), &changes)?;
            println!(
                "Updated student '{}' ({}, class {})",
                s.name, s.admission_no, s.class_code
            );
        }
        Some(("rm", sub)) => {
            let adm = sub.get_one::<String>("admission").unwrap();
            remove_student(conn, adm)?;
            println!("Removed student {}", adm.trim());
        }
        _ => {}
    }
    Ok(())
}

pub fn add_student(
    conn: &Connection,
    name: &str,
    admission_no: &str,
    class_code: &str,
) -> Result<Student> {
    let name = required("name", name)?;
    let adm = validate_code("admission_no", admission_no)?;
    let class = validate_code("class_code", class_code)?;
    let inserted = conn.execute(
        "INSERT INTO students(name, admission_no, class_code, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, adm, class, now_ts()],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(WalletError::DuplicateAdmission(adm).into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(admission_no = %adm, class_code = %class, "student added");
    student_by_admission(conn, &adm)
}

pub fn find_student(conn: &Connection, admission_no: &str) -> Result<Student> {
    student_by_admission(conn, admission_no)
}

#[derive(Debug, Default, Clone)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub class_code: Option<String>,
}

pub fn list_students(conn: &Connection, filter: &StudentFilter) -> Result<Vec<Student>> {
    let mut sql = format!("SELECT {} FROM students WHERE 1=1", STUDENT_COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(class) = filter.class_code.as_deref().map(str::trim) {
        sql.push_str(" AND class_code=?");
        params_vec.push(class.to_string());
    }
    sql.push_str(" ORDER BY class_code, name, admission_no");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), student_from_row)?;
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let mut out = Vec::new();
    for row in rows {
        let s = row?;
        if let Some(ref n) = needle {
            let hit = s.name.to_lowercase().contains(n)
                || s.admission_no.to_lowercase().contains(n)
                || s.class_code.to_lowercase().contains(n);
            if !hit {
                continue;
            }
        }
        out.push(s);
    }
    Ok(out)
}

/// Identity fields an admin may edit. Wallet totals only move through the
/// ledger commands.
#[derive(Debug, Default, Clone)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub class_code: Option<String>,
    pub admission_no: Option<String>,
}

pub fn update_student(
    conn: &Connection,
    admission_no: &str,
    changes: &StudentChanges,
) -> Result<Student> {
    let current = student_by_admission(conn, admission_no)?;
    let name = match changes.name.as_deref() {
        Some(n) => required("name", n)?,
        None => current.name.clone(),
    };
    let class = match changes.class_code.as_deref() {
        Some(c) => validate_code("class_code", c)?,
        None => current.class_code.clone(),
    };
    let adm = match changes.admission_no.as_deref() {
        Some(a) => validate_code("admission_no", a)?,
        None => current.admission_no.clone(),
    };
    let updated = conn.execute(
        "UPDATE students SET name=?1, class_code=?2, admission_no=?3 WHERE id=?4",
        params![name, class, adm, current.id],
    );
    match updated {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(WalletError::DuplicateAdmission(adm).into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(admission_no = %adm, "student updated");
    student_by_admission(conn, &adm)
}

pub fn remove_student(conn: &Connection, admission_no: &str) -> Result<()> {
    let s = student_by_admission(conn, admission_no)?;
    conn.execute("DELETE FROM students WHERE id=?1", params![s.id])?;
    info!(admission_no = %s.admission_no, "student removed");
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = StudentFilter {
        search: sub.get_one::<String>("search").cloned(),
        class_code: sub.get_one::<String>("class").cloned(),
    };
    let data = list_students(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = get_currency(conn)?;
        println!("{}", student_table(&data, &ccy));
    }
    Ok(())
}

fn student_table(students: &[Student], ccy: &str) -> comfy_table::Table {
    let rows = students
        .iter()
        .map(|s| {
            vec![
                s.admission_no.clone(),
                s.name.clone(),
                s.class_code.clone(),
                fmt_money(&s.balance, ccy),
                fmt_money(&s.total_paid, ccy),
                fmt_money(&s.total_spent, ccy),
                s.last_payment.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &[
            "Admission",
            "Name",
            "Class",
            "Balance",
            "Paid",
            "Spent",
            "Last payment",
        ],
        rows,
    )
}
