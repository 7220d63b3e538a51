// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::importer::STUDENT_COLUMNS;
use crate::commands::students::{StudentFilter, list_students};
use crate::commands::transactions::{TransactionFilter, query_rows};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use std::path::Path;

pub const TEMPLATE_ROWS: [[&str; 3]; 2] = [
    ["Jane Wanjiku", "ADM-1001", "7A"],
    ["Brian Otieno", "ADM-1002", "7B"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => bail!("Unknown format: {} (use csv|json)", other),
        }
    }
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("template", sub)) => {
            let out = sub.get_one::<String>("out").unwrap();
            write_template(Path::new(out))?;
            println!("Wrote student import template to {}", out);
        }
        Some(("students", sub)) => {
            let fmt = ExportFormat::parse(sub.get_one::<String>("format").unwrap())?;
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_students(conn, fmt, Path::new(out))?;
            println!("Exported {} students to {}", n, out);
        }
        Some(("transactions", sub)) => {
            let fmt = ExportFormat::parse(sub.get_one::<String>("format").unwrap())?;
            let out = sub.get_one::<String>("out").unwrap();
            let n = export_transactions(conn, fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", n, out);
        }
        _ => {}
    }
    Ok(())
}

pub fn write_template(out: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(out)?;
    wtr.write_record(STUDENT_COLUMNS)?;
    for row in TEMPLATE_ROWS {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_students(conn: &Connection, fmt: ExportFormat, out: &Path) -> Result<usize> {
    let students = list_students(conn, &StudentFilter::default())?;
    match fmt {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "name",
                "admission_no",
                "class_code",
                "balance",
                "total_paid",
                "total_spent",
                "last_payment",
            ])?;
            for s in &students {
                wtr.write_record([
                    s.name.clone(),
                    s.admission_no.clone(),
                    s.class_code.clone(),
                    s.balance.to_string(),
                    s.total_paid.to_string(),
                    s.total_spent.to_string(),
                    s.last_payment.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            std::fs::write(out, serde_json::to_string_pretty(&students)?)?;
        }
    }
    Ok(students.len())
}

pub fn export_transactions(conn: &Connection, fmt: ExportFormat, out: &Path) -> Result<usize> {
    let mut rows = query_rows(conn, &TransactionFilter::default())?;
    // Oldest first reads naturally in a spreadsheet.
    rows.reverse();
    match fmt {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "created_at",
                "admission_no",
                "student",
                "type",
                "method",
                "amount",
                "note",
            ])?;
            for r in &rows {
                wtr.write_record([
                    &r.created_at,
                    &r.admission_no,
                    &r.student,
                    &r.r#type,
                    &r.method,
                    &r.amount,
                    &r.note,
                ])?;
            }
            wtr.flush()?;
        }
        ExportFormat::Json => {
            let items: Vec<serde_json::Value> = rows
                .iter()
                .map(|r| {
                    json!({
                        "created_at": r.created_at,
                        "admission_no": r.admission_no,
                        "student": r.student,
                        "type": r.r#type,
                        "method": r.method,
                        "amount": r.amount,
                        "note": r.note,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    Ok(rows.len())
}
