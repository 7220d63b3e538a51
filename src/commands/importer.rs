// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{WalletError, is_unique_violation};
use crate::utils::{now_ts, validate_code};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use tracing::{info, warn};

pub const STUDENT_COLUMNS: [&str; 3] = ["name", "admission_no", "class_code"];

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("students", sub)) => {
            let path = sub.get_one::<String>("path").unwrap().trim();
            let n = import_students(conn, path)?;
            println!("Imported {} students from {}", n, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn import_students(conn: &mut Connection, path: &str) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("Open CSV {}", path))?;
    import_students_from_reader(conn, file)
}

struct StudentRecord {
    line: u64,
    name: String,
    admission_no: String,
    class_code: String,
}

/// Validates the whole file before touching the database, then inserts every
/// row in one transaction.
pub fn import_students_from_reader<R: Read>(conn: &mut Connection, reader: R) -> Result<usize> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("Read CSV header")?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    for col in STUDENT_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(WalletError::CsvMissingColumn(col.to_string()).into());
        }
    }
    if let Some(extra) = headers
        .iter()
        .find(|h| !STUDENT_COLUMNS.contains(&h.as_str()))
    {
        return Err(WalletError::CsvUnexpectedColumn(extra.clone()).into());
    }
    let mut seen_cols = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen_cols.insert(h.to_string())) {
        return Err(WalletError::CsvDuplicateColumn(dup.clone()).into());
    }
    let idx = |col: &str| headers.iter().position(|h| h == col).unwrap_or_default();
    let (name_i, adm_i, class_i) = (idx("name"), idx("admission_no"), idx("class_code"));

    let mut records = Vec::new();
    for result in rdr.records() {
        let rec = result.context("Read CSV record")?;
        let line = rec.position().map(|p| p.line()).unwrap_or_default();
        if rec.len() != headers.len() {
            return Err(WalletError::CsvColumnCount {
                line,
                expected: headers.len(),
                found: rec.len(),
            }
            .into());
        }
        let field = |i: usize, col: &str| -> Result<String, WalletError> {
            let v = rec.get(i).unwrap_or("").trim();
            if v.is_empty() {
                return Err(WalletError::CsvMissingField {
                    line,
                    field: col.to_string(),
                });
            }
            Ok(v.to_string())
        };
        let name = field(name_i, "name")?;
        let admission_no = field(adm_i, "admission_no")?;
        let class_code = field(class_i, "class_code")?;
        let admission_no = validate_code("admission_no", &admission_no)
            .with_context(|| format!("CSV line {}", line))?;
        let class_code = validate_code("class_code", &class_code)
            .with_context(|| format!("CSV line {}", line))?;
        records.push(StudentRecord {
            line,
            name,
            admission_no,
            class_code,
        });
    }

    let duplicates = find_duplicates(conn, &records)?;
    if !duplicates.is_empty() {
        warn!(count = duplicates.len(), "student import rejected: duplicates");
        return Err(WalletError::DuplicateAdmissions(duplicates).into());
    }

    let ts = now_ts();
    let tx = conn.transaction()?;
    for r in &records {
        let inserted = tx.execute(
            "INSERT INTO students(name, admission_no, class_code, created_at)
         VALUES (?1, ?2, ?3, ?4)",
            params![r.name, r.admission_no, r.class_code, ts],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(WalletError::DuplicateAdmissions(vec![r.admission_no.clone()]).into());
            }
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("CSV line {}", r.line)));
            }
        }
    }
    tx.commit()?;
    info!(count = records.len(), "students imported");
    Ok(records.len())
}

/// Admission numbers repeated inside the file or already on record, each
/// reported once in file order.
fn find_duplicates(conn: &Connection, records: &[StudentRecord]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut out = Vec::new();
    let mut stmt = conn.prepare("SELECT 1 FROM students WHERE admission_no=?1")?;
    for r in records {
        let in_file = !seen.insert(r.admission_no.as_str());
        let on_record = stmt
            .query_row(params![r.admission_no], |row| row.get::<_, i64>(0))
            .optional()?
            .is_some();
        if (in_file || on_record) && reported.insert(r.admission_no.as_str()) {
            out.push(r.admission_no.clone());
        }
    }
    Ok(out)
}
