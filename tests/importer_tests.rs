// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;
use tuckshop::commands::importer::{self, import_students_from_reader};
use tuckshop::commands::students::{StudentFilter, add_student, find_student, list_students};
use tuckshop::error::WalletError;
use tuckshop::{cli, db};

fn student_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))
        .unwrap()
}

fn import(conn: &mut Connection, csv: &str) -> anyhow::Result<usize> {
    import_students_from_reader(conn, csv.as_bytes())
}

fn wallet_err(err: &anyhow::Error) -> Option<&WalletError> {
    err.downcast_ref::<WalletError>()
}

#[test]
fn imports_rows_with_zero_wallets() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "name,admission_no,class_code\n\
               Amina Hassan , ADM-001 ,7A\n\
               Brian Otieno,ADM-002,7B\n";
    assert_eq!(import(&mut conn, csv).unwrap(), 2);

    let s = find_student(&conn, "ADM-001").unwrap();
    assert_eq!(s.name, "Amina Hassan");
    assert_eq!(s.class_code, "7A");
    assert_eq!(s.balance, Decimal::ZERO);
    assert_eq!(s.total_paid, Decimal::ZERO);
    assert!(s.last_payment.is_none());
}

#[test]
fn header_is_case_insensitive_and_order_free() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "Class_Code,NAME,Admission_No\n8C,Chep Kiprono,ADM-100\n";
    assert_eq!(import(&mut conn, csv).unwrap(), 1);
    let s = find_student(&conn, "ADM-100").unwrap();
    assert_eq!(s.name, "Chep Kiprono");
    assert_eq!(s.class_code, "8C");
}

#[test]
fn header_only_file_imports_nothing() {
    let mut conn = db::open_in_memory().unwrap();
    assert_eq!(import(&mut conn, "name,admission_no,class_code\n").unwrap(), 0);
}

#[test]
fn missing_and_unexpected_columns_are_rejected() {
    let mut conn = db::open_in_memory().unwrap();
    let err = import(&mut conn, "name,admission_no\nA,ADM-1\n").unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvMissingColumn("class_code".into()))
    );

    let err = import(&mut conn, "name,admission_no,class_code,phone\nA,ADM-1,7A,0700\n")
        .unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvUnexpectedColumn("phone".into()))
    );
    assert_eq!(student_count(&conn), 0);
}

#[test]
fn repeated_header_column_is_rejected() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "name,admission_no,class_code,name\nAmina,ADM-1,7A,Brian\n";
    let err = import(&mut conn, csv).unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvDuplicateColumn("name".into()))
    );
    let err = import(&mut conn, "Name,admission_no,class_code,NAME\nA,ADM-1,7A,B\n").unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvDuplicateColumn("name".into()))
    );
    assert_eq!(student_count(&conn), 0);
}

#[test]
fn short_row_reports_its_line() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "name,admission_no,class_code\nA,ADM-1,7A\nB,ADM-2\n";
    let err = import(&mut conn, csv).unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvColumnCount {
            line: 3,
            expected: 3,
            found: 2,
        })
    );
    assert_eq!(student_count(&conn), 0);
}

#[test]
fn blank_field_reports_line_and_field() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "name,admission_no,class_code\nA,ADM-1,7A\n  ,ADM-2,7A\n";
    let err = import(&mut conn, csv).unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::CsvMissingField {
            line: 3,
            field: "name".into(),
        })
    );
    assert_eq!(student_count(&conn), 0);
}

#[test]
fn malformed_admission_number_names_the_line() {
    let mut conn = db::open_in_memory().unwrap();
    let csv = "name,admission_no,class_code\nA,ADM 1,7A\n";
    let err = import(&mut conn, csv).unwrap_err();
    assert!(format!("{:#}", err).contains("CSV line 2"));
    assert!(matches!(wallet_err(&err), Some(WalletError::Validation(_))));
}

#[test]
fn duplicates_are_reported_together_and_nothing_is_inserted() {
    let mut conn = db::open_in_memory().unwrap();
    add_student(&conn, "Existing", "ADM-002", "7A").unwrap();
    let csv = "name,admission_no,class_code\n\
               A,ADM-001,7A\n\
               B,ADM-002,7A\n\
               C,ADM-003,7B\n\
               D,ADM-001,7B\n\
               E,ADM-001,7B\n";
    let err = import(&mut conn, csv).unwrap_err();
    assert_eq!(
        wallet_err(&err),
        Some(&WalletError::DuplicateAdmissions(vec![
            "ADM-002".into(),
            "ADM-001".into(),
        ]))
    );
    assert_eq!(
        err.to_string(),
        "Duplicate admission numbers: ADM-002, ADM-001"
    );
    assert_eq!(student_count(&conn), 1);
}

#[test]
fn cli_import_reads_trimmed_path() {
    let mut conn = db::open_in_memory().unwrap();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "name,admission_no,class_code").unwrap();
    writeln!(file, "Amina Hassan,ADM-001,7A").unwrap();
    writeln!(file, "Brian Otieno,ADM-002,7A").unwrap();
    file.flush().unwrap();
    let padded = format!("  {}  ", file.path().to_string_lossy());

    let matches =
        cli::build_cli().get_matches_from(["tuckshop", "import", "students", "--path", &padded]);
    if let Some(("import", m)) = matches.subcommand() {
        importer::handle(&mut conn, m).unwrap();
    } else {
        panic!("no import subcommand");
    }

    let class = list_students(
        &conn,
        &StudentFilter {
            class_code: Some("7A".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(class.len(), 2);
}

#[test]
fn missing_file_is_an_error() {
    let mut conn = db::open_in_memory().unwrap();
    let err = importer::import_students(&mut conn, "/nonexistent/students.csv").unwrap_err();
    assert!(err.to_string().contains("Open CSV"));
}
