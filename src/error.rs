// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use thiserror::Error;

/// Domain failures surfaced to the operator. Plumbing errors (SQLite, I/O,
/// CSV decoding) travel as plain `anyhow` errors instead.
#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("Student '{0}' not found")]
    StudentNotFound(String),

    #[error("Item '{0}' not found")]
    ItemNotFound(String),

    #[error("Admission number '{0}' already exists")]
    DuplicateAdmission(String),

    #[error("Duplicate admission numbers: {}", .0.join(", "))]
    DuplicateAdmissions(Vec<String>),

    #[error("Item '{0}' already exists")]
    DuplicateItem(String),

    #[error("Item '{0}' is referenced by purchases, restocks or sales and cannot be removed")]
    ItemInUse(String),

    #[error("Insufficient stock for '{item}': requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: i64,
        available: i64,
    },

    #[error("Insufficient balance for '{admission_no}': required {required}, available {available}")]
    InsufficientBalance {
        admission_no: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid amount '{0}': must be greater than zero")]
    InvalidAmount(Decimal),

    #[error("Invalid quantity {0}: must be greater than zero")]
    InvalidQuantity(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Value out of range while computing {0}")]
    OutOfRange(&'static str),

    #[error("CSV header is missing required column '{0}'")]
    CsvMissingColumn(String),

    #[error("CSV header has unexpected column '{0}'")]
    CsvUnexpectedColumn(String),

    #[error("CSV header repeats column '{0}'")]
    CsvDuplicateColumn(String),

    #[error("CSV line {line}: expected {expected} columns, found {found}")]
    CsvColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("CSV line {line}: '{field}' is required")]
    CsvMissingField { line: u64, field: String },

    #[error("Admin authentication required: {0}")]
    Unauthorized(String),
}

/// True when `err` is a SQLite UNIQUE constraint failure.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// True when `err` is a SQLite FOREIGN KEY constraint failure.
pub fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
