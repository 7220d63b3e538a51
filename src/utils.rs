// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::WalletError;
use crate::models::{StockItem, Student};

pub const DEFAULT_CURRENCY: &str = "KES";

static CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9/_.\-]+$").unwrap());

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_quantity(s: &str) -> Result<i64> {
    s.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid quantity '{}'", s))
}

/// Trimmed, non-empty text or a validation error naming the field.
pub fn required(field: &str, value: &str) -> Result<String, WalletError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(WalletError::Validation(format!("'{}' is required", field)));
    }
    Ok(v.to_string())
}

/// Admission numbers and class codes: letters, digits and `/ _ . -`.
pub fn validate_code(field: &str, value: &str) -> Result<String, WalletError> {
    let v = required(field, value)?;
    if !CODE_RE.is_match(&v) {
        return Err(WalletError::Validation(format!(
            "Invalid {} '{}': use letters, digits, '/', '_', '.' or '-'",
            field, v
        )));
    }
    Ok(v)
}

/// UTC timestamp with a fixed width so TEXT ordering matches time ordering.
pub fn now_ts() -> String {
    fmt_ts(chrono::Utc::now())
}

pub fn fmt_ts(t: chrono::DateTime<chrono::Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Reads a decimal stored as TEXT.
pub fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.trim()
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub const STUDENT_COLUMNS: &str =
    "id, name, admission_no, class_code, balance, total_paid, total_spent, last_payment";

pub fn student_from_row(r: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get(0)?,
        name: r.get(1)?,
        admission_no: r.get(2)?,
        class_code: r.get(3)?,
        balance: decimal_at(r, 4)?,
        total_paid: decimal_at(r, 5)?,
        total_spent: decimal_at(r, 6)?,
        last_payment: r.get(7)?,
    })
}

pub fn student_by_admission(conn: &Connection, admission_no: &str) -> Result<Student> {
    let adm = admission_no.trim();
    let sql = format!("SELECT {} FROM students WHERE admission_no=?1", STUDENT_COLUMNS);
    conn.query_row(&sql, params![adm], student_from_row)
        .optional()?
        .ok_or_else(|| WalletError::StudentNotFound(adm.to_string()).into())
}

pub const ITEM_COLUMNS: &str = "id, name, quantity, cost_price, selling_price";

pub fn item_from_row(r: &Row<'_>) -> rusqlite::Result<StockItem> {
    Ok(StockItem {
        id: r.get(0)?,
        name: r.get(1)?,
        quantity: r.get(2)?,
        cost_price: decimal_at(r, 3)?,
        selling_price: decimal_at(r, 4)?,
    })
}

pub fn item_by_name(conn: &Connection, name: &str) -> Result<StockItem> {
    let n = name.trim();
    let sql = format!("SELECT {} FROM stock_items WHERE name=?1", ITEM_COLUMNS);
    conn.query_row(&sql, params![n], item_from_row)
        .optional()?
        .ok_or_else(|| WalletError::ItemNotFound(n.to_string()).into())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key='currency'", [], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()))
}

pub fn set_currency(conn: &Connection, ccy: &str) -> Result<()> {
    set_setting(conn, "currency", ccy)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}
