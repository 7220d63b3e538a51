// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

// Monetary columns are decimal strings; CHECKs cast them to compare.
const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS students(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL CHECK(length(trim(name)) > 0),
        admission_no TEXT NOT NULL UNIQUE CHECK(length(trim(admission_no)) > 0),
        class_code TEXT NOT NULL CHECK(length(trim(class_code)) > 0),
        balance TEXT NOT NULL DEFAULT '0' CHECK(CAST(balance AS REAL) >= 0),
        total_paid TEXT NOT NULL DEFAULT '0' CHECK(CAST(total_paid AS REAL) >= 0),
        total_spent TEXT NOT NULL DEFAULT '0' CHECK(CAST(total_spent AS REAL) >= 0),
        last_payment TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_code);

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL,
        amount TEXT NOT NULL CHECK(CAST(amount AS REAL) > 0),
        type TEXT NOT NULL CHECK(type IN ('deposit','spend')),
        method TEXT NOT NULL CHECK(method IN ('online','cash','credit')),
        note TEXT,
        created_at TEXT NOT NULL,
        FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_student ON transactions(student_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_created ON transactions(created_at);

    CREATE TABLE IF NOT EXISTS stock_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE CHECK(length(trim(name)) > 0),
        quantity INTEGER NOT NULL DEFAULT 0 CHECK(quantity >= 0),
        cost_price TEXT NOT NULL DEFAULT '0' CHECK(CAST(cost_price AS REAL) >= 0),
        selling_price TEXT NOT NULL DEFAULT '0' CHECK(CAST(selling_price AS REAL) >= 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS purchases(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id INTEGER NOT NULL,
        item_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK(quantity > 0),
        unit_price TEXT NOT NULL CHECK(CAST(unit_price AS REAL) >= 0),
        total_price TEXT NOT NULL CHECK(CAST(total_price AS REAL) >= 0),
        created_at TEXT NOT NULL,
        FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
        FOREIGN KEY(item_id) REFERENCES stock_items(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_purchases_student ON purchases(student_id);

    CREATE TABLE IF NOT EXISTS stock_purchases(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL,
        supplier TEXT NOT NULL CHECK(length(trim(supplier)) > 0),
        quantity INTEGER NOT NULL CHECK(quantity > 0),
        cost_per_unit TEXT NOT NULL CHECK(CAST(cost_per_unit AS REAL) > 0),
        total_cost TEXT NOT NULL CHECK(CAST(total_cost AS REAL) > 0),
        created_at TEXT NOT NULL,
        FOREIGN KEY(item_id) REFERENCES stock_items(id) ON DELETE RESTRICT
    );

    CREATE TABLE IF NOT EXISTS daily_sales(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL,
        sale_date TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK(quantity > 0),
        selling_price TEXT NOT NULL CHECK(CAST(selling_price AS REAL) >= 0),
        cost_price TEXT NOT NULL CHECK(CAST(cost_price AS REAL) >= 0),
        total_amount TEXT NOT NULL,
        profit TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY(item_id) REFERENCES stock_items(id) ON DELETE RESTRICT
    );
    CREATE INDEX IF NOT EXISTS idx_daily_sales_date ON daily_sales(sale_date);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions(
        token_hash TEXT PRIMARY KEY,
        created_at TEXT NOT NULL,
        expires_at TEXT NOT NULL
    );
    "#,
];

pub fn open_at(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Create data dir {}", dir.display()))?;
    }
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn schema_version(conn: &Connection) -> Result<usize> {
    let v: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(v as usize)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    let current = schema_version(conn)?;
    if current >= MIGRATIONS.len() {
        return Ok(());
    }
    let tx = conn.transaction()?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        debug!(version = idx + 1, "applying migration");
        tx.execute_batch(sql)
            .with_context(|| format!("Apply migration {}", idx + 1))?;
    }
    tx.pragma_update(None, "user_version", MIGRATIONS.len() as i64)?;
    tx.commit()?;
    Ok(())
}

pub fn latest_version() -> usize {
    MIGRATIONS.len()
}
