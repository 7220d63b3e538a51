// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::line_total;
use crate::commands::transactions::post_entry;
use crate::error::WalletError;
use crate::models::{PaymentMethod, Purchase, TxType};
use crate::utils::{
    fmt_money, get_currency, item_by_name, maybe_print_json, now_ts, parse_quantity,
    pretty_table, student_by_admission,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => {
            let adm = sub.get_one::<String>("admission").unwrap();
            let item = sub.get_one::<String>("item").unwrap();
            let qty = parse_quantity(sub.get_one::<String>("quantity").unwrap())?;
            let p = record_purchase(conn, adm, item, qty)?;
            let s = student_by_admission(conn, adm)?;
            let ccy = get_currency(conn)?;
            println!(
                "{} bought {} x {} for {}; balance now {}",
                s.name,
                p.quantity,
                item.trim(),
                fmt_money(&p.total_price, &ccy),
                fmt_money(&s.balance, &ccy)
            );
        }
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// A student buys from stock against their wallet. Stock and balance are
/// checked before anything is written; the purchase row, stock decrement,
/// wallet debit and the matching `spend` entry commit together.
pub fn record_purchase(
    conn: &mut Connection,
    admission_no: &str,
    item_name: &str,
    quantity: i64,
) -> Result<Purchase> {
    if quantity <= 0 {
        return Err(WalletError::InvalidQuantity(quantity).into());
    }
    let tx = conn.transaction()?;
    let student = student_by_admission(&tx, admission_no)?;
    let item = item_by_name(&tx, item_name)?;
    if quantity > item.quantity {
        warn!(item = %item.name, requested = quantity, available = item.quantity, "purchase rejected");
        return Err(WalletError::InsufficientStock {
            item: item.name,
            requested: quantity,
            available: item.quantity,
        }
        .into());
    }
    let total = line_total(item.selling_price, quantity)?;
    if total > student.balance {
        warn!(admission_no = %student.admission_no, total = %total, "purchase rejected");
        return Err(WalletError::InsufficientBalance {
            admission_no: student.admission_no,
            required: total,
            available: student.balance,
        }
        .into());
    }

    tx.execute(
        "INSERT INTO purchases(student_id, item_id, quantity, unit_price, total_price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student.id,
            item.id,
            quantity,
            item.selling_price.to_string(),
            total.to_string(),
            now_ts()
        ],
    )?;
    let purchase_id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE stock_items SET quantity=quantity-?1, updated_at=?2 WHERE id=?3",
        params![quantity, now_ts(), item.id],
    )?;
    if total > rust_decimal::Decimal::ZERO {
        let note = format!("Purchase: {} x {}", quantity, item.name);
        post_entry(
            &tx,
            &student,
            TxType::Spend,
            total,
            PaymentMethod::Credit,
            Some(&note),
        )?;
    }
    tx.commit()?;
    info!(
        admission_no = %student.admission_no,
        item = %item.name,
        quantity,
        total = %total,
        "purchase recorded"
    );
    Ok(Purchase {
        id: purchase_id,
        student_id: student.id,
        item_id: item.id,
        quantity,
        unit_price: item.selling_price,
        total_price: total,
    })
}

#[derive(Debug, Serialize)]
pub struct PurchaseRow {
    pub created_at: String,
    pub admission_no: String,
    pub student: String,
    pub item: String,
    pub quantity: i64,
    pub unit_price: String,
    pub total_price: String,
}

pub fn query_rows(
    conn: &Connection,
    admission_no: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<PurchaseRow>> {
    let mut sql = String::from(
        "SELECT p.created_at, s.admission_no, s.name, i.name, p.quantity, p.unit_price, p.total_price
         FROM purchases p
         JOIN students s ON p.student_id=s.id
         JOIN stock_items i ON p.item_id=i.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(adm) = admission_no {
        sql.push_str(" AND s.admission_no=?");
        params_vec.push(adm.trim().into());
    }
    sql.push_str(" ORDER BY p.created_at DESC, p.id DESC");
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(PurchaseRow {
            created_at: r.get(0)?,
            admission_no: r.get(1)?,
            student: r.get(2)?,
            item: r.get(3)?,
            quantity: r.get(4)?,
            unit_price: r.get(5)?,
            total_price: r.get(6)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(
        conn,
        sub.get_one::<String>("admission").map(|s| s.as_str()),
        sub.get_one::<usize>("limit").copied(),
    )?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|p| {
                vec![
                    p.created_at.clone(),
                    p.admission_no.clone(),
                    p.student.clone(),
                    p.item.clone(),
                    p.quantity.to_string(),
                    p.unit_price.clone(),
                    p.total_price.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["When", "Admission", "Student", "Item", "Qty", "Unit", "Total"],
                rows
            )
        );
    }
    Ok(())
}
