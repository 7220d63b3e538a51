// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{add_units, line_total, weighted_average_cost};
use crate::error::WalletError;
use crate::models::StockPurchase;
use crate::utils::{
    fmt_money, get_currency, item_by_name, maybe_print_json, now_ts, parse_decimal,
    parse_quantity, pretty_table, required,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => {
            let item = sub.get_one::<String>("item").unwrap();
            let supplier = sub.get_one::<String>("supplier").unwrap();
            let qty = parse_quantity(sub.get_one::<String>("quantity").unwrap())?;
            let cost = parse_decimal(sub.get_one::<String>("cost").unwrap())?;
            let sp = record_stock_purchase(conn, item, supplier, qty, cost)?;
            let updated = item_by_name(conn, item)?;
            let ccy = get_currency(conn)?;
            println!(
                "Received {} x {} from {} ({}); stock now {}, average cost {}",
                sp.quantity,
                updated.name,
                sp.supplier,
                fmt_money(&sp.total_cost, &ccy),
                updated.quantity,
                fmt_money(&updated.cost_price, &ccy)
            );
        }
        Some(("list", sub)) => {
            let data = query_rows(
                conn,
                sub.get_one::<String>("item").map(|s| s.as_str()),
                sub.get_one::<usize>("limit").copied(),
            )?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.created_at.clone(),
                            r.item.clone(),
                            r.supplier.clone(),
                            r.quantity.to_string(),
                            r.cost_per_unit.clone(),
                            r.total_cost.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["When", "Item", "Supplier", "Qty", "Unit cost", "Total"],
                        rows
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// Logs a supplier delivery, adds it to stock and re-averages the item's
/// cost price by quantity.
pub fn record_stock_purchase(
    conn: &mut Connection,
    item_name: &str,
    supplier: &str,
    quantity: i64,
    cost_per_unit: Decimal,
) -> Result<StockPurchase> {
    let supplier = required("supplier", supplier)?;
    if quantity <= 0 {
        return Err(WalletError::InvalidQuantity(quantity).into());
    }
    if cost_per_unit <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(cost_per_unit).into());
    }
    let tx = conn.transaction()?;
    let item = item_by_name(&tx, item_name)?;
    let total_cost = line_total(cost_per_unit, quantity)?;
    let new_qty = add_units(item.quantity, quantity)?;
    let new_cost = weighted_average_cost(item.quantity, item.cost_price, quantity, cost_per_unit)?;
    let ts = now_ts();
    tx.execute(
        "INSERT INTO stock_purchases(item_id, supplier, quantity, cost_per_unit, total_cost, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.id,
            supplier,
            quantity,
            cost_per_unit.to_string(),
            total_cost.to_string(),
            ts
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE stock_items SET quantity=?1, cost_price=?2, updated_at=?3 WHERE id=?4",
        params![new_qty, new_cost.to_string(), ts, item.id],
    )?;
    tx.commit()?;
    info!(
        item = %item.name,
        supplier = %supplier,
        quantity,
        cost_price = %new_cost,
        "stock purchase recorded"
    );
    Ok(StockPurchase {
        id,
        item_id: item.id,
        supplier,
        quantity,
        cost_per_unit,
        total_cost,
    })
}

#[derive(Debug, Serialize)]
pub struct StockPurchaseRow {
    pub created_at: String,
    pub item: String,
    pub supplier: String,
    pub quantity: i64,
    pub cost_per_unit: String,
    pub total_cost: String,
}

pub fn query_rows(
    conn: &Connection,
    item: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<StockPurchaseRow>> {
    let mut sql = String::from(
        "SELECT sp.created_at, i.name, sp.supplier, sp.quantity, sp.cost_per_unit, sp.total_cost
         FROM stock_purchases sp JOIN stock_items i ON sp.item_id=i.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(name) = item {
        sql.push_str(" AND i.name=?");
        params_vec.push(name.trim().into());
    }
    sql.push_str(" ORDER BY sp.created_at DESC, sp.id DESC");
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(StockPurchaseRow {
            created_at: r.get(0)?,
            item: r.get(1)?,
            supplier: r.get(2)?,
            quantity: r.get(3)?,
            cost_per_unit: r.get(4)?,
            total_cost: r.get(5)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
