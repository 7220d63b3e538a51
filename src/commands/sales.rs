// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{line_total, sale_profit};
use crate::error::WalletError;
use crate::models::DailySale;
use crate::utils::{
    fmt_money, get_currency, item_by_name, maybe_print_json, now_ts, parse_date,
    parse_quantity, pretty_table,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("record", sub)) => {
            let item = sub.get_one::<String>("item").unwrap();
            let qty = parse_quantity(sub.get_one::<String>("quantity").unwrap())?;
            let date = match sub.get_one::<String>("date") {
                Some(d) => parse_date(d)?,
                None => chrono::Local::now().date_naive(),
            };
            let sale = record_daily_sale(conn, item, qty, date)?;
            let ccy = get_currency(conn)?;
            println!(
                "Sold {} x {} on {} for {} (profit {})",
                sale.quantity,
                item.trim(),
                sale.sale_date,
                fmt_money(&sale.total_amount, &ccy),
                fmt_money(&sale.profit, &ccy)
            );
        }
        Some(("list", sub)) => {
            let date = sub
                .get_one::<String>("date")
                .map(|d| parse_date(d))
                .transpose()?;
            let data = query_rows(conn, date, sub.get_one::<usize>("limit").copied())?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.sale_date.clone(),
                            r.item.clone(),
                            r.quantity.to_string(),
                            r.selling_price.clone(),
                            r.cost_price.clone(),
                            r.total_amount.clone(),
                            r.profit.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Date", "Item", "Qty", "Price", "Cost", "Total", "Profit"],
                        rows
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}

/// Sells stock over the counter. Prices are snapshotted from the item at the
/// time of sale so later price changes do not rewrite history.
pub fn record_daily_sale(
    conn: &mut Connection,
    item_name: &str,
    quantity: i64,
    sale_date: NaiveDate,
) -> Result<DailySale> {
    if quantity <= 0 {
        return Err(WalletError::InvalidQuantity(quantity).into());
    }
    let tx = conn.transaction()?;
    let item = item_by_name(&tx, item_name)?;
    if quantity > item.quantity {
        warn!(item = %item.name, requested = quantity, available = item.quantity, "sale rejected");
        return Err(WalletError::InsufficientStock {
            item: item.name,
            requested: quantity,
            available: item.quantity,
        }
        .into());
    }
    let total = line_total(item.selling_price, quantity)?;
    let profit = sale_profit(item.selling_price, item.cost_price, quantity)?;
    tx.execute(
        "INSERT INTO daily_sales(item_id, sale_date, quantity, selling_price, cost_price, total_amount, profit, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.id,
            sale_date.to_string(),
            quantity,
            item.selling_price.to_string(),
            item.cost_price.to_string(),
            total.to_string(),
            profit.to_string(),
            now_ts()
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "UPDATE stock_items SET quantity=quantity-?1, updated_at=?2 WHERE id=?3",
        params![quantity, now_ts(), item.id],
    )?;
    tx.commit()?;
    info!(item = %item.name, quantity, date = %sale_date, profit = %profit, "daily sale recorded");
    Ok(DailySale {
        id,
        item_id: item.id,
        sale_date,
        quantity,
        selling_price: item.selling_price,
        cost_price: item.cost_price,
        total_amount: total,
        profit,
    })
}

#[derive(Debug, Serialize)]
pub struct DailySaleRow {
    pub sale_date: String,
    pub item: String,
    pub quantity: i64,
    pub selling_price: String,
    pub cost_price: String,
    pub total_amount: String,
    pub profit: String,
}

pub fn query_rows(
    conn: &Connection,
    date: Option<NaiveDate>,
    limit: Option<usize>,
) -> Result<Vec<DailySaleRow>> {
    let mut sql = String::from(
        "SELECT d.sale_date, i.name, d.quantity, d.selling_price, d.cost_price, d.total_amount, d.profit
         FROM daily_sales d JOIN stock_items i ON d.item_id=i.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(d) = date {
        sql.push_str(" AND d.sale_date=?");
        params_vec.push(d.to_string());
    }
    sql.push_str(" ORDER BY d.sale_date DESC, d.id DESC");
    if let Some(limit) = limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(DailySaleRow {
            sale_date: r.get(0)?,
            item: r.get(1)?,
            quantity: r.get(2)?,
            selling_price: r.get(3)?,
            cost_price: r.get(4)?,
            total_amount: r.get(5)?,
            profit: r.get(6)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}
