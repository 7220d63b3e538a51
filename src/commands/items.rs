// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{WalletError, is_foreign_key_violation, is_unique_violation};
use crate::models::StockItem;
use crate::utils::{
    ITEM_COLUMNS, fmt_money, get_currency, item_by_name, item_from_row, maybe_print_json,
    now_ts, parse_decimal, parse_quantity, pretty_table, required,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let item = add_item(
                conn,
                sub.get_one::<String>("name").unwrap(),
                parse_quantity(sub.get_one::<String>("quantity").unwrap())?,
                parse_decimal(sub.get_one::<String>("cost").unwrap())?,
                parse_decimal(sub.get_one::<String>("price").unwrap())?,
            )?;
            println!(
                "Added item '{}' (qty {}, cost {}, price {})",
                item.name, item.quantity, item.cost_price, item.selling_price
            );
        }
        Some(("list", sub)) => {
            let data = list_items(
                conn,
                sub.get_one::<String>("search").map(|s| s.as_str()),
                sub.get_one::<i64>("low").copied(),
            )?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let ccy = get_currency(conn)?;
                let rows = data
                    .iter()
                    .map(|i| {
                        vec![
                            i.name.clone(),
                            i.quantity.to_string(),
                            fmt_money(&i.cost_price, &ccy),
                            fmt_money(&i.selling_price, &ccy),
                            fmt_money(&(i.selling_price - i.cost_price), &ccy),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Item", "Qty", "Cost", "Price", "Margin"], rows)
                );
            }
        }
        Some(("update", sub)) => {
            let changes = ItemChanges {
                name: sub.get_one::<String>("rename").cloned(),
                quantity: sub
                    .get_one::<String>("quantity")
                    .map(|s| parse_quantity(s))
                    .transpose()?,
                cost_price: sub
                    .get_one::<String>("cost")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
                selling_price: sub
                    .get_one::<String>("price")
                    .map(|s| parse_decimal(s))
                    .transpose()?,
            };
            let item = update_item(conn, sub.get_one::<String>("name").unwrap(), &changes)?;
            println!("Updated item '{}'", item.name);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            remove_item(conn, name)?;
            println!("Removed item '{}'", name.trim());
        }
        _ => {}
    }
    Ok(())
}

fn check_numbers(quantity: i64, cost: Decimal, price: Decimal) -> Result<(), WalletError> {
    if quantity < 0 {
        return Err(WalletError::Validation(format!(
            "Quantity {} cannot be negative",
            quantity
        )));
    }
    if cost < Decimal::ZERO || price < Decimal::ZERO {
        return Err(WalletError::Validation(
            "Cost and selling price cannot be negative".into(),
        ));
    }
    Ok(())
}

pub fn add_item(
    conn: &Connection,
    name: &str,
    quantity: i64,
    cost_price: Decimal,
    selling_price: Decimal,
) -> Result<StockItem> {
    let name = required("name", name)?;
    check_numbers(quantity, cost_price, selling_price)?;
    let ts = now_ts();
    let inserted = conn.execute(
        "INSERT INTO stock_items(name, quantity, cost_price, selling_price, created_at, updated_at)
         VALUES (?1,?2,?3,?4,?5,?5)",
        params![
            name,
            quantity,
            cost_price.to_string(),
            selling_price.to_string(),
            ts
        ],
    );
    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(WalletError::DuplicateItem(name).into()),
        Err(e) => return Err(e.into()),
    }
    info!(item = %name, quantity, "stock item added");
    item_by_name(conn, &name)
}

/// Search text is matched literally, so `%` and `_` are not wildcards.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Items ordered by name. `low_stock` keeps only those at or below the
/// threshold.
pub fn list_items(
    conn: &Connection,
    search: Option<&str>,
    low_stock: Option<i64>,
) -> Result<Vec<StockItem>> {
    let mut sql = format!("SELECT {} FROM stock_items WHERE 1=1", ITEM_COLUMNS);
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(s) = search.map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(" AND lower(name) LIKE ? ESCAPE '\\'");
        params_vec.push(format!("%{}%", escape_like(&s.to_lowercase())));
    }
    if let Some(low) = low_stock {
        sql.push_str(" AND quantity <= ?");
        params_vec.push(low.to_string());
    }
    sql.push_str(" ORDER BY name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), item_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

#[derive(Debug, Default, Clone)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

pub fn update_item(conn: &Connection, name: &str, changes: &ItemChanges) -> Result<StockItem> {
    let current = item_by_name(conn, name)?;
    let new_name = match changes.name.as_deref() {
        Some(n) => required("name", n)?,
        None => current.name.clone(),
    };
    let quantity = changes.quantity.unwrap_or(current.quantity);
    let cost = changes.cost_price.unwrap_or(current.cost_price);
    let price = changes.selling_price.unwrap_or(current.selling_price);
    check_numbers(quantity, cost, price)?;
    let updated = conn.execute(
        "UPDATE stock_items SET name=?1, quantity=?2, cost_price=?3, selling_price=?4,
         updated_at=?5 WHERE id=?6",
        params![
            new_name,
            quantity,
            cost.to_string(),
            price.to_string(),
            now_ts(),
            current.id
        ],
    );
    match updated {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(WalletError::DuplicateItem(new_name).into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(item = %new_name, quantity, "stock item updated");
    item_by_name(conn, &new_name)
}

pub fn remove_item(conn: &Connection, name: &str) -> Result<()> {
    let item = item_by_name(conn, name)?;
    let deleted = conn.execute("DELETE FROM stock_items WHERE id=?1", params![item.id]);
    match deleted {
        Ok(_) => {}
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(WalletError::ItemInUse(item.name).into());
        }
        Err(e) => return Err(e.into()),
    }
    info!(item = %item.name, "stock item removed");
    Ok(())
}
