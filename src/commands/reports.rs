// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::{add_amount, add_units, line_total};
use crate::utils::{
    decimal_at, fmt_money, get_currency, maybe_print_json, parse_date, pretty_table,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily-sales", sub)) => daily_sales(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySales {
    pub date: String,
    pub sales: i64,
    pub units: i64,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// Per-day totals over `daily_sales`, newest day first. Bounds are inclusive.
pub fn daily_sales_totals(
    conn: &Connection,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<DaySales>> {
    let mut stmt = conn.prepare(
        "SELECT sale_date, quantity, cost_price, total_amount, profit FROM daily_sales
         ORDER BY sale_date",
    )?;
    let mut rows = stmt.query([])?;
    let mut map: BTreeMap<String, DaySales> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let d: String = r.get(0)?;
        let date = parse_date(&d)?;
        if from.is_some_and(|f| date < f) || to.is_some_and(|t| date > t) {
            continue;
        }
        let qty: i64 = r.get(1)?;
        let cost = line_total(decimal_at(r, 2)?, qty)?;
        let total = decimal_at(r, 3)?;
        let profit = decimal_at(r, 4)?;
        let entry = map.entry(d.clone()).or_insert_with(|| DaySales {
            date: d,
            sales: 0,
            units: 0,
            revenue: Decimal::ZERO,
            cost: Decimal::ZERO,
            profit: Decimal::ZERO,
        });
        entry.sales += 1;
        entry.units = add_units(entry.units, qty)?;
        entry.revenue = add_amount(entry.revenue, total)?;
        entry.cost = add_amount(entry.cost, cost)?;
        entry.profit = add_amount(entry.profit, profit)?;
    }
    Ok(map.into_values().rev().collect())
}

fn daily_sales(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let from = sub
        .get_one::<String>("from")
        .map(|s| parse_date(s))
        .transpose()?;
    let to = sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?;
    let data = daily_sales_totals(conn, from, to)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let ccy = get_currency(conn)?;
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.date.clone(),
                    d.sales.to_string(),
                    d.units.to_string(),
                    fmt_money(&d.revenue, &ccy),
                    fmt_money(&d.cost, &ccy),
                    fmt_money(&d.profit, &ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Sales", "Units", "Revenue", "Cost", "Profit"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub students: i64,
    pub wallet_balance: Decimal,
    pub total_paid: Decimal,
    pub total_spent: Decimal,
    pub stock_units: i64,
    pub stock_value_cost: Decimal,
    pub stock_value_retail: Decimal,
}

pub fn compute_summary(conn: &Connection) -> Result<Summary> {
    let mut s = Summary {
        students: 0,
        wallet_balance: Decimal::ZERO,
        total_paid: Decimal::ZERO,
        total_spent: Decimal::ZERO,
        stock_units: 0,
        stock_value_cost: Decimal::ZERO,
        stock_value_retail: Decimal::ZERO,
    };
    let mut stmt = conn.prepare("SELECT balance, total_paid, total_spent FROM students")?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        s.students += 1;
        s.wallet_balance = add_amount(s.wallet_balance, decimal_at(r, 0)?)?;
        s.total_paid = add_amount(s.total_paid, decimal_at(r, 1)?)?;
        s.total_spent = add_amount(s.total_spent, decimal_at(r, 2)?)?;
    }
    let mut stmt = conn.prepare("SELECT quantity, cost_price, selling_price FROM stock_items")?;
    let mut rows = stmt.query([])?;
    while let Some(r) = rows.next()? {
        let qty: i64 = r.get(0)?;
        s.stock_units = add_units(s.stock_units, qty)?;
        s.stock_value_cost = add_amount(s.stock_value_cost, line_total(decimal_at(r, 1)?, qty)?)?;
        s.stock_value_retail =
            add_amount(s.stock_value_retail, line_total(decimal_at(r, 2)?, qty)?)?;
    }
    Ok(s)
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let s = compute_summary(conn)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let ccy = get_currency(conn)?;
        let rows = vec![
            vec!["Students".into(), s.students.to_string()],
            vec!["Wallet balances".into(), fmt_money(&s.wallet_balance, &ccy)],
            vec!["Total deposits".into(), fmt_money(&s.total_paid, &ccy)],
            vec!["Total spent".into(), fmt_money(&s.total_spent, &ccy)],
            vec!["Stock units".into(), s.stock_units.to_string()],
            vec!["Stock value (cost)".into(), fmt_money(&s.stock_value_cost, &ccy)],
            vec!["Stock value (retail)".into(), fmt_money(&s.stock_value_retail, &ccy)],
        ];
        println!("{}", pretty_table(&["Metric", "Value"], rows));
    }
    Ok(())
}
