// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tuckshop::commands::items::add_item;
use tuckshop::commands::restock::{self, query_rows, record_stock_purchase};
use tuckshop::error::WalletError;
use tuckshop::utils::item_by_name;
use tuckshop::{cli, db};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    add_item(&conn, "Juice", 10, d("20"), d("35")).unwrap();
    conn
}

#[test]
fn restock_reaverages_cost_and_adds_quantity() {
    let mut conn = setup();
    let sp = record_stock_purchase(&mut conn, "Juice", "Fresh Farms", 30, d("40")).unwrap();
    assert_eq!(sp.total_cost, d("1200"));
    assert_eq!(sp.supplier, "Fresh Farms");

    let item = item_by_name(&conn, "Juice").unwrap();
    assert_eq!(item.quantity, 40);
    // (10*20 + 30*40) / 40 = 35
    assert_eq!(item.cost_price, d("35"));
    assert_eq!(item.selling_price, d("35"));
}

#[test]
fn restock_of_empty_item_takes_delivery_cost() {
    let mut conn = db::open_in_memory().unwrap();
    add_item(&conn, "Crisps", 0, d("0"), d("25")).unwrap();
    record_stock_purchase(&mut conn, "Crisps", "Snackco", 24, d("12.50")).unwrap();
    let item = item_by_name(&conn, "Crisps").unwrap();
    assert_eq!(item.quantity, 24);
    assert_eq!(item.cost_price, d("12.5"));
}

#[test]
fn consecutive_restocks_match_the_formula() {
    let mut conn = setup();
    record_stock_purchase(&mut conn, "Juice", "A", 5, d("26")).unwrap();
    // (10*20 + 5*26) / 15 = 22
    assert_eq!(item_by_name(&conn, "Juice").unwrap().cost_price, d("22"));
    record_stock_purchase(&mut conn, "Juice", "B", 5, d("30")).unwrap();
    // (15*22 + 5*30) / 20 = 24
    let item = item_by_name(&conn, "Juice").unwrap();
    assert_eq!(item.cost_price, d("24"));
    assert_eq!(item.quantity, 20);

    let rows = query_rows(&conn, Some("Juice"), None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].supplier, "B");
}

#[test]
fn restock_rejects_invalid_input_without_writes() {
    let mut conn = setup();
    let err = record_stock_purchase(&mut conn, "Juice", "A", 0, d("10")).unwrap_err();
    assert_eq!(err.downcast_ref::<WalletError>(), Some(&WalletError::InvalidQuantity(0)));
    let err = record_stock_purchase(&mut conn, "Juice", "A", 5, d("0")).unwrap_err();
    assert_eq!(err.downcast_ref::<WalletError>(), Some(&WalletError::InvalidAmount(d("0"))));
    let err = record_stock_purchase(&mut conn, "Juice", "  ", 5, d("10")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<WalletError>(),
        Some(WalletError::Validation(_))
    ));
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM stock_purchases", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(item_by_name(&conn, "Juice").unwrap().quantity, 10);
}

#[test]
fn cli_record_trims_item_name() {
    let mut conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "tuckshop",
        "restock",
        "record",
        "--item",
        "  Juice ",
        "--supplier",
        "Fresh Farms",
        "--quantity",
        " 10 ",
        "--cost",
        "20",
    ]);
    if let Some(("restock", m)) = matches.subcommand() {
        restock::handle(&mut conn, m).unwrap();
    } else {
        panic!("no restock subcommand");
    }
    assert_eq!(item_by_name(&conn, "Juice").unwrap().quantity, 20);
}

#[test]
fn oversized_delivery_is_rejected_without_writes() {
    let mut conn = setup();
    let err = record_stock_purchase(
        &mut conn,
        "Juice",
        "Acme",
        9_000_000_000_000_000_000,
        d("100000000000"),
    )
    .unwrap_err();
    assert_eq!(
        err.downcast_ref::<WalletError>(),
        Some(&WalletError::OutOfRange("line total"))
    );

    let err = record_stock_purchase(&mut conn, "Juice", "Acme", i64::MAX, d("0.0000001"))
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<WalletError>(),
        Some(&WalletError::OutOfRange("quantity"))
    );

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM stock_purchases", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    let item = item_by_name(&conn, "Juice").unwrap();
    assert_eq!(item.quantity, 10);
    assert_eq!(item.cost_price, d("20"));
}
