// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tuckshop::commands::balance::{self, balance_by_admission, balance_by_class};
use tuckshop::commands::students::add_student;
use tuckshop::commands::transactions::record_transaction;
use tuckshop::error::WalletError;
use tuckshop::models::{PaymentMethod, TxType};
use tuckshop::{cli, db};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    add_student(&conn, "Zawadi Mwangi", "ADM-003", "7A").unwrap();
    add_student(&conn, "Amina Hassan", "ADM-001", "7A").unwrap();
    add_student(&conn, "Brian Otieno", "ADM-002", "7B").unwrap();
    record_transaction(&mut conn, "ADM-001", TxType::Deposit, d("300"), PaymentMethod::Cash, None)
        .unwrap();
    record_transaction(&mut conn, "ADM-001", TxType::Spend, d("45"), PaymentMethod::Cash, None)
        .unwrap();
    conn
}

#[test]
fn lookup_by_admission_shows_wallet() {
    let conn = setup();
    let b = balance_by_admission(&conn, " ADM-001 ").unwrap();
    assert_eq!(b.name, "Amina Hassan");
    assert_eq!(b.balance, d("255"));
    assert_eq!(b.total_paid, d("300"));
    assert_eq!(b.total_spent, d("45"));
    assert!(b.last_payment.is_some());
}

#[test]
fn lookup_of_unknown_admission_fails() {
    let conn = setup();
    let err = balance_by_admission(&conn, "ADM-999").unwrap_err();
    assert_eq!(
        err.downcast_ref::<WalletError>(),
        Some(&WalletError::StudentNotFound("ADM-999".into()))
    );
}

#[test]
fn class_lookup_is_sorted_by_name() {
    let conn = setup();
    let class = balance_by_class(&conn, "7A").unwrap();
    let names: Vec<&str> = class.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Amina Hassan", "Zawadi Mwangi"]);
    assert_eq!(class[1].balance, Decimal::ZERO);
    assert!(balance_by_class(&conn, "9Z").unwrap().is_empty());
}

#[test]
fn cli_requires_exactly_one_lookup() {
    assert!(cli::build_cli().try_get_matches_from(["tuckshop", "balance"]).is_err());
    assert!(
        cli::build_cli()
            .try_get_matches_from(["tuckshop", "balance", "--admission", "A", "--class", "7A"])
            .is_err()
    );
}

#[test]
fn cli_balance_for_empty_class_succeeds() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from(["tuckshop", "balance", "--class", "9Z"]);
    if let Some(("balance", m)) = matches.subcommand() {
        balance::handle(&conn, m).unwrap();
    } else {
        panic!("no balance subcommand");
    }
}
