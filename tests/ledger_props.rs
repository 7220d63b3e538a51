// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;
use tuckshop::calc::{sale_profit, weighted_average_cost};
use tuckshop::commands::doctor::find_issues;
use tuckshop::commands::students::{add_student, find_student};
use tuckshop::commands::transactions::record_transaction;
use tuckshop::db;
use tuckshop::models::{PaymentMethod, TxType};

fn cents(c: i64) -> Decimal {
    Decimal::new(c, 2)
}

proptest! {
    #![proptest_config(Config::with_cases(48))]
    #[test]
    fn wallet_invariant_holds_for_any_entry_sequence(
        ops in proptest::collection::vec((any::<bool>(), 1_i64..50_000), 1..24)
    ) {
        let mut conn = db::open_in_memory().unwrap();
        add_student(&conn, "Prop Student", "ADM-P", "7A").unwrap();
        let mut expected = Decimal::ZERO;
        for (deposit, c) in ops {
            let amount = cents(c);
            let kind = if deposit { TxType::Deposit } else { TxType::Spend };
            let res = record_transaction(&mut conn, "ADM-P", kind, amount, PaymentMethod::Cash, None);
            match kind {
                TxType::Deposit => {
                    prop_assert!(res.is_ok());
                    expected += amount;
                }
                TxType::Spend if amount <= expected => {
                    prop_assert!(res.is_ok());
                    expected -= amount;
                }
                TxType::Spend => prop_assert!(res.is_err()),
            }
            let s = find_student(&conn, "ADM-P").unwrap();
            prop_assert_eq!(s.balance, expected);
            prop_assert_eq!(s.balance, s.total_paid - s.total_spent);
            prop_assert!(s.balance >= Decimal::ZERO);
        }
        prop_assert!(find_issues(&conn).unwrap().is_empty());
    }

    #[test]
    fn weighted_cost_lies_between_old_and_new(
        old_qty in 0_i64..1_000,
        old_c in 1_i64..100_000,
        new_qty in 1_i64..1_000,
        new_c in 1_i64..100_000
    ) {
        let (old_cost, new_cost) = (cents(old_c), cents(new_c));
        let avg = weighted_average_cost(old_qty, old_cost, new_qty, new_cost).unwrap();
        prop_assert!(avg >= old_cost.min(new_cost));
        prop_assert!(avg <= old_cost.max(new_cost));
        if old_qty == 0 {
            prop_assert_eq!(avg, new_cost.normalize());
        }
    }

    #[test]
    fn profit_is_revenue_minus_cost(
        sp in 0_i64..100_000,
        cp in 0_i64..100_000,
        qty in 1_i64..500
    ) {
        let (sp, cp) = (cents(sp), cents(cp));
        let q = Decimal::from(qty);
        prop_assert_eq!(sale_profit(sp, cp, qty).unwrap(), sp * q - cp * q);
    }
}
