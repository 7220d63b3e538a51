// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calc::add_amount;
use crate::error::WalletError;
use crate::models::{PaymentMethod, Student, Transaction, TxType};
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, now_ts, parse_decimal, pretty_table,
    student_by_admission,
};
use anyhow::Result;
use rust_decimal::Decimal;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::{info, warn};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("deposit", sub)) => add(conn, sub, TxType::Deposit)?,
        Some(("spend", sub)) => add(conn, sub, TxType::Spend)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches, tx_type: TxType) -> Result<()> {
    let adm = sub.get_one::<String>("admission").unwrap();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let method: PaymentMethod = sub.get_one::<String>("method").unwrap().parse()?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty());

    record_transaction(conn, adm, tx_type, amount, method, note)?;
    let s = student_by_admission(conn, adm)?;
    let ccy = get_currency(conn)?;
    println!(
        "Recorded {} of {} for {} ({}); balance now {}",
        tx_type,
        fmt_money(&amount, &ccy),
        s.name,
        s.admission_no,
        fmt_money(&s.balance, &ccy)
    );
    Ok(())
}

/// Appends a deposit or spend and moves the student's cached totals in the
/// same SQLite transaction.
pub fn record_transaction(
    conn: &mut Connection,
    admission_no: &str,
    tx_type: TxType,
    amount: Decimal,
    method: PaymentMethod,
    note: Option<&str>,
) -> Result<Transaction> {
    let tx = conn.transaction()?;
    let student = student_by_admission(&tx, admission_no)?;
    let entry = post_entry(&tx, &student, tx_type, amount, method, note)?;
    tx.commit()?;
    info!(
        admission_no = %student.admission_no,
        kind = %tx_type,
        method = %method,
        amount = %amount,
        "transaction recorded"
    );
    Ok(entry)
}

/// Applies one ledger entry against `student`. Callers own the surrounding
/// transaction; `student` must have been read inside it.
pub(crate) fn post_entry(
    conn: &Connection,
    student: &Student,
    tx_type: TxType,
    amount: Decimal,
    method: PaymentMethod,
    note: Option<&str>,
) -> Result<Transaction> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(amount).into());
    }
    let ts = now_ts();
    match tx_type {
        TxType::Deposit => {
            let balance = add_amount(student.balance, amount)?;
            let paid = add_amount(student.total_paid, amount)?;
            conn.execute(
                "UPDATE students SET balance=?1, total_paid=?2, last_payment=?3 WHERE id=?4",
                params![
                    balance.to_string(),
                    paid.to_string(),
                    ts,
                    student.id
                ],
            )?;
        }
        TxType::Spend => {
            if amount > student.balance {
                warn!(
                    admission_no = %student.admission_no,
                    amount = %amount,
                    balance = %student.balance,
                    "spend rejected"
                );
                return Err(WalletError::InsufficientBalance {
                    admission_no: student.admission_no.clone(),
                    required: amount,
                    available: student.balance,
                }
                .into());
            }
            let spent = add_amount(student.total_spent, amount)?;
            conn.execute(
                "UPDATE students SET balance=?1, total_spent=?2 WHERE id=?3",
                params![
                    (student.balance - amount).to_string(),
                    spent.to_string(),
                    student.id
                ],
            )?;
        }
    }
    conn.execute(
        "INSERT INTO transactions(student_id, amount, type, method, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            student.id,
            amount.to_string(),
            tx_type.as_str(),
            method.as_str(),
            note,
            ts
        ],
    )?;
    Ok(Transaction {
        id: conn.last_insert_rowid(),
        student_id: student.id,
        amount,
        r#type: tx_type,
        method,
        note: note.map(str::to_string),
        created_at: ts,
    })
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let filter = TransactionFilter {
        admission_no: sub.get_one::<String>("admission").cloned(),
        tx_type: match sub.get_one::<String>("type") {
            Some(t) => Some(t.parse()?),
            None => None,
        },
        limit: sub.get_one::<usize>("limit").copied(),
    };
    let data = query_rows(conn, &filter)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.created_at.clone(),
                    r.admission_no.clone(),
                    r.student.clone(),
                    r.r#type.clone(),
                    r.method.clone(),
                    r.amount.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["When", "Admission", "Student", "Type", "Method", "Amount", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Default, Clone)]
pub struct TransactionFilter {
    pub admission_no: Option<String>,
    pub tx_type: Option<TxType>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub created_at: String,
    pub admission_no: String,
    pub student: String,
    pub r#type: String,
    pub method: String,
    pub amount: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.created_at, s.admission_no, s.name, t.type, t.method, t.amount, t.note
         FROM transactions t JOIN students s ON t.student_id=s.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(adm) = filter.admission_no.as_deref() {
        sql.push_str(" AND s.admission_no=?");
        params_vec.push(adm.trim().into());
    }
    if let Some(t) = filter.tx_type {
        sql.push_str(" AND t.type=?");
        params_vec.push(t.as_str().into());
    }
    sql.push_str(" ORDER BY t.created_at DESC, t.id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let note: Option<String> = r.get(6)?;
        data.push(TransactionRow {
            created_at: r.get(0)?,
            admission_no: r.get(1)?,
            student: r.get(2)?,
            r#type: r.get(3)?,
            method: r.get(4)?,
            amount: r.get(5)?,
            note: note.unwrap_or_default(),
        });
    }
    Ok(data)
}
