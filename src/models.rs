// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub admission_no: String,
    pub class_code: String,
    pub balance: Decimal,
    pub total_paid: Decimal,
    pub total_spent: Decimal,
    pub last_payment: Option<String>, // RFC 3339
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Deposit,
    Spend,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Deposit => "deposit",
            TxType::Spend => "spend",
        }
    }
}

impl FromStr for TxType {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deposit" => Ok(TxType::Deposit),
            "spend" => Ok(TxType::Spend),
            other => Err(WalletError::Validation(format!(
                "Unknown transaction type '{}' (use deposit|spend)",
                other
            ))),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Online,
    Cash,
    Credit,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(PaymentMethod::Online),
            "cash" => Ok(PaymentMethod::Cash),
            "credit" => Ok(PaymentMethod::Credit),
            other => Err(WalletError::Validation(format!(
                "Unknown payment method '{}' (use online|cash|credit)",
                other
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub student_id: i64,
    pub amount: Decimal,
    pub r#type: TxType,
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub student_id: i64,
    pub item_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPurchase {
    pub id: i64,
    pub item_id: i64,
    pub supplier: String,
    pub quantity: i64,
    pub cost_per_unit: Decimal,
    pub total_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySale {
    pub id: i64,
    pub item_id: i64,
    pub sale_date: NaiveDate,
    pub quantity: i64,
    pub selling_price: Decimal,
    pub cost_price: Decimal,
    pub total_amount: Decimal,
    pub profit: Decimal,
}

/// The public slice of a student record shown by the balance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub name: String,
    pub admission_no: String,
    pub class_code: String,
    pub balance: Decimal,
    pub total_paid: Decimal,
    pub total_spent: Decimal,
    pub last_payment: Option<String>,
}

impl From<Student> for BalanceView {
    fn from(s: Student) -> Self {
        Self {
            name: s.name,
            admission_no: s.admission_no,
            class_code: s.class_code,
            balance: s.balance,
            total_paid: s.total_paid,
            total_spent: s.total_spent,
            last_payment: s.last_payment,
        }
    }
}
