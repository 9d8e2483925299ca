// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Investment,
    Cash,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "Checking",
            AccountKind::Savings => "Savings",
            AccountKind::Credit => "Credit",
            AccountKind::Investment => "Investment",
            AccountKind::Cash => "Cash",
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "investment" => Ok(AccountKind::Investment),
            "cash" => Ok(AccountKind::Cash),
            other => Err(LedgerError::InvalidInput(format!(
                "Unknown account type '{}' (expected Checking|Savings|Credit|Investment|Cash)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    #[serde(rename = "INCOME")]
    Income,
    #[serde(rename = "EXPENSE")]
    Expense,
    #[serde(rename = "TRANSFER")]
    Transfer,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "INCOME",
            TxKind::Expense => "EXPENSE",
            TxKind::Transfer => "TRANSFER",
        }
    }

    /// Signed balance contribution of a transaction of this kind.
    /// TRANSFER has no single-account balance rule and contributes zero.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TxKind::Income => amount,
            TxKind::Expense => -amount,
            TxKind::Transfer => Decimal::ZERO,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TxKind::Income),
            "expense" => Ok(TxKind::Expense),
            "transfer" => Ok(TxKind::Transfer),
            other => Err(LedgerError::InvalidInput(format!(
                "Unknown transaction type '{}' (expected income|expense|transfer)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub currency: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl Transaction {
    /// Signed contribution this transaction makes to its account balance.
    pub fn contribution(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockHolding {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub current_price: Decimal,
    pub currency: String,
    pub sector: Option<String>,
}

impl StockHolding {
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }
}

/// Input for `add_account`; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub currency: String,
    pub color: String,
}

/// Input for `add_transaction`; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub account_id: i64,
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Input for `add_stock`; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHolding {
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub avg_cost: Decimal,
    pub current_price: Decimal,
    pub currency: String,
    pub sector: Option<String>,
}

/// One `(symbol, price)` pair returned by the price-update collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPriceUpdate {
    pub symbol: String,
    pub price: Decimal,
}

/// Closed set of patchable account fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountField {
    Name(String),
    Kind(AccountKind),
    Balance(Decimal),
    Currency(String),
    Color(String),
}

/// Closed set of patchable holding fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HoldingField {
    Name(String),
    Quantity(Decimal),
    AvgCost(Decimal),
    CurrentPrice(Decimal),
    Currency(String),
    Sector(Option<String>),
}
