// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory view of one user's accounts, transactions, and holdings.
//!
//! The ledger is a pure reducer over the store's snapshot events: each
//! event replaces one collection wholesale, so readers never observe a
//! partially applied update. Derived views are pure functions over the
//! current state and carry no hidden counters.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::fx::FxTable;
use crate::models::{Account, StockHolding, Transaction, TxKind};
use crate::store::StoreEvent;

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    holdings: Vec<StockHolding>,
}

/// Income/expense totals for one `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthFlow {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Apply one snapshot-replace event.
    pub fn apply(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Accounts(accounts) => self.accounts = accounts,
            StoreEvent::Transactions(mut transactions) => {
                // Newest first, matching the store's delivery order even
                // for synthetic event streams.
                transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
                self.transactions = transactions;
            }
            StoreEvent::Holdings(holdings) => self.holdings = holdings,
        }
    }

    /// Discard all state, as on sign-out.
    pub fn clear(&mut self) {
        self.accounts.clear();
        self.transactions.clear();
        self.holdings.clear();
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn holdings(&self) -> &[StockHolding] {
        &self.holdings
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn transaction(&self, id: i64) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn holding(&self, id: i64) -> Option<&StockHolding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    /// Newest `n` transactions (date desc, id desc).
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..self.transactions.len().min(n)]
    }

    /// Cash balances plus holdings at market value, with holding
    /// currencies converted through the fixed-rate table. Account
    /// balances are summed as-is, as the original books do.
    pub fn total_assets(&self, fx: &FxTable) -> Decimal {
        let cash: Decimal = self.accounts.iter().map(|a| a.balance).sum();
        let stocks: Decimal = self
            .holdings
            .iter()
            .map(|h| fx.to_base(h.market_value(), &h.currency))
            .sum();
        cash + stocks
    }

    /// Income and expense totals for one `YYYY-MM` month.
    /// TRANSFER rows count toward neither side.
    pub fn monthly_totals(&self, month: &str) -> MonthFlow {
        let mut flow = MonthFlow {
            month: month.to_string(),
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        };
        for t in &self.transactions {
            if month_key(t) != month {
                continue;
            }
            match t.kind {
                TxKind::Income => flow.income += t.amount,
                TxKind::Expense => flow.expense += t.amount,
                TxKind::Transfer => {}
            }
        }
        flow
    }

    /// Per-category totals for one transaction kind, largest first.
    pub fn category_totals(&self, kind: TxKind) -> Vec<(String, Decimal)> {
        let mut agg: BTreeMap<&str, Decimal> = BTreeMap::new();
        for t in self.transactions.iter().filter(|t| t.kind == kind) {
            *agg.entry(t.category.as_str()).or_insert(Decimal::ZERO) += t.amount;
        }
        let mut items: Vec<(String, Decimal)> = agg
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        items
    }

    /// Income/expense per month, ascending by `YYYY-MM` key. Zero-padded
    /// keys sort lexicographically in calendar order.
    pub fn trend_by_month(&self) -> Vec<MonthFlow> {
        let mut agg: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for t in &self.transactions {
            let entry = agg
                .entry(month_key(t))
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match t.kind {
                TxKind::Income => entry.0 += t.amount,
                TxKind::Expense => entry.1 += t.amount,
                TxKind::Transfer => {}
            }
        }
        agg.into_iter()
            .map(|(month, (income, expense))| MonthFlow {
                month,
                income,
                expense,
            })
            .collect()
    }

    /// Transactions whose account no longer exists.
    pub fn dangling_transactions(&self) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| self.account(t.account_id).is_none())
            .collect()
    }
}

fn month_key(t: &Transaction) -> String {
    t.date.format("%Y-%m").to_string()
}
