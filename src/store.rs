// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The store contract: per-user collections, snapshot-replace
//! subscriptions, and atomic multi-document writes.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::path::Path;
use std::str::FromStr;

use crate::errors::{LedgerError, Result};
use crate::fx::{self, FxTable};
use crate::models::{
    Account, AccountField, AccountKind, HoldingField, NewAccount, NewHolding, StockHolding,
    Transaction, TransactionDraft, TxKind,
};

/// A full-collection snapshot pushed by the store. Each event replaces
/// the subscriber's view of that collection wholesale; there are no
/// incremental deltas.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    Accounts(Vec<Account>),
    Transactions(Vec<Transaction>),
    Holdings(Vec<StockHolding>),
}

/// One write inside a batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertAccount(NewAccount),
    UpdateAccount { id: i64, fields: Vec<AccountField> },
    DeleteAccount { id: i64 },
    InsertTransaction(TransactionDraft),
    DeleteTransaction { id: i64 },
    AdjustBalance { account_id: i64, delta: Decimal },
    InsertHolding(NewHolding),
    UpdateHolding { id: i64, fields: Vec<HoldingField> },
    DeleteHolding { id: i64 },
}

/// An atomic multi-document write: all ops commit together or none do.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// External document-store contract: user-scoped queries,
/// live snapshot subscription, and transactional multi-writes. Write
/// failures surface as rejected operations; nothing is partially applied.
pub trait Store {
    /// Begin delivering snapshot events for one user. The initial full
    /// snapshots are queued immediately.
    fn subscribe(&mut self, user: &str) -> Result<()>;

    /// Stop delivering events and drop anything still queued.
    fn unsubscribe(&mut self);

    /// Drain pending snapshot events in delivery order.
    fn poll_events(&mut self) -> Vec<StoreEvent>;

    /// Commit a batch atomically, then queue refreshed snapshots for the
    /// touched collections (if this user is subscribed).
    fn commit(&mut self, user: &str, batch: WriteBatch) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
struct Touched {
    accounts: bool,
    transactions: bool,
    holdings: bool,
}

/// SQLite-backed store. Decimals are stored as TEXT, collections carry a
/// `user_id` column, and `transactions.account_id` has no foreign key so
/// dangling references survive account deletion.
pub struct SqliteStore {
    conn: Connection,
    subscriber: Option<String>,
    pending: VecDeque<StoreEvent>,
}

fn config_err(e: anyhow::Error) -> LedgerError {
    LedgerError::ConfigurationInvalid(format!("{:#}", e))
}

impl SqliteStore {
    pub fn open_or_init() -> Result<Self> {
        Ok(Self::from_conn(crate::db::open_or_init().map_err(config_err)?))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        Ok(Self::from_conn(crate::db::open_at(path).map_err(config_err)?))
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_conn(
            crate::db::open_in_memory().map_err(config_err)?,
        ))
    }

    fn from_conn(conn: Connection) -> Self {
        SqliteStore {
            conn,
            subscriber: None,
            pending: VecDeque::new(),
        }
    }

    // ---- settings -------------------------------------------------------

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let v: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
                r.get(0)
            })
            .optional()?;
        Ok(v)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings(key, value) VALUES(?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key=?1", params![key])?;
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<String>> {
        self.get_setting("current_user")
    }

    pub fn sign_in(&self, user: &str) -> Result<()> {
        if user.trim().is_empty() {
            return Err(LedgerError::InvalidInput("User name is empty".into()));
        }
        self.set_setting("current_user", user.trim())
    }

    pub fn sign_out(&self) -> Result<()> {
        self.delete_setting("current_user")
    }

    pub fn base_currency(&self) -> Result<String> {
        Ok(self
            .get_setting("base_currency")?
            .unwrap_or_else(|| fx::DEFAULT_BASE.to_string()))
    }

    pub fn set_base_currency(&self, ccy: &str) -> Result<()> {
        self.set_setting("base_currency", &ccy.to_uppercase())
    }

    pub fn set_fx_rate(&self, ccy: &str, rate: Decimal) -> Result<()> {
        self.set_setting(&format!("fx_rate:{}", ccy.to_uppercase()), &rate.to_string())
    }

    /// Current conversion table: configured rates on top of the default
    /// USD approximation.
    pub fn fx_table(&self) -> Result<FxTable> {
        let mut table = FxTable::new(self.base_currency()?)
            .with_rate("USD", fx::default_usd_rate());
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings WHERE key LIKE 'fx_rate:%'")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            let ccy = key.trim_start_matches("fx_rate:").to_string();
            let rate = Decimal::from_str_exact(&value).map_err(|e| {
                LedgerError::ConfigurationInvalid(format!("Bad fx rate for {}: {}", ccy, e))
            })?;
            table.set_rate(ccy, rate);
        }
        Ok(table)
    }

    pub fn api_key(&self) -> Result<Option<String>> {
        self.get_setting("gemini_api_key")
    }

    pub fn set_api_key(&self, key: &str) -> Result<()> {
        self.set_setting("gemini_api_key", key)
    }

    // ---- queries --------------------------------------------------------

    pub fn load_accounts(&self, user: &str) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, type, balance, currency, color
             FROM accounts WHERE user_id=?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user], |r| {
            Ok(Account {
                id: r.get(0)?,
                name: r.get(1)?,
                kind: kind_col::<AccountKind>(r, 2)?,
                balance: decimal_col(r, 3)?,
                currency: r.get(4)?,
                color: r.get(5)?,
            })
        })?;
        collect(rows)
    }

    pub fn load_transactions(&self, user: &str) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_id, type, amount, category, date, note
             FROM transactions WHERE user_id=?1 ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![user], |r| {
            Ok(Transaction {
                id: r.get(0)?,
                account_id: r.get(1)?,
                kind: kind_col::<TxKind>(r, 2)?,
                amount: decimal_col(r, 3)?,
                category: r.get(4)?,
                date: r.get::<_, NaiveDate>(5)?,
                note: r.get(6)?,
            })
        })?;
        collect(rows)
    }

    pub fn load_holdings(&self, user: &str) -> Result<Vec<StockHolding>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, symbol, name, quantity, avg_cost, current_price, currency, sector
             FROM holdings WHERE user_id=?1 ORDER BY symbol, id",
        )?;
        let rows = stmt.query_map(params![user], |r| {
            Ok(StockHolding {
                id: r.get(0)?,
                symbol: r.get(1)?,
                name: r.get(2)?,
                quantity: decimal_col(r, 3)?,
                avg_cost: decimal_col(r, 4)?,
                current_price: decimal_col(r, 5)?,
                currency: r.get(6)?,
                sector: r.get(7)?,
            })
        })?;
        collect(rows)
    }

    // ---- write ops ------------------------------------------------------

    fn exec_op(tx: &rusqlite::Transaction<'_>, user: &str, op: &WriteOp) -> Result<()> {
        match op {
            WriteOp::InsertAccount(a) => {
                tx.execute(
                    "INSERT INTO accounts(user_id, name, type, balance, currency, color)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        user,
                        a.name,
                        a.kind.as_str(),
                        a.balance.to_string(),
                        a.currency,
                        a.color
                    ],
                )?;
            }
            WriteOp::UpdateAccount { id, fields } => {
                for field in fields {
                    let (sql, value): (&str, String) = match field {
                        AccountField::Name(v) => ("name", v.clone()),
                        AccountField::Kind(v) => ("type", v.as_str().to_string()),
                        AccountField::Balance(v) => ("balance", v.to_string()),
                        AccountField::Currency(v) => ("currency", v.clone()),
                        AccountField::Color(v) => ("color", v.clone()),
                    };
                    let n = tx.execute(
                        &format!("UPDATE accounts SET {}=?1 WHERE id=?2 AND user_id=?3", sql),
                        params![value, id, user],
                    )?;
                    if n == 0 {
                        return Err(LedgerError::WriteRejected(format!(
                            "Account {} does not exist",
                            id
                        )));
                    }
                }
            }
            WriteOp::DeleteAccount { id } => {
                // Idempotent; transactions keep their dangling account_id.
                tx.execute(
                    "DELETE FROM accounts WHERE id=?1 AND user_id=?2",
                    params![id, user],
                )?;
            }
            WriteOp::InsertTransaction(t) => {
                tx.execute(
                    "INSERT INTO transactions(user_id, account_id, type, amount, category, date, note)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        user,
                        t.account_id,
                        t.kind.as_str(),
                        t.amount.to_string(),
                        t.category,
                        t.date.to_string(),
                        t.note
                    ],
                )?;
            }
            WriteOp::DeleteTransaction { id } => {
                tx.execute(
                    "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
                    params![id, user],
                )?;
            }
            WriteOp::AdjustBalance { account_id, delta } => {
                let current: Option<String> = tx
                    .query_row(
                        "SELECT balance FROM accounts WHERE id=?1 AND user_id=?2",
                        params![account_id, user],
                        |r| r.get(0),
                    )
                    .optional()?;
                let Some(current) = current else {
                    return Err(LedgerError::WriteRejected(format!(
                        "Account {} missing for balance adjustment",
                        account_id
                    )));
                };
                let balance = Decimal::from_str_exact(&current).map_err(|e| {
                    LedgerError::WriteRejected(format!(
                        "Invalid stored balance '{}' for account {}: {}",
                        current, account_id, e
                    ))
                })?;
                tx.execute(
                    "UPDATE accounts SET balance=?1 WHERE id=?2 AND user_id=?3",
                    params![(balance + delta).to_string(), account_id, user],
                )?;
            }
            WriteOp::InsertHolding(h) => {
                tx.execute(
                    "INSERT INTO holdings(user_id, symbol, name, quantity, avg_cost, current_price, currency, sector)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        user,
                        h.symbol,
                        h.name,
                        h.quantity.to_string(),
                        h.avg_cost.to_string(),
                        h.current_price.to_string(),
                        h.currency,
                        h.sector
                    ],
                )?;
            }
            WriteOp::UpdateHolding { id, fields } => {
                for field in fields {
                    let (sql, value): (&str, Option<String>) = match field {
                        HoldingField::Name(v) => ("name", Some(v.clone())),
                        HoldingField::Quantity(v) => ("quantity", Some(v.to_string())),
                        HoldingField::AvgCost(v) => ("avg_cost", Some(v.to_string())),
                        HoldingField::CurrentPrice(v) => ("current_price", Some(v.to_string())),
                        HoldingField::Currency(v) => ("currency", Some(v.clone())),
                        HoldingField::Sector(v) => ("sector", v.clone()),
                    };
                    let n = tx.execute(
                        &format!("UPDATE holdings SET {}=?1 WHERE id=?2 AND user_id=?3", sql),
                        params![value, id, user],
                    )?;
                    if n == 0 {
                        return Err(LedgerError::WriteRejected(format!(
                            "Holding {} does not exist",
                            id
                        )));
                    }
                }
            }
            WriteOp::DeleteHolding { id } => {
                tx.execute(
                    "DELETE FROM holdings WHERE id=?1 AND user_id=?2",
                    params![id, user],
                )?;
            }
        }
        Ok(())
    }

    fn touched_by(op: &WriteOp, touched: &mut Touched) {
        match op {
            WriteOp::InsertAccount(_)
            | WriteOp::UpdateAccount { .. }
            | WriteOp::DeleteAccount { .. }
            | WriteOp::AdjustBalance { .. } => touched.accounts = true,
            WriteOp::InsertTransaction(_) | WriteOp::DeleteTransaction { .. } => {
                touched.transactions = true
            }
            WriteOp::InsertHolding(_)
            | WriteOp::UpdateHolding { .. }
            | WriteOp::DeleteHolding { .. } => touched.holdings = true,
        }
    }

    fn notify(&mut self, user: &str, touched: Touched) -> Result<()> {
        if self.subscriber.as_deref() != Some(user) {
            return Ok(());
        }
        if touched.accounts {
            let snapshot = self.load_accounts(user)?;
            self.pending.push_back(StoreEvent::Accounts(snapshot));
        }
        if touched.transactions {
            let snapshot = self.load_transactions(user)?;
            self.pending.push_back(StoreEvent::Transactions(snapshot));
        }
        if touched.holdings {
            let snapshot = self.load_holdings(user)?;
            self.pending.push_back(StoreEvent::Holdings(snapshot));
        }
        Ok(())
    }

    /// Raw connection, for maintenance commands.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn subscribe(&mut self, user: &str) -> Result<()> {
        self.subscriber = Some(user.to_string());
        self.pending.clear();
        let accounts = self.load_accounts(user)?;
        let transactions = self.load_transactions(user)?;
        let holdings = self.load_holdings(user)?;
        self.pending.push_back(StoreEvent::Accounts(accounts));
        self.pending.push_back(StoreEvent::Transactions(transactions));
        self.pending.push_back(StoreEvent::Holdings(holdings));
        Ok(())
    }

    fn unsubscribe(&mut self) {
        self.subscriber = None;
        self.pending.clear();
    }

    fn poll_events(&mut self) -> Vec<StoreEvent> {
        self.pending.drain(..).collect()
    }

    fn commit(&mut self, user: &str, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut touched = Touched::default();
        for op in batch.ops() {
            Self::touched_by(op, &mut touched);
        }
        let tx = self.conn.transaction()?;
        for op in batch.ops() {
            Self::exec_op(&tx, user, op)?;
        }
        tx.commit()?;
        self.notify(user, touched)
    }
}

fn decimal_col(r: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    Decimal::from_str_exact(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn kind_col<T>(r: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = LedgerError>,
{
    let s: String = r.get(idx)?;
    s.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
