// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Session-scoped context for one signed-in user.
//!
//! A session subscribes to the store on open and unsubscribes on close;
//! its ledger changes only through delivered snapshots, never through
//! optimistic local edits. Switching users means closing one session and
//! opening another, so no state leaks across identities.

use rust_decimal::Decimal;

use crate::advisor::PriceProvider;
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;
use crate::models::{
    AccountField, HoldingField, NewAccount, NewHolding, TransactionDraft,
};
use crate::store::{Store, WriteBatch, WriteOp};

pub struct Session<S: Store> {
    store: S,
    user: String,
    ledger: Ledger,
}

impl<S: Store> Session<S> {
    /// Subscribe for `user` and sync the initial snapshots.
    pub fn open(mut store: S, user: impl Into<String>) -> Result<Self> {
        let user = user.into();
        store.subscribe(&user)?;
        let mut session = Session {
            store,
            user,
            ledger: Ledger::new(),
        };
        session.sync();
        Ok(session)
    }

    /// Tear down the subscription and hand the store back.
    pub fn close(mut self) -> S {
        self.store.unsubscribe();
        self.ledger.clear();
        self.store
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn sync(&mut self) {
        for event in self.store.poll_events() {
            self.ledger.apply(event);
        }
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        self.store.commit(&self.user, batch)?;
        self.sync();
        Ok(())
    }

    // ---- accounts -------------------------------------------------------

    pub fn add_account(&mut self, new: NewAccount) -> Result<()> {
        if new.name.trim().is_empty() {
            return Err(LedgerError::InvalidInput("Account name is empty".into()));
        }
        if new.currency.trim().is_empty() {
            return Err(LedgerError::InvalidInput("Account currency is empty".into()));
        }
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::InsertAccount(new));
        self.commit(batch)
    }

    pub fn update_account(&mut self, id: i64, fields: Vec<AccountField>) -> Result<()> {
        if self.ledger.account(id).is_none() {
            return Err(LedgerError::NotFound {
                entity: "account",
                id,
            });
        }
        if fields.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::UpdateAccount { id, fields });
        self.commit(batch)
    }

    /// Deleting an account does not cascade; its transactions keep a
    /// dangling reference. Unknown ids are a no-op.
    pub fn delete_account(&mut self, id: i64) -> Result<()> {
        if self.ledger.account(id).is_none() {
            return Ok(());
        }
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::DeleteAccount { id });
        self.commit(batch)
    }

    // ---- transactions ---------------------------------------------------

    /// Record a transaction and adjust the owning account's balance as
    /// one atomic commit. When the account id does not resolve against
    /// the current snapshot the record is still written and no balance
    /// moves (dangling-reference tolerance).
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Result<()> {
        if draft.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "Transaction amount must be positive, got {}",
                draft.amount
            )));
        }
        if draft.category.trim().is_empty() {
            return Err(LedgerError::InvalidInput("Category is empty".into()));
        }

        let delta = draft.kind.signed(draft.amount);
        let account = self.ledger.account(draft.account_id).map(|a| a.id);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::InsertTransaction(draft));
        if let Some(account_id) = account {
            if !delta.is_zero() {
                batch.push(WriteOp::AdjustBalance { account_id, delta });
            }
        }
        self.commit(batch)
    }

    /// Remove a transaction and reverse its contribution, using the kind
    /// recorded on it, in one atomic commit. Unknown ids are a no-op;
    /// when the owning account is gone only the record is removed.
    pub fn delete_transaction(&mut self, id: i64) -> Result<()> {
        let Some(tx) = self.ledger.transaction(id) else {
            return Ok(());
        };
        let reversal = -tx.contribution();
        let account = self.ledger.account(tx.account_id).map(|a| a.id);

        let mut batch = WriteBatch::new();
        batch.push(WriteOp::DeleteTransaction { id });
        if let Some(account_id) = account {
            if !reversal.is_zero() {
                batch.push(WriteOp::AdjustBalance {
                    account_id,
                    delta: reversal,
                });
            }
        }
        self.commit(batch)
    }

    // ---- holdings -------------------------------------------------------

    pub fn add_stock(&mut self, new: NewHolding) -> Result<()> {
        if new.symbol.trim().is_empty() {
            return Err(LedgerError::InvalidInput("Stock symbol is empty".into()));
        }
        if new.quantity <= Decimal::ZERO {
            return Err(LedgerError::InvalidInput(format!(
                "Stock quantity must be positive, got {}",
                new.quantity
            )));
        }
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::InsertHolding(new));
        self.commit(batch)
    }

    pub fn delete_stock(&mut self, id: i64) -> Result<()> {
        if self.ledger.holding(id).is_none() {
            return Ok(());
        }
        let mut batch = WriteBatch::new();
        batch.push(WriteOp::DeleteHolding { id });
        self.commit(batch)
    }

    /// Ask the price collaborator for quotes and apply them to matching
    /// holdings in one commit. Symbols missing from the response are
    /// skipped; an empty response is a no-op. Returns the number of
    /// holdings updated.
    pub fn refresh_prices(&mut self, provider: &dyn PriceProvider) -> Result<usize> {
        if self.ledger.holdings().is_empty() {
            return Ok(0);
        }
        let updates = provider.fetch_prices(self.ledger.holdings())?;
        if updates.is_empty() {
            return Ok(0);
        }

        let mut batch = WriteBatch::new();
        for holding in self.ledger.holdings() {
            if let Some(update) = updates.iter().find(|u| u.symbol == holding.symbol) {
                batch.push(WriteOp::UpdateHolding {
                    id: holding.id,
                    fields: vec![HoldingField::CurrentPrice(update.price)],
                });
            }
        }
        let updated = batch.len();
        if updated == 0 {
            return Ok(0);
        }
        self.commit(batch)?;
        Ok(updated)
    }
}
