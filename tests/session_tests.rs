// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally::errors::LedgerError;
use tally::models::{AccountField, AccountKind, NewAccount, TransactionDraft, TxKind};
use tally::session::Session;
use tally::store::{SqliteStore, Store, StoreEvent, WriteBatch};

fn open_session(user: &str) -> Session<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    Session::open(store, user).unwrap()
}

fn account(name: &str, balance: i64) -> NewAccount {
    NewAccount {
        name: name.into(),
        kind: AccountKind::Checking,
        balance: Decimal::from(balance),
        currency: "TWD".into(),
        color: String::new(),
    }
}

fn draft(account_id: i64, kind: TxKind, amount: i64, category: &str, date: &str) -> TransactionDraft {
    TransactionDraft {
        account_id,
        kind,
        amount: Decimal::from(amount),
        category: category.into(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        note: None,
    }
}

#[test]
fn expense_adjusts_balance_and_delete_restores_it() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 100_000)).unwrap();

    let account_id = session.ledger().accounts()[0].id;
    session
        .add_transaction(draft(account_id, TxKind::Expense, 350, "food", "2023-10-07"))
        .unwrap();

    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(99_650)
    );

    let tx_id = session.ledger().transactions()[0].id;
    session.delete_transaction(tx_id).unwrap();
    assert!(session.ledger().transactions().is_empty());
    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(100_000)
    );
}

#[test]
fn income_and_expense_net_against_the_opening_balance() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 10_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;

    session
        .add_transaction(draft(account_id, TxKind::Income, 55_000, "salary", "2023-10-05"))
        .unwrap();
    session
        .add_transaction(draft(account_id, TxKind::Expense, 12_000, "rent", "2023-10-06"))
        .unwrap();

    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(53_000)
    );
}

#[test]
fn transfer_is_recorded_but_moves_no_balance() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 5_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;

    session
        .add_transaction(draft(account_id, TxKind::Transfer, 1_000, "move", "2023-10-07"))
        .unwrap();

    assert_eq!(session.ledger().transactions().len(), 1);
    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(5_000)
    );
}

#[test]
fn non_positive_amount_and_blank_category_are_rejected() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 5_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;

    let err = session
        .add_transaction(draft(account_id, TxKind::Expense, 0, "food", "2023-10-07"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    let err = session
        .add_transaction(draft(account_id, TxKind::Expense, 10, "  ", "2023-10-07"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    assert!(session.ledger().transactions().is_empty());
    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(5_000)
    );
}

#[test]
fn unknown_account_id_records_the_transaction_without_balance_change() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 5_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;

    session
        .add_transaction(draft(999, TxKind::Expense, 350, "food", "2023-10-07"))
        .unwrap();

    assert_eq!(session.ledger().transactions().len(), 1);
    assert_eq!(session.ledger().dangling_transactions().len(), 1);
    assert_eq!(
        session.ledger().account(account_id).unwrap().balance,
        Decimal::from(5_000)
    );
}

#[test]
fn deleting_an_account_leaves_its_transactions_dangling() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 100_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;
    session
        .add_transaction(draft(account_id, TxKind::Expense, 350, "food", "2023-10-07"))
        .unwrap();

    session.delete_account(account_id).unwrap();
    assert!(session.ledger().accounts().is_empty());
    assert_eq!(session.ledger().dangling_transactions().len(), 1);

    // Removing the dangling record deletes it without touching balances.
    let tx_id = session.ledger().transactions()[0].id;
    session.delete_transaction(tx_id).unwrap();
    assert!(session.ledger().transactions().is_empty());
}

#[test]
fn deletes_of_unknown_ids_are_no_ops() {
    let mut session = open_session("amy");
    session.delete_transaction(42).unwrap();
    session.delete_account(42).unwrap();
    session.delete_stock(42).unwrap();
}

#[test]
fn updating_a_missing_account_is_not_found() {
    let mut session = open_session("amy");
    let err = session
        .update_account(7, vec![AccountField::Name("Renamed".into())])
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "account", id: 7 }));
}

#[test]
fn update_account_applies_selected_fields() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 1_000)).unwrap();
    let account_id = session.ledger().accounts()[0].id;

    session
        .update_account(
            account_id,
            vec![
                AccountField::Name("Salary account".into()),
                AccountField::Kind(AccountKind::Savings),
            ],
        )
        .unwrap();

    let updated = session.ledger().account(account_id).unwrap();
    assert_eq!(updated.name, "Salary account");
    assert_eq!(updated.kind, AccountKind::Savings);
    assert_eq!(updated.balance, Decimal::from(1_000));
}

#[test]
fn sessions_are_scoped_per_user() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 1_000)).unwrap();
    let store = session.close();

    let session = Session::open(store, "ben").unwrap();
    assert!(session.ledger().accounts().is_empty());
}

#[test]
fn close_clears_the_snapshot() {
    let mut session = open_session("amy");
    session.add_account(account("Checking", 1_000)).unwrap();
    assert_eq!(session.ledger().accounts().len(), 1);

    let mut store = session.close();
    assert!(store.poll_events().is_empty());
}

// A store that accepts the subscription but refuses every commit.
struct RefusingStore;

impl Store for RefusingStore {
    fn subscribe(&mut self, _user: &str) -> tally::errors::Result<()> {
        Ok(())
    }

    fn unsubscribe(&mut self) {}

    fn poll_events(&mut self) -> Vec<StoreEvent> {
        Vec::new()
    }

    fn commit(&mut self, _user: &str, _batch: WriteBatch) -> tally::errors::Result<()> {
        Err(LedgerError::WriteRejected("backend offline".into()))
    }
}

#[test]
fn rejected_commit_leaves_the_snapshot_untouched() {
    let mut session = Session::open(RefusingStore, "amy").unwrap();
    let err = session.add_account(account("Checking", 1_000)).unwrap_err();
    assert!(matches!(err, LedgerError::WriteRejected(_)));
    assert!(session.ledger().accounts().is_empty());
}
