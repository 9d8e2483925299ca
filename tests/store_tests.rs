// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally::errors::LedgerError;
use tally::models::{AccountKind, NewAccount, TransactionDraft, TxKind};
use tally::store::{SqliteStore, Store, StoreEvent, WriteBatch, WriteOp};

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().unwrap()
}

fn insert_account(name: &str, balance: i64) -> WriteOp {
    WriteOp::InsertAccount(NewAccount {
        name: name.into(),
        kind: AccountKind::Checking,
        balance: Decimal::from(balance),
        currency: "TWD".into(),
        color: String::new(),
    })
}

fn insert_tx(account_id: i64, kind: TxKind, amount: i64) -> WriteOp {
    WriteOp::InsertTransaction(TransactionDraft {
        account_id,
        kind,
        amount: Decimal::from(amount),
        category: "misc".into(),
        date: NaiveDate::from_ymd_opt(2023, 10, 7).unwrap(),
        note: None,
    })
}

fn batch(ops: Vec<WriteOp>) -> WriteBatch {
    let mut b = WriteBatch::new();
    for op in ops {
        b.push(op);
    }
    b
}

#[test]
fn subscribe_queues_full_snapshots_of_all_collections() {
    let mut store = store();
    store.subscribe("amy").unwrap();
    let events = store.poll_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], StoreEvent::Accounts(_)));
    assert!(matches!(events[1], StoreEvent::Transactions(_)));
    assert!(matches!(events[2], StoreEvent::Holdings(_)));
    assert!(store.poll_events().is_empty());
}

#[test]
fn commit_refreshes_only_touched_collections() {
    let mut store = store();
    store.subscribe("amy").unwrap();
    store.poll_events();

    store.commit("amy", batch(vec![insert_account("Checking", 100)])).unwrap();
    let events = store.poll_events();
    assert_eq!(events.len(), 1);
    let StoreEvent::Accounts(accounts) = &events[0] else {
        panic!("expected an accounts snapshot");
    };
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Checking");
}

#[test]
fn tx_with_balance_adjustment_emits_both_snapshots() {
    let mut store = store();
    store.commit("amy", batch(vec![insert_account("Checking", 1_000)])).unwrap();
    let id = store.load_accounts("amy").unwrap()[0].id;

    store.subscribe("amy").unwrap();
    store.poll_events();

    store
        .commit(
            "amy",
            batch(vec![
                insert_tx(id, TxKind::Expense, 350),
                WriteOp::AdjustBalance {
                    account_id: id,
                    delta: Decimal::from(-350),
                },
            ]),
        )
        .unwrap();

    let events = store.poll_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], StoreEvent::Accounts(_)));
    assert!(matches!(events[1], StoreEvent::Transactions(_)));
    assert_eq!(
        store.load_accounts("amy").unwrap()[0].balance,
        Decimal::from(650)
    );
}

#[test]
fn failed_op_rolls_back_the_whole_batch() {
    let mut store = store();
    let err = store
        .commit(
            "amy",
            batch(vec![
                insert_tx(1, TxKind::Expense, 350),
                WriteOp::AdjustBalance {
                    account_id: 999,
                    delta: Decimal::from(-350),
                },
            ]),
        )
        .unwrap_err();

    assert!(matches!(err, LedgerError::WriteRejected(_)));
    // The insert that preceded the failing op must not survive.
    assert!(store.load_transactions("amy").unwrap().is_empty());
}

#[test]
fn events_are_not_delivered_to_other_subscribers() {
    let mut store = store();
    store.subscribe("amy").unwrap();
    store.poll_events();

    store.commit("ben", batch(vec![insert_account("Checking", 100)])).unwrap();
    assert!(store.poll_events().is_empty());

    // Ben's write really happened; it is just not Amy's to see.
    assert_eq!(store.load_accounts("ben").unwrap().len(), 1);
    assert!(store.load_accounts("amy").unwrap().is_empty());
}

#[test]
fn unsubscribe_stops_event_delivery() {
    let mut store = store();
    store.subscribe("amy").unwrap();
    store.unsubscribe();
    store.commit("amy", batch(vec![insert_account("Checking", 100)])).unwrap();
    assert!(store.poll_events().is_empty());
}

#[test]
fn empty_batch_commits_without_events() {
    let mut store = store();
    store.subscribe("amy").unwrap();
    store.poll_events();
    store.commit("amy", WriteBatch::new()).unwrap();
    assert!(store.poll_events().is_empty());
}

#[test]
fn transactions_load_newest_first() {
    let mut store = store();
    let mut ops = Vec::new();
    for (i, day) in [1, 3, 2].iter().enumerate() {
        ops.push(WriteOp::InsertTransaction(TransactionDraft {
            account_id: 1,
            kind: TxKind::Expense,
            amount: Decimal::from(10 + i as i64),
            category: "misc".into(),
            date: NaiveDate::from_ymd_opt(2023, 10, *day).unwrap(),
            note: None,
        }));
    }
    store.commit("amy", batch(ops)).unwrap();

    let dates: Vec<String> = store
        .load_transactions("amy")
        .unwrap()
        .iter()
        .map(|t| t.date.to_string())
        .collect();
    assert_eq!(dates, vec!["2023-10-03", "2023-10-02", "2023-10-01"]);
}

#[test]
fn settings_round_trip_and_sign_out() {
    let store = store();
    assert!(store.current_user().unwrap().is_none());
    store.sign_in("amy").unwrap();
    assert_eq!(store.current_user().unwrap().as_deref(), Some("amy"));
    store.sign_out().unwrap();
    assert!(store.current_user().unwrap().is_none());

    let err = store.sign_in("  ").unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));
}

#[test]
fn fx_table_reflects_configured_settings() {
    let store = store();
    let table = store.fx_table().unwrap();
    assert_eq!(table.base(), "TWD");
    assert_eq!(table.rate("USD"), Decimal::from(32));

    store.set_base_currency("usd").unwrap();
    store.set_fx_rate("TWD", Decimal::new(3125, 5)).unwrap();
    let table = store.fx_table().unwrap();
    assert_eq!(table.base(), "USD");
    assert_eq!(table.rate("TWD"), Decimal::new(3125, 5));
}
