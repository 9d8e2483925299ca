// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use tally::advisor::PriceProvider;
use tally::errors::{LedgerError, Result};
use tally::models::{NewHolding, StockHolding, StockPriceUpdate};
use tally::session::Session;
use tally::store::SqliteStore;

fn open_session() -> Session<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    Session::open(store, "amy").unwrap()
}

fn holding(symbol: &str, quantity: i64, price: i64) -> NewHolding {
    NewHolding {
        symbol: symbol.into(),
        name: format!("{} Inc.", symbol),
        quantity: Decimal::from(quantity),
        avg_cost: Decimal::from(price),
        current_price: Decimal::from(price),
        currency: "USD".into(),
        sector: None,
    }
}

struct FixedPrices(Vec<StockPriceUpdate>);

impl PriceProvider for FixedPrices {
    fn fetch_prices(&self, _holdings: &[StockHolding]) -> Result<Vec<StockPriceUpdate>> {
        Ok(self.0.clone())
    }
}

struct Offline;

impl PriceProvider for Offline {
    fn fetch_prices(&self, _holdings: &[StockHolding]) -> Result<Vec<StockPriceUpdate>> {
        Err(LedgerError::ServiceUnavailable("timed out".into()))
    }
}

#[test]
fn refresh_updates_only_matching_symbols() {
    let mut session = open_session();
    session.add_stock(holding("AAPL", 10, 150)).unwrap();
    session.add_stock(holding("GOOG", 5, 120)).unwrap();

    let updated = session
        .refresh_prices(&FixedPrices(vec![
            StockPriceUpdate {
                symbol: "AAPL".into(),
                price: Decimal::new(1755, 1),
            },
            StockPriceUpdate {
                symbol: "TSLA".into(),
                price: Decimal::from(200),
            },
        ]))
        .unwrap();

    assert_eq!(updated, 1);
    let holdings = session.ledger().holdings();
    let aapl = holdings.iter().find(|h| h.symbol == "AAPL").unwrap();
    let goog = holdings.iter().find(|h| h.symbol == "GOOG").unwrap();
    assert_eq!(aapl.current_price, Decimal::new(1755, 1));
    assert_eq!(goog.current_price, Decimal::from(120));
    // Only the quoted price moves; cost basis stays.
    assert_eq!(aapl.avg_cost, Decimal::from(150));
}

#[test]
fn empty_update_list_is_a_no_op() {
    let mut session = open_session();
    session.add_stock(holding("AAPL", 10, 150)).unwrap();

    let updated = session.refresh_prices(&FixedPrices(Vec::new())).unwrap();
    assert_eq!(updated, 0);
    assert_eq!(
        session.ledger().holdings()[0].current_price,
        Decimal::from(150)
    );
}

#[test]
fn refresh_without_holdings_never_calls_the_provider() {
    struct Panicking;
    impl PriceProvider for Panicking {
        fn fetch_prices(&self, _holdings: &[StockHolding]) -> Result<Vec<StockPriceUpdate>> {
            panic!("provider must not be consulted with no holdings");
        }
    }

    let mut session = open_session();
    assert_eq!(session.refresh_prices(&Panicking).unwrap(), 0);
}

#[test]
fn provider_failure_surfaces_and_changes_nothing() {
    let mut session = open_session();
    session.add_stock(holding("AAPL", 10, 150)).unwrap();

    let err = session.refresh_prices(&Offline).unwrap_err();
    assert!(matches!(err, LedgerError::ServiceUnavailable(_)));
    assert_eq!(
        session.ledger().holdings()[0].current_price,
        Decimal::from(150)
    );
}

#[test]
fn add_stock_validates_symbol_and_quantity() {
    let mut session = open_session();

    let err = session.add_stock(holding("", 10, 150)).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    let err = session.add_stock(holding("AAPL", 0, 150)).unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput(_)));

    assert!(session.ledger().holdings().is_empty());
}

#[test]
fn delete_stock_removes_the_holding() {
    let mut session = open_session();
    session.add_stock(holding("AAPL", 10, 150)).unwrap();
    let id = session.ledger().holdings()[0].id;
    session.delete_stock(id).unwrap();
    assert!(session.ledger().holdings().is_empty());
}
