// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::advisor::GeminiAdvisor;
use crate::errors::LedgerError;
use crate::models::NewHolding;
use crate::session::Session;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(session: &mut Session<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            session.delete_stock(id)?;
            println!("Removed holding {}", id);
        }
        Some(("list", sub)) => list(session, sub)?,
        Some(("refresh", _)) => refresh(session)?,
        _ => {}
    }
    Ok(())
}

fn add(session: &mut Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let symbol = sub.get_one::<String>("symbol").unwrap().trim().to_string();
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let quantity = parse_decimal(sub.get_one::<String>("quantity").unwrap())?;
    let avg_cost = parse_decimal(sub.get_one::<String>("avg-cost").unwrap())?;
    let current_price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    let currency = sub.get_one::<String>("currency").unwrap().to_uppercase();
    let sector = sub.get_one::<String>("sector").map(|s| s.to_string());

    session.add_stock(NewHolding {
        symbol: symbol.clone(),
        name,
        quantity,
        avg_cost,
        current_price,
        currency,
        sector,
    })?;
    println!("Added holding {} x {}", symbol, quantity);
    Ok(())
}

fn refresh(session: &mut Session<SqliteStore>) -> Result<()> {
    let key = session
        .store()
        .api_key()?
        .ok_or_else(|| {
            LedgerError::ConfigurationInvalid(
                "Gemini API key is not set (run `tally advisor set-key <KEY>`)".into(),
            )
        })?;
    let advisor = GeminiAdvisor::new(key)?;
    match session.refresh_prices(&advisor) {
        Ok(0) => println!("No prices updated"),
        Ok(n) => println!("Updated {} holding prices", n),
        Err(LedgerError::ServiceUnavailable(e)) => {
            println!("Price service unavailable, no prices updated ({})", e);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn list(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let holdings = session.ledger().holdings();
    if !maybe_print_json(json_flag, jsonl_flag, &holdings)? {
        let rows = holdings
            .iter()
            .map(|h| {
                vec![
                    h.id.to_string(),
                    h.symbol.clone(),
                    h.name.clone(),
                    format!("{:.4}", h.quantity),
                    format!("{:.2}", h.avg_cost),
                    format!("{:.2}", h.current_price),
                    format!("{:.2}", h.market_value()),
                    h.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Symbol", "Name", "Qty", "Avg Cost", "Price", "Value", "CCY"],
                rows,
            )
        );
    }
    Ok(())
}
