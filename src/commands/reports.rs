// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::json;

use crate::models::TxKind;
use crate::session::Session;
use crate::store::SqliteStore;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};

pub fn handle(session: &Session<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(session, sub)?,
        Some(("trend", sub)) => trend(session, sub)?,
        Some(("categories", sub)) => categories(session, sub)?,
        Some(("net-worth", sub)) => net_worth(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn summary(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => chrono::Utc::now().date_naive().format("%Y-%m").to_string(),
    };
    let ledger = session.ledger();
    let flow = ledger.monthly_totals(&month);

    if maybe_print_json(json_flag, jsonl_flag, &flow)? {
        return Ok(());
    }
    println!("Month {}: income {} expense {}", flow.month, flow.income, flow.expense);
    let rows = ledger
        .recent(5)
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.kind.to_string(),
                t.amount.to_string(),
                t.category.clone(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Date", "Type", "Amount", "Category"], rows));
    Ok(())
}

fn trend(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let flows = session.ledger().trend_by_month();
    if !maybe_print_json(json_flag, jsonl_flag, &flows)? {
        let rows = flows
            .iter()
            .map(|f| {
                vec![
                    f.month.clone(),
                    format!("{:.2}", f.income),
                    format!("{:.2}", f.expense),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense"], rows));
    }
    Ok(())
}

fn categories(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind: TxKind = sub.get_one::<String>("type").unwrap().parse()?;
    let totals = session.ledger().category_totals(kind);
    if !maybe_print_json(json_flag, jsonl_flag, &totals)? {
        let rows = totals
            .into_iter()
            .map(|(name, amount)| vec![name, format!("{:.2}", amount)])
            .collect();
        println!("{}", pretty_table(&["Category", kind.as_str()], rows));
    }
    Ok(())
}

fn net_worth(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let fx = session.store().fx_table()?;
    let ledger = session.ledger();
    let total = ledger.total_assets(&fx);

    if maybe_print_json(
        json_flag,
        jsonl_flag,
        &json!({ "base": fx.base(), "total_assets": total }),
    )? {
        return Ok(());
    }

    let mut rows = Vec::new();
    for a in ledger.accounts() {
        rows.push(vec![
            format!("{} ({})", a.name, a.kind),
            fmt_money(&a.balance, &a.currency),
        ]);
    }
    for h in ledger.holdings() {
        rows.push(vec![
            format!("{} x {:.4}", h.symbol, h.quantity),
            fmt_money(&fx.to_base(h.market_value(), &h.currency), fx.base()),
        ]);
    }
    rows.push(vec![
        format!("Total (est. {})", fx.base()),
        format!("{:.2}", total),
    ]);
    println!("{}", pretty_table(&["Asset", "Value"], rows));
    Ok(())
}
