// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use crate::ledger::Ledger;
use crate::models::{TransactionDraft, TxKind};
use crate::session::Session;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table};

pub fn handle(session: &mut Session<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            session.delete_transaction(id)?;
            println!("Deleted transaction {} (balance contribution reversed)", id);
        }
        Some(("list", sub)) => list(session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(session: &mut Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let account_id = *sub.get_one::<i64>("account").unwrap();
    let kind: TxKind = sub.get_one::<String>("type").unwrap().parse()?;
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let note = sub.get_one::<String>("note").map(|s| s.to_string());

    let dangling = session.ledger().account(account_id).is_none();
    session.add_transaction(TransactionDraft {
        account_id,
        kind,
        amount,
        category: category.clone(),
        date,
        note,
    })?;
    println!(
        "Recorded {} {} '{}' on {} (account {})",
        kind, amount, category, date, account_id
    );
    if dangling {
        println!("Note: account {} is unknown; no balance was adjusted", account_id);
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub account: String,
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub note: String,
}

/// Rows for `tx list`, filtered by the CLI matches. Pure over the
/// ledger snapshot.
pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let month = match sub.get_one::<String>("month") {
        Some(m) => Some(parse_month(m)?),
        None => None,
    };
    let account = sub.get_one::<i64>("account").copied();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);

    let rows = ledger
        .transactions()
        .iter()
        .filter(|t| match &month {
            Some(m) => t.date.format("%Y-%m").to_string() == *m,
            None => true,
        })
        .filter(|t| match account {
            Some(id) => t.account_id == id,
            None => true,
        })
        .take(limit)
        .map(|t| TransactionRow {
            id: t.id,
            date: t.date.to_string(),
            account: ledger
                .account(t.account_id)
                .map(|a| a.name.clone())
                .unwrap_or_else(|| format!("(missing #{})", t.account_id)),
            kind: t.kind.to_string(),
            amount: t.amount.to_string(),
            category: t.category.clone(),
            note: t.note.clone().unwrap_or_default(),
        })
        .collect();
    Ok(rows)
}

fn list(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(session.ledger(), sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.account.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Account", "Type", "Amount", "Category", "Note"],
                rows,
            )
        );
    }
    Ok(())
}
