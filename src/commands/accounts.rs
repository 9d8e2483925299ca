// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::{AccountField, AccountKind, NewAccount};
use crate::session::Session;
use crate::store::SqliteStore;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn handle(session: &mut Session<SqliteStore>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(session, sub)?,
        Some(("list", sub)) => list(session, sub)?,
        Some(("set", sub)) => set(session, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            session.delete_account(id)?;
            println!("Removed account {} (its transactions are kept)", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(session: &mut Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let kind: AccountKind = sub.get_one::<String>("type").unwrap().parse()?;
    let currency = sub.get_one::<String>("currency").unwrap().to_uppercase();
    let balance = parse_decimal(sub.get_one::<String>("balance").unwrap())?;
    let color = sub.get_one::<String>("color").unwrap().clone();

    session.add_account(NewAccount {
        name: name.clone(),
        kind,
        balance,
        currency: currency.clone(),
        color,
    })?;
    println!("Added account '{}' ({}, {})", name, kind, currency);
    Ok(())
}

fn set(session: &mut Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let mut fields = Vec::new();
    if let Some(name) = sub.get_one::<String>("name") {
        fields.push(AccountField::Name(name.trim().to_string()));
    }
    if let Some(kind) = sub.get_one::<String>("type") {
        fields.push(AccountField::Kind(kind.parse::<AccountKind>()?));
    }
    if let Some(ccy) = sub.get_one::<String>("currency") {
        fields.push(AccountField::Currency(ccy.to_uppercase()));
    }
    if let Some(balance) = sub.get_one::<String>("balance") {
        fields.push(AccountField::Balance(parse_decimal(balance)?));
    }
    if let Some(color) = sub.get_one::<String>("color") {
        fields.push(AccountField::Color(color.clone()));
    }
    if fields.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }
    session.update_account(id, fields)?;
    println!("Updated account {}", id);
    Ok(())
}

fn list(session: &Session<SqliteStore>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let accounts = session.ledger().accounts();
    if !maybe_print_json(json_flag, jsonl_flag, &accounts)? {
        let rows = accounts
            .iter()
            .map(|a| {
                vec![
                    a.id.to_string(),
                    a.name.clone(),
                    a.kind.to_string(),
                    format!("{:.2}", a.balance),
                    a.currency.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Type", "Balance", "CCY"], rows)
        );
    }
    Ok(())
}
