// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::SqliteStore;
use crate::utils::{parse_decimal, pretty_table};

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set-base", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            store.set_base_currency(&ccy)?;
            println!("Base currency set to {}", ccy);
        }
        Some(("set-rate", sub)) => {
            let ccy = sub.get_one::<String>("currency").unwrap().to_uppercase();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            store.set_fx_rate(&ccy, rate)?;
            println!("1 {} = {} {}", ccy, rate, store.base_currency()?);
        }
        Some(("list", _)) => {
            let table = store.fx_table()?;
            let mut rows = vec![vec!["(base)".to_string(), table.base().to_string()]];
            for (ccy, rate) in table.rates() {
                rows.push(vec![ccy.to_string(), rate.to_string()]);
            }
            println!("{}", pretty_table(&["Currency", "Rate"], rows));
        }
        _ => {}
    }
    Ok(())
}
