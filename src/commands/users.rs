// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::SqliteStore;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sign-in", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            store.sign_in(name)?;
            println!("Signed in as '{}'", name.trim());
        }
        Some(("sign-out", _)) => {
            store.sign_out()?;
            println!("Signed out");
        }
        Some(("whoami", _)) => match store.current_user()? {
            Some(user) => println!("{}", user),
            None => println!("(not signed in)"),
        },
        _ => {}
    }
    Ok(())
}
