// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use tally::{cli, commands, db, session::Session, store::SqliteStore};

fn main() -> Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let store = SqliteStore::open_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("user", sub)) => commands::users::handle(&store, sub)?,
        Some(("fx", sub)) => commands::fx::handle(&store, sub)?,
        Some(("advisor", sub)) => match sub.subcommand() {
            Some(("set-key", key_m)) => commands::advisor::set_key(&store, key_m)?,
            Some(("advice", _)) => {
                let session = open_session(store)?;
                commands::advisor::advice(&session)?;
                session.close();
            }
            _ => {}
        },
        Some(("account", sub)) => {
            let mut session = open_session(store)?;
            commands::accounts::handle(&mut session, sub)?;
            session.close();
        }
        Some(("tx", sub)) => {
            let mut session = open_session(store)?;
            commands::transactions::handle(&mut session, sub)?;
            session.close();
        }
        Some(("stock", sub)) => {
            let mut session = open_session(store)?;
            commands::stocks::handle(&mut session, sub)?;
            session.close();
        }
        Some(("report", sub)) => {
            let session = open_session(store)?;
            commands::reports::handle(&session, sub)?;
            session.close();
        }
        Some(("export", sub)) => {
            let session = open_session(store)?;
            commands::exporter::handle(&session, sub)?;
            session.close();
        }
        Some(("doctor", _)) => {
            let session = open_session(store)?;
            commands::doctor::handle(&session)?;
            session.close();
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn open_session(store: SqliteStore) -> Result<Session<SqliteStore>> {
    let Some(user) = store.current_user()? else {
        bail!("No user signed in. Run `tally user sign-in --name <NAME>`");
    };
    Ok(Session::open(store, user)?)
}
