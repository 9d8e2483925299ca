// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::advisor::{GeminiAdvisor, build_summary};
use crate::errors::LedgerError;
use crate::session::Session;
use crate::store::SqliteStore;

pub fn set_key(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    let key = m.get_one::<String>("key").unwrap();
    store.set_api_key(key.trim())?;
    println!("API key stored");
    Ok(())
}

pub fn advice(session: &Session<SqliteStore>) -> Result<()> {
    let key = session.store().api_key()?.ok_or_else(|| {
        LedgerError::ConfigurationInvalid(
            "Gemini API key is not set (run `tally advisor set-key <KEY>`)".into(),
        )
    })?;
    let advisor = GeminiAdvisor::new(key)?;
    let summary = build_summary(session.ledger());
    println!("{}", advisor.financial_advice(&summary));
    Ok(())
}
