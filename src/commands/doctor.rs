// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::TxKind;
use crate::session::Session;
use crate::store::SqliteStore;
use crate::utils::pretty_table;

/// Consistency checks over the current snapshot: dangling transaction
/// references, TRANSFER rows (which carry no balance rule), and holding
/// currencies without a conversion rate.
pub fn handle(session: &Session<SqliteStore>) -> Result<()> {
    let ledger = session.ledger();
    let fx = session.store().fx_table()?;
    let mut rows = Vec::new();

    for t in ledger.dangling_transactions() {
        rows.push(vec![
            "dangling_account_ref".into(),
            format!("tx {} -> account {}", t.id, t.account_id),
        ]);
    }

    for t in ledger.transactions().iter().filter(|t| t.kind == TxKind::Transfer) {
        rows.push(vec![
            "transfer_no_balance_rule".into(),
            format!("tx {} on {}", t.id, t.date),
        ]);
    }

    for h in ledger.holdings() {
        if !fx.has_rate(&h.currency) {
            rows.push(vec![
                "missing_fx_rate".into(),
                format!("{} priced in {}", h.symbol, h.currency),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
