// Copyright (c) 2025 Tally Contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the ledger and its collaborators.
///
/// Validation failures are reported before any write is attempted.
/// A rejected commit leaves the in-memory snapshot untouched; the prior
/// state stays authoritative until the store delivers a new one.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller-supplied data failed validation; nothing was written.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An update referenced an entity that does not exist.
    /// Deletes of unknown ids are no-ops and never raise this.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The store refused to commit a write batch. No partial effects.
    #[error("Write rejected by store: {0}")]
    WriteRejected(String),

    /// Connection or identity settings are missing or malformed.
    #[error("Configuration invalid: {0}")]
    ConfigurationInvalid(String),

    /// The advisor/price endpoint could not be reached or answered badly.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<rusqlite::Error> for LedgerError {
    fn from(e: rusqlite::Error) -> Self {
        LedgerError::WriteRejected(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
