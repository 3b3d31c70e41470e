// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request credential derived from the `Authorization` header.

use crate::blockchain::{Account, Address};

use super::AuthError;

/// The caller's keypair for the duration of one request.
///
/// Built fresh from the header on every request and dropped with it.
/// The signing key is zeroized on drop and never printed.
#[derive(Debug, Clone)]
pub struct Credential {
    account: Account,
}

impl Credential {
    pub fn address(&self) -> Address {
        self.account.address()
    }

    /// Account used to sign the caller's transactions.
    pub fn account(&self) -> &Account {
        &self.account
    }
}

/// Resolve a raw header value (a 25-word secret phrase) into a credential.
pub fn resolve_credential(raw: &str) -> Result<Credential, AuthError> {
    let account = Account::from_mnemonic(raw.trim())?;
    Ok(Credential { account })
}
