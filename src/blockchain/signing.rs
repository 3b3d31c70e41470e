// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account keys and transaction signing.
//!
//! An [`Account`] is an ed25519 keypair restored from a 25-word secret
//! phrase. The private half never leaves this type: callers hand it a
//! [`Transaction`] and get a [`SignedTransaction`] back.

use std::fmt;

use ed25519_dalek::SigningKey;

use super::address::Address;
use super::mnemonic::{mnemonic_to_seed, seed_to_mnemonic, MnemonicError, SEED_LEN};
use super::transaction::{SignedTransaction, Transaction};

/// An ed25519 keypair and the address derived from it.
#[derive(Clone)]
pub struct Account {
    address: Address,
    signing_key: SigningKey,
}

impl Account {
    pub fn from_seed(seed: &[u8; SEED_LEN]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = Address::from_public_key(signing_key.verifying_key().to_bytes());
        Self {
            address,
            signing_key,
        }
    }

    /// Restore an account from its secret phrase.
    pub fn from_mnemonic(phrase: &str) -> Result<Self, MnemonicError> {
        let seed = mnemonic_to_seed(phrase)?;
        Ok(Self::from_seed(&seed))
    }

    /// The secret phrase for this account.
    pub fn mnemonic(&self) -> String {
        seed_to_mnemonic(&self.signing_key.to_bytes())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign(&self, transaction: Transaction) -> SignedTransaction {
        transaction.sign(&self.signing_key)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
