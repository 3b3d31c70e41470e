// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration for the Algorand network.
//!
//! This module provides functionality for:
//! - Restoring accounts from 25-word secret phrases
//! - Building, signing and submitting transactions through an algod node
//! - Calling ARC-4 methods of the share contract described by its ARC-32 application file

pub mod abi;
pub mod address;
pub mod app_spec;
pub mod client;
pub mod ledger;
pub mod mnemonic;
pub mod signing;
pub mod transaction;
pub mod types;

#[cfg(test)]
pub(crate) mod mock_algod;

pub use abi::AbiValue;
pub use address::Address;
pub use app_spec::AppSpec;
pub use client::{AlgodClient, LedgerError};
pub use ledger::{AlgorandLedger, Ledger, LedgerSettings};
pub use signing::Account;
pub use types::*;
