// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types shared by the node client and the ledger adapter.

use super::abi::AbiValue;
use super::address::Address;

/// Default funding sent to a new application account before it mints.
pub const DEFAULT_APP_FUNDING_MICROALGOS: u64 = 550_000;

/// Default flat fee for contract calls (covers inner transactions).
pub const DEFAULT_METHOD_CALL_FEE_MICROALGOS: u64 = 12_000;

/// Default number of rounds to wait for a confirmation.
pub const DEFAULT_CONFIRMATION_ROUNDS: u64 = 4;

/// Algod node connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Base URL, e.g. `http://localhost`
    pub server: String,
    /// Optional port appended to the server URL
    pub port: Option<u16>,
    /// Value of the `X-Algo-API-Token` header
    pub token: String,
}

/// Network parameters needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    pub fee_per_byte: u64,
    pub min_fee: u64,
    pub last_round: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

/// State of a submitted transaction as reported by the node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Round the transaction was confirmed in, if any
    pub confirmed_round: Option<u64>,
    /// Non-empty when the pool rejected the transaction
    pub pool_error: String,
    /// Id of the application created by this transaction
    pub application_index: Option<u64>,
    /// Id of the asset created by this transaction
    pub asset_index: Option<u64>,
    /// Decoded log lines
    pub logs: Vec<Vec<u8>>,
}

impl PendingTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.is_some_and(|round| round > 0)
    }
}

/// Result of deploying the share contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedApplication {
    pub app_id: u64,
    pub app_address: Address,
    pub tx_id: String,
}

/// An ABI method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Full method signature, e.g. `transferToken(address)void`
    pub signature: String,
    pub args: Vec<AbiValue>,
    /// Flat fee in microalgos; the suggested fee is used when absent
    pub fee: Option<u64>,
}

impl MethodCall {
    pub fn new(signature: impl Into<String>, args: Vec<AbiValue>) -> Self {
        Self {
            signature: signature.into(),
            args,
            fee: None,
        }
    }

    pub fn with_fee(mut self, fee: u64) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// Outcome of a confirmed method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCallResult {
    pub tx_id: String,
    pub confirmed_round: u64,
    pub return_value: Option<AbiValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transaction_confirmation() {
        let mut pending = PendingTransaction::default();
        assert!(!pending.is_confirmed());

        pending.confirmed_round = Some(0);
        assert!(!pending.is_confirmed());

        pending.confirmed_round = Some(12);
        assert!(pending.is_confirmed());
    }

    #[test]
    fn method_call_builder_sets_fee() {
        let call = MethodCall::new("transferToken(address)void", vec![]).with_fee(12_000);
        assert_eq!(call.fee, Some(12_000));
        assert_eq!(call.signature, "transferToken(address)void");
    }
}
