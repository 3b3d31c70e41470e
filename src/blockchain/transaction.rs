// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction building, canonical encoding and signing.
//!
//! Transactions are encoded as msgpack maps with lexicographically sorted keys
//! and every zero or empty field omitted. The signature and the transaction id
//! are both computed over `"TX" || encoding`.

use std::collections::BTreeMap;

use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signer, SigningKey};
use rmpv::Value;
use sha2::{Digest, Sha512_256};

use super::address::Address;
use super::types::SuggestedParams;

/// Domain separator for transaction signing and ids.
const TX_PREFIX: &[u8] = b"TX";

/// Rounds a transaction stays valid after its first valid round.
pub const VALIDITY_WINDOW: u64 = 1000;

/// Program page size used to derive extra pages for application creation.
const PROGRAM_PAGE_SIZE: usize = 2048;
const MAX_EXTRA_PAGES: u32 = 3;

/// What an application call does to the caller's relationship with the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnComplete {
    #[default]
    NoOp = 0,
    OptIn = 1,
    CloseOut = 2,
    ClearState = 3,
    UpdateApplication = 4,
    DeleteApplication = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSchema {
    pub num_uints: u64,
    pub num_byte_slices: u64,
}

/// A box the call may touch. `app_index` 0 means the called application,
/// otherwise it is a 1-based index into the foreign apps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxReference {
    pub app_index: u64,
    pub name: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationCall {
    pub app_id: u64,
    pub on_complete: OnComplete,
    pub args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub boxes: Vec<BoxReference>,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    pub extra_pages: u32,
}

impl ApplicationCall {
    /// Extra program pages needed for the given compiled programs.
    pub fn extra_pages_for(approval: &[u8], clear: &[u8]) -> u32 {
        let pages = (approval.len() + clear.len()).div_ceil(PROGRAM_PAGE_SIZE);
        (pages.saturating_sub(1) as u32).min(MAX_EXTRA_PAGES)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Payment {
        receiver: Address,
        amount: u64,
    },
    AssetTransfer {
        asset_id: u64,
        receiver: Address,
        amount: u64,
    },
    ApplicationCall(ApplicationCall),
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub note: Vec<u8>,
    pub kind: TransactionKind,
}

impl Transaction {
    fn new(sender: Address, params: &SuggestedParams, kind: TransactionKind) -> Self {
        Self {
            sender,
            fee: 0,
            first_valid: params.last_round,
            last_valid: params.last_round + VALIDITY_WINDOW,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash,
            note: Vec::new(),
            kind,
        }
    }

    pub fn payment(
        sender: Address,
        receiver: Address,
        amount: u64,
        params: &SuggestedParams,
    ) -> Self {
        Self::new(sender, params, TransactionKind::Payment { receiver, amount })
    }

    /// A zero-amount transfer of the asset to oneself.
    pub fn asset_opt_in(account: Address, asset_id: u64, params: &SuggestedParams) -> Self {
        Self::new(
            account,
            params,
            TransactionKind::AssetTransfer {
                asset_id,
                receiver: account,
                amount: 0,
            },
        )
    }

    pub fn application_call(
        sender: Address,
        call: ApplicationCall,
        params: &SuggestedParams,
    ) -> Self {
        Self::new(sender, params, TransactionKind::ApplicationCall(call))
    }

    /// Set the fee: the flat fee when given, otherwise the per-byte fee for
    /// the signed size, never below the network minimum.
    pub fn with_fee(mut self, params: &SuggestedParams, flat_fee: Option<u64>) -> Self {
        self.fee = match flat_fee {
            Some(fee) => fee,
            None => {
                let size = self.estimate_signed_size() as u64;
                params.fee_per_byte.saturating_mul(size).max(params.min_fee)
            }
        };
        self
    }

    fn estimate_signed_size(&self) -> usize {
        SignedTransaction {
            transaction: self.clone(),
            signature: Some([0u8; 64]),
        }
        .to_msgpack()
        .len()
    }

    pub fn type_tag(&self) -> &'static str {
        match self.kind {
            TransactionKind::Payment { .. } => "pay",
            TransactionKind::AssetTransfer { .. } => "axfer",
            TransactionKind::ApplicationCall(_) => "appl",
        }
    }

    pub fn to_msgpack(&self) -> Vec<u8> {
        encode_value(&self.to_value())
    }

    fn bytes_to_sign(&self) -> Vec<u8> {
        let mut bytes = TX_PREFIX.to_vec();
        bytes.extend(self.to_msgpack());
        bytes
    }

    /// The 52-character transaction id.
    pub fn id(&self) -> String {
        BASE32_NOPAD.encode(&Sha512_256::digest(self.bytes_to_sign()))
    }

    pub fn sign(self, key: &SigningKey) -> SignedTransaction {
        let signature = key.sign(&self.bytes_to_sign()).to_bytes();
        SignedTransaction {
            transaction: self,
            signature: Some(signature),
        }
    }

    /// Wrap without a signature, for simulation.
    pub fn unsigned(self) -> SignedTransaction {
        SignedTransaction {
            transaction: self,
            signature: None,
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = CanonicalMap::default();
        map.uint("fee", self.fee);
        map.uint("fv", self.first_valid);
        map.uint("lv", self.last_valid);
        map.string("gen", &self.genesis_id);
        map.bytes("gh", &self.genesis_hash);
        map.bytes("note", &self.note);
        map.address("snd", &self.sender);
        map.string("type", self.type_tag());

        match &self.kind {
            TransactionKind::Payment { receiver, amount } => {
                map.address("rcv", receiver);
                map.uint("amt", *amount);
            }
            TransactionKind::AssetTransfer {
                asset_id,
                receiver,
                amount,
            } => {
                map.uint("xaid", *asset_id);
                map.address("arcv", receiver);
                map.uint("aamt", *amount);
            }
            TransactionKind::ApplicationCall(call) => {
                map.uint("apid", call.app_id);
                map.uint("apan", call.on_complete as u64);
                map.array(
                    "apaa",
                    call.args.iter().map(|a| Value::Binary(a.clone())).collect(),
                );
                map.array(
                    "apat",
                    call.accounts
                        .iter()
                        .map(|a| Value::Binary(a.as_bytes().to_vec()))
                        .collect(),
                );
                map.array("apfa", call.foreign_apps.iter().map(|&id| Value::from(id)).collect());
                map.array("apas", call.foreign_assets.iter().map(|&id| Value::from(id)).collect());
                map.array(
                    "apbx",
                    call.boxes
                        .iter()
                        .map(|b| {
                            let mut entry = CanonicalMap::default();
                            entry.uint("i", b.app_index);
                            entry.bytes("n", &b.name);
                            entry.into_value()
                        })
                        .collect(),
                );
                map.bytes("apap", &call.approval_program);
                map.bytes("apsu", &call.clear_program);
                map.map("apgs", schema_map(&call.global_schema));
                map.map("apls", schema_map(&call.local_schema));
                map.uint("apep", u64::from(call.extra_pages));
            }
        }

        map.into_value()
    }
}

fn schema_map(schema: &StateSchema) -> CanonicalMap {
    let mut map = CanonicalMap::default();
    map.uint("nbs", schema.num_byte_slices);
    map.uint("nui", schema.num_uints);
    map
}

/// A transaction with its (optional) ed25519 signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Option<[u8; 64]>,
}

impl SignedTransaction {
    pub fn id(&self) -> String {
        self.transaction.id()
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = CanonicalMap::default();
        if let Some(signature) = &self.signature {
            map.bytes("sig", signature);
        }
        map.entries.insert("txn", self.transaction.to_value());
        map.into_value()
    }

    pub fn to_msgpack(&self) -> Vec<u8> {
        encode_value(&self.to_value())
    }
}

/// Msgpack map builder that keeps keys sorted and drops empty values.
#[derive(Default)]
pub(crate) struct CanonicalMap {
    entries: BTreeMap<&'static str, Value>,
}

impl CanonicalMap {
    pub(crate) fn uint(&mut self, key: &'static str, value: u64) {
        if value != 0 {
            self.entries.insert(key, Value::from(value));
        }
    }

    pub(crate) fn bool(&mut self, key: &'static str, value: bool) {
        if value {
            self.entries.insert(key, Value::Boolean(true));
        }
    }

    pub(crate) fn bytes(&mut self, key: &'static str, value: &[u8]) {
        if !value.is_empty() {
            self.entries.insert(key, Value::Binary(value.to_vec()));
        }
    }

    fn string(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() {
            self.entries.insert(key, Value::from(value));
        }
    }

    fn address(&mut self, key: &'static str, value: &Address) {
        if *value != Address::ZERO {
            self.entries
                .insert(key, Value::Binary(value.as_bytes().to_vec()));
        }
    }

    pub(crate) fn array(&mut self, key: &'static str, values: Vec<Value>) {
        if !values.is_empty() {
            self.entries.insert(key, Value::Array(values));
        }
    }

    pub(crate) fn map(&mut self, key: &'static str, value: CanonicalMap) {
        if !value.entries.is_empty() {
            self.entries.insert(key, value.into_value());
        }
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Map(
            self.entries
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }
}

pub(crate) fn encode_value(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = rmpv::encode::write_value(&mut buf, value);
    buf
}
