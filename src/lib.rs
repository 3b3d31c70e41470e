// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Investment Gateway - authenticated HTTP facade over an Algorand ledger
//!
//! Each endpoint authenticates the caller from the secret phrase in the
//! `Authorization` header, performs one ledger operation with the caller's
//! keypair and reports the outcome.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Secret-phrase authentication
//! - `blockchain` - Algorand integration (algod client, transactions, ARC-4)
//! - `server` - Listener lifecycle

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod state;
