// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Callers authenticate with their 25-word secret phrase.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: <secret phrase>`
//! 2. Server:
//!    - Decodes the phrase to an ed25519 seed (checksum word verified)
//!    - Derives the keypair and its address
//!    - Stores the resulting [`Credential`] in request extensions
//! 3. Handlers read it with the [`Signer`] extractor and sign with it
//!
//! ## Security
//!
//! - Every ledger route requires authentication; docs are public
//! - Credentials are never cached, stored or logged
//! - Failures answer 401 with a plain-text body

pub mod credential;
pub mod error;
pub mod extractor;
pub mod middleware;

pub use credential::{resolve_credential, Credential};
pub use error::AuthError;
pub use extractor::Signer;
pub use middleware::require_credential;
