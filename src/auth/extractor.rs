// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the caller's credential.
//!
//! ```rust,ignore
//! async fn my_handler(Signer(credential): Signer) -> impl IntoResponse {
//!     // credential.account() signs ledger transactions
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::credential_from_headers;
use super::{AuthError, Credential};

/// Extractor for the authenticated caller.
///
/// Uses the credential the middleware already resolved when present and
/// otherwise resolves the `Authorization` header itself.
pub struct Signer(pub Credential);

impl<S> FromRequestParts<S> for Signer
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(credential) = parts.extensions.get::<Credential>().cloned() {
            return Ok(Signer(credential));
        }

        credential_from_headers(&parts.headers).map(Signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::resolve_credential;
    use crate::blockchain::Account;
    use axum::http::{header::AUTHORIZATION, Request};

    #[tokio::test]
    async fn requires_auth_header() {
        let mut parts = Request::builder()
            .uri("/fund")
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let result = Signer::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn resolves_header_without_middleware() {
        let account = Account::from_seed(&[31u8; 32]);
        let mut parts = Request::builder()
            .uri("/fund")
            .header(AUTHORIZATION, account.mnemonic())
            .body(())
            .unwrap()
            .into_parts()
            .0;

        let Signer(credential) = Signer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(credential.address(), account.address());
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let account = Account::from_seed(&[32u8; 32]);
        let mut parts = Request::builder()
            .uri("/fund")
            .header(AUTHORIZATION, "ignored")
            .body(())
            .unwrap()
            .into_parts()
            .0;
        parts
            .extensions
            .insert(resolve_credential(&account.mnemonic()).unwrap());

        let Signer(credential) = Signer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(credential.address(), account.address());
    }
}
