// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `axum::middleware::from_fn` to every ledger route. Requests
//! without a resolvable credential are answered with 401 before any body is
//! read or any handler runs.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{resolve_credential, AuthError, Credential};

/// Resolve the credential and add it to request extensions.
pub async fn require_credential(mut request: Request, next: Next) -> Response {
    match credential_from_headers(request.headers()) {
        Ok(credential) => {
            tracing::debug!(address = %credential.address(), "Request authenticated");
            request.extensions_mut().insert(credential);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Read and resolve the `Authorization` header.
pub(crate) fn credential_from_headers(headers: &HeaderMap) -> Result<Credential, AuthError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    resolve_credential(raw)
}
