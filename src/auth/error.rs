// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::blockchain::mnemonic::MnemonicError;

/// Authentication error type.
///
/// Every variant answers 401 with a plain-text body. The body never echoes
/// the submitted header.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Header is not valid visible ASCII
    InvalidAuthHeader,
    /// Header does not decode to a keypair
    InvalidSecretPhrase(MnemonicError),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidSecretPhrase(_) => "invalid_secret_phrase",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => write!(f, "Invalid authorization header"),
            AuthError::InvalidSecretPhrase(_) => {
                write!(f, "Authorization header is not a valid secret phrase")
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::InvalidSecretPhrase(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MnemonicError> for AuthError {
    fn from(error: MnemonicError) -> Self {
        AuthError::InvalidSecretPhrase(error)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(error_code = self.error_code(), error = %self, "Request rejected");
        (
            self.status_code(),
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
