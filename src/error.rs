// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error answered to API callers.
///
/// Ledger failures carry a generic message only; the underlying error is
/// logged where it happens.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn contract_deploy_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "contract_deploy_failed",
            "Failed to deploy the contract",
        )
    }

    pub fn contract_call_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "contract_call_failed",
            "Failed to call the contract",
        )
    }

    pub fn opt_in_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "opt_in_failed",
            "Failed to opt in to the token",
        )
    }

    pub fn transfer_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "transfer_failed",
            "Failed to transfer funds",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}
