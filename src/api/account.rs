// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account funding and token opt-in endpoints.

use axum::{extract::State, Json};

use crate::{
    api::extract::ValidJson,
    auth::Signer,
    error::ApiError,
    models::{FundRequest, OperationResponse, OptInRequest},
    state::AppState,
};

/// Opt the caller in to a token so it can receive it.
#[utoipa::path(
    post,
    path = "/optin-token",
    tag = "Account",
    security(("secret_phrase" = [])),
    request_body = OptInRequest,
    responses(
        (status = 200, description = "Opt-in completed", body = OperationResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Opt-in failed")
    )
)]
pub async fn optin_token(
    State(state): State<AppState>,
    Signer(credential): Signer,
    ValidJson(request): ValidJson<OptInRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let asset_id = request.asset_id;
    let tx_id = state
        .ledger
        .asset_opt_in(credential.account(), asset_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, asset_id, account = %credential.address(), "Opt-in failed");
            ApiError::opt_in_failed()
        })?;

    tracing::info!(asset_id, account = %credential.address(), tx_id = %tx_id, "Opt-in completed");
    Ok(Json(OperationResponse::new("opt-in completed", tx_id)))
}

/// Pay microalgos from the caller to an account and wait for confirmation.
#[utoipa::path(
    post,
    path = "/fund",
    tag = "Account",
    security(("secret_phrase" = [])),
    request_body = FundRequest,
    responses(
        (status = 200, description = "Funds transferred", body = OperationResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Transfer failed")
    )
)]
pub async fn fund(
    State(state): State<AppState>,
    Signer(credential): Signer,
    ValidJson(request): ValidJson<FundRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let fail = |e: &dyn std::fmt::Display| {
        tracing::error!(error = %e, receiver = %request.address, "Funding failed");
        ApiError::transfer_failed()
    };

    let tx_id = state
        .ledger
        .send_payment(credential.account(), &request.address, request.amount)
        .await
        .map_err(|e| fail(&e))?;

    state
        .ledger
        .wait_for_confirmation(&tx_id, state.settings.confirmation_rounds)
        .await
        .map_err(|e| fail(&e))?;

    tracing::info!(receiver = %request.address, amount = request.amount, tx_id = %tx_id, "Funds transferred");
    Ok(Json(OperationResponse::new("funds transferred", tx_id)))
}
