// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Holder registration and share transfer endpoints.

use axum::{extract::State, Json};

use crate::{
    api::extract::ValidJson,
    auth::Signer,
    blockchain::{AbiValue, MethodCall},
    error::ApiError,
    models::{CreateHolderRequest, OperationResponse, TransferTokensRequest},
    state::AppState,
};

pub const CREATE_HOLDER_METHOD: &str = "createHolder(address,(string,string,string,string))void";
pub const TRANSFER_TOKEN_METHOD: &str = "transferToken(address)void";

/// Register a holder and their personal data with the contract.
#[utoipa::path(
    post,
    path = "/create-holder",
    tag = "Holders",
    security(("secret_phrase" = [])),
    request_body = CreateHolderRequest,
    responses(
        (status = 200, description = "Holder created", body = OperationResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Contract call failed")
    )
)]
pub async fn create_holder(
    State(state): State<AppState>,
    Signer(credential): Signer,
    ValidJson(request): ValidJson<CreateHolderRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let app_id = request.application_id;
    let data = request.data;
    let call = MethodCall::new(
        CREATE_HOLDER_METHOD,
        vec![
            AbiValue::Address(request.address),
            AbiValue::Tuple(vec![
                AbiValue::String(data.first_name),
                AbiValue::String(data.last_name),
                AbiValue::String(data.email),
                AbiValue::String(data.phone),
            ]),
        ],
    )
    .with_fee(state.settings.method_call_fee_microalgos);

    let result = state
        .ledger
        .call_method(credential.account(), app_id, call)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, app_id, "Holder creation failed");
            ApiError::contract_call_failed()
        })?;

    tracing::info!(app_id, holder = %request.address, tx_id = %result.tx_id, "Holder created");
    Ok(Json(OperationResponse::new("holder created", result.tx_id)))
}

/// Transfer the share token from the application to a holder.
#[utoipa::path(
    post,
    path = "/transfer-tokens",
    tag = "Holders",
    security(("secret_phrase" = [])),
    request_body = TransferTokensRequest,
    responses(
        (status = 200, description = "Tokens transferred", body = OperationResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Contract call failed")
    )
)]
pub async fn transfer_tokens(
    State(state): State<AppState>,
    Signer(credential): Signer,
    ValidJson(request): ValidJson<TransferTokensRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let app_id = request.application_id;
    let call = MethodCall::new(
        TRANSFER_TOKEN_METHOD,
        vec![AbiValue::Address(request.receiver)],
    )
    .with_fee(state.settings.method_call_fee_microalgos);

    let result = state
        .ledger
        .call_method(credential.account(), app_id, call)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, app_id, "Token transfer failed");
            ApiError::contract_call_failed()
        })?;

    tracing::info!(app_id, receiver = %request.receiver, tx_id = %result.tx_id, "Tokens transferred");
    Ok(Json(OperationResponse::new("tokens transferred", result.tx_id)))
}
