// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract deployment and share emission endpoints.

use axum::{extract::State, Json};

use crate::{
    api::extract::ValidJson,
    auth::Signer,
    blockchain::{AbiValue, MethodCall},
    error::ApiError,
    models::{DeployContractResponse, EmitSharesRequest, EmitSharesResponse},
    state::AppState,
};

/// Mints the share token and returns its asset id.
pub const EMIT_SHARES_METHOD: &str = "emmitAndGetShares(string,string,uint64)uint64";

/// Deploy a new instance of the share contract, owned by the caller.
#[utoipa::path(
    post,
    path = "/deploy-contract",
    tag = "Contract",
    security(("secret_phrase" = [])),
    responses(
        (status = 200, description = "Contract deployed", body = DeployContractResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Deployment failed")
    )
)]
pub async fn deploy_contract(
    State(state): State<AppState>,
    Signer(credential): Signer,
) -> Result<Json<DeployContractResponse>, ApiError> {
    let created = state
        .ledger
        .create_application(credential.account())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, sender = %credential.address(), "Contract deployment failed");
            ApiError::contract_deploy_failed()
        })?;

    tracing::info!(
        app_id = created.app_id,
        tx_id = %created.tx_id,
        "Contract deployed"
    );

    Ok(Json(DeployContractResponse {
        application_id: created.app_id,
        application_address: created.app_address,
        transaction_id: created.tx_id,
    }))
}

/// Fund the application account, then mint the share token.
///
/// The application pays for the asset creation out of its own balance, so
/// it is funded first.
#[utoipa::path(
    post,
    path = "/emit-shares",
    tag = "Contract",
    security(("secret_phrase" = [])),
    request_body = EmitSharesRequest,
    responses(
        (status = 200, description = "Token minted", body = EmitSharesResponse),
        (status = 400, description = "Invalid request body"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Contract call failed")
    )
)]
pub async fn emit_shares(
    State(state): State<AppState>,
    Signer(credential): Signer,
    ValidJson(request): ValidJson<EmitSharesRequest>,
) -> Result<Json<EmitSharesResponse>, ApiError> {
    let app_id = request.application_id;
    let fail = |e: &dyn std::fmt::Display| {
        tracing::error!(error = %e, app_id, "Share emission failed");
        ApiError::contract_call_failed()
    };

    state
        .ledger
        .fund_app_account(
            credential.account(),
            app_id,
            state.settings.app_funding_microalgos,
        )
        .await
        .map_err(|e| fail(&e))?;

    let call = MethodCall::new(
        EMIT_SHARES_METHOD,
        vec![
            AbiValue::String(request.name),
            AbiValue::String(request.unit_name),
            AbiValue::Uint(request.quantity),
        ],
    )
    .with_fee(state.settings.method_call_fee_microalgos);

    let result = state
        .ledger
        .call_method(credential.account(), app_id, call)
        .await
        .map_err(|e| fail(&e))?;

    let asset_id = result
        .return_value
        .as_ref()
        .and_then(AbiValue::as_u64)
        .ok_or_else(|| fail(&"method returned no asset id"))?;

    tracing::info!(app_id, asset_id, tx_id = %result.tx_id, "Shares emitted");
    Ok(Json(EmitSharesResponse { asset_id }))
}
