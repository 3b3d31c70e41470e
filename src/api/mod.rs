// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_credential,
    models::{
        CreateHolderRequest, DeployContractResponse, EmitSharesRequest, EmitSharesResponse,
        FundRequest, HolderData, OperationResponse, OptInRequest, TransferTokensRequest,
    },
    state::AppState,
};

pub mod account;
pub mod contract;
pub mod extract;
pub mod holders;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    // Unknown paths fall through to the gate too, so they answer 401
    // rather than revealing which routes exist.
    let ledger_routes = Router::new()
        .route("/deploy-contract", post(contract::deploy_contract))
        .route("/emit-shares", post(contract::emit_shares))
        .route("/create-holder", post(holders::create_holder))
        .route("/optin-token", post(account::optin_token))
        .route("/fund", post(account::fund))
        .route("/transfer-tokens", post(holders::transfer_tokens))
        .layer(middleware::from_fn(require_credential))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback_service(ledger_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}

/// Declares the `Authorization` header as the `secret_phrase` scheme.
struct SecretPhraseAuth;

impl Modify for SecretPhraseAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "secret_phrase",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("Authorization"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        contract::deploy_contract,
        contract::emit_shares,
        holders::create_holder,
        holders::transfer_tokens,
        account::optin_token,
        account::fund
    ),
    components(
        schemas(
            DeployContractResponse,
            EmitSharesRequest,
            EmitSharesResponse,
            HolderData,
            CreateHolderRequest,
            TransferTokensRequest,
            OptInRequest,
            FundRequest,
            OperationResponse
        )
    ),
    modifiers(&SecretPhraseAuth),
    tags(
        (name = "Contract", description = "Share contract deployment and minting"),
        (name = "Holders", description = "Holder registration and share transfers"),
        (name = "Account", description = "Account funding and token opt-in")
    )
)]
struct ApiDoc;
