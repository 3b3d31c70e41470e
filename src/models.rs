// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `ToSchema` for OpenAPI documentation and
//! use camelCase field names on the wire.
//!
//! ## Addresses
//!
//! Address fields are typed as [`Address`], so a malformed or mistyped
//! address is rejected while the body is parsed, before any ledger call.
//!
//! ## Model Categories
//!
//! - **Contract**: deployment and share emission
//! - **Holders**: holder registration and token transfers
//! - **Account**: funding and token opt-in

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::extract::Validate;
use crate::blockchain::Address;
use crate::error::ApiError;

fn require_positive(field: &str, value: u64) -> Result<(), ApiError> {
    if value == 0 {
        return Err(ApiError::validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// =============================================================================
// Contract
// =============================================================================

/// Result of deploying the share contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployContractResponse {
    /// Id of the created application
    pub application_id: u64,
    /// Account owned by the application
    #[schema(value_type = String)]
    pub application_address: Address,
    pub transaction_id: String,
}

/// Request to mint the share token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmitSharesRequest {
    /// Token name
    #[schema(example = "Acme Shares")]
    pub name: String,
    /// Token unit name
    #[schema(example = "ACME")]
    pub unit_name: String,
    /// Total units to mint
    #[schema(example = 1000)]
    pub quantity: u64,
    /// Application returned by `/deploy-contract` (`appId` also accepted)
    #[serde(alias = "appId")]
    pub application_id: u64,
}

impl Validate for EmitSharesRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        require_text("unitName", &self.unit_name)?;
        require_positive("quantity", self.quantity)?;
        require_positive("applicationId", self.application_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmitSharesResponse {
    /// Id of the minted token
    pub asset_id: u64,
}

// =============================================================================
// Holders
// =============================================================================

/// Personal data stored for a holder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolderData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Request to register a holder with the contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHolderRequest {
    /// Holder account
    #[schema(value_type = String)]
    pub address: Address,
    pub data: HolderData,
    #[serde(alias = "appId")]
    pub application_id: u64,
}

impl Validate for CreateHolderRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("data.firstName", &self.data.first_name)?;
        require_text("data.lastName", &self.data.last_name)?;
        require_text("data.email", &self.data.email)?;
        require_text("data.phone", &self.data.phone)?;
        require_positive("applicationId", self.application_id)
    }
}

/// Request to transfer the share token to a holder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferTokensRequest {
    /// Receiving account; must have opted in to the token
    #[schema(value_type = String)]
    pub receiver: Address,
    #[serde(alias = "appId")]
    pub application_id: u64,
}

impl Validate for TransferTokensRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_positive("applicationId", self.application_id)
    }
}

// =============================================================================
// Account
// =============================================================================

/// Request to opt the caller in to a token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptInRequest {
    pub asset_id: u64,
}

impl Validate for OptInRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_positive("assetId", self.asset_id)
    }
}

/// Request to pay microalgos from the caller to an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundRequest {
    #[schema(value_type = String)]
    pub address: Address,
    /// Amount in microalgos
    #[schema(example = 1000000)]
    pub amount: u64,
}

impl Validate for FundRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_positive("amount", self.amount)
    }
}

/// Acknowledgement of a confirmed ledger operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub message: String,
    pub transaction_id: String,
}

impl OperationResponse {
    pub fn new(message: &str, transaction_id: String) -> Self {
        Self {
            message: message.to_string(),
            transaction_id,
        }
    }
}
