// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ARC-32 application specification.
//!
//! The specification is a JSON document produced alongside the contract. It
//! carries the TEAL sources (base64), the state schema to reserve at creation
//! and the ABI methods the contract exposes. It is loaded once at startup and
//! shared read-only afterwards.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use super::abi::{AbiError, Method};
use super::transaction::StateSchema;

#[derive(Debug, thiserror::Error)]
pub enum AppSpecError {
    #[error("Failed to read application spec {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid application spec: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid {0} program source")]
    InvalidSource(&'static str),

    #[error("Method {0} is not part of the contract")]
    UnknownMethod(String),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

/// Parsed ARC-32 document (only the parts this service uses).
#[derive(Debug, Clone, Deserialize)]
pub struct AppSpec {
    source: ProgramSource,
    #[serde(default)]
    state: StateSpec,
    contract: ContractSpec,
}

#[derive(Debug, Clone, Deserialize)]
struct ProgramSource {
    approval: String,
    clear: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StateSpec {
    #[serde(default)]
    global: SchemaSpec,
    #[serde(default)]
    local: SchemaSpec,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct SchemaSpec {
    #[serde(default)]
    num_byte_slices: u64,
    #[serde(default)]
    num_uints: u64,
}

impl From<SchemaSpec> for StateSchema {
    fn from(spec: SchemaSpec) -> Self {
        StateSchema {
            num_uints: spec.num_uints,
            num_byte_slices: spec.num_byte_slices,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSpec {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
    pub returns: ReturnSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgSpec {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnSpec {
    #[serde(rename = "type")]
    pub ty: String,
}

impl MethodSpec {
    pub fn signature(&self) -> String {
        let args: Vec<&str> = self.args.iter().map(|a| a.ty.as_str()).collect();
        format!("{}({}){}", self.name, args.join(","), self.returns.ty)
    }
}

impl AppSpec {
    pub fn from_json(json: &str) -> Result<Self, AppSpecError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppSpecError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AppSpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn contract_name(&self) -> &str {
        &self.contract.name
    }

    /// TEAL source of the approval program.
    pub fn approval_source(&self) -> Result<Vec<u8>, AppSpecError> {
        STANDARD
            .decode(self.source.approval.as_bytes())
            .map_err(|_| AppSpecError::InvalidSource("approval"))
    }

    /// TEAL source of the clear-state program.
    pub fn clear_source(&self) -> Result<Vec<u8>, AppSpecError> {
        STANDARD
            .decode(self.source.clear.as_bytes())
            .map_err(|_| AppSpecError::InvalidSource("clear"))
    }

    pub fn global_schema(&self) -> StateSchema {
        self.state.global.into()
    }

    pub fn local_schema(&self) -> StateSchema {
        self.state.local.into()
    }

    pub fn signatures(&self) -> impl Iterator<Item = String> + '_ {
        self.contract.methods.iter().map(MethodSpec::signature)
    }

    /// Resolve a signature against the contract's method list.
    pub fn method(&self, signature: &str) -> Result<Method, AppSpecError> {
        let found = self
            .contract
            .methods
            .iter()
            .find(|m| m.signature() == signature)
            .ok_or_else(|| AppSpecError::UnknownMethod(signature.to_string()))?;

        Ok(found.signature().parse()?)
    }
}
