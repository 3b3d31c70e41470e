// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! (and a `.env` file, when present) once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ALGOD_SERVER` | Algod node base URL | `http://localhost` |
//! | `ALGOD_PORT` | Algod node port (empty to use the URL as is) | `4001` |
//! | `ALGOD_TOKEN` | Algod API token | empty |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `APP_SPEC_PATH` | ARC-32 application specification | `InvestmentCaller.arc32.json` |
//! | `APP_FUNDING_MICROALGOS` | Funding for a new application account | `550000` |
//! | `METHOD_CALL_FEE_MICROALGOS` | Flat fee for contract calls | `12000` |
//! | `CONFIRMATION_ROUNDS` | Rounds to wait for confirmation | `4` |
//! | `POPULATE_APP_CALL_RESOURCES` | Simulate calls to fill references | `true` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::blockchain::{
    LedgerSettings, NodeConfig, DEFAULT_APP_FUNDING_MICROALGOS, DEFAULT_CONFIRMATION_ROUNDS,
    DEFAULT_METHOD_CALL_FEE_MICROALGOS,
};
use crate::state::OperationSettings;

pub const ALGOD_SERVER_ENV: &str = "ALGOD_SERVER";
pub const ALGOD_PORT_ENV: &str = "ALGOD_PORT";
pub const ALGOD_TOKEN_ENV: &str = "ALGOD_TOKEN";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_SPEC_PATH_ENV: &str = "APP_SPEC_PATH";
pub const APP_FUNDING_ENV: &str = "APP_FUNDING_MICROALGOS";
pub const METHOD_CALL_FEE_ENV: &str = "METHOD_CALL_FEE_MICROALGOS";
pub const CONFIRMATION_ROUNDS_ENV: &str = "CONFIRMATION_ROUNDS";
pub const POPULATE_RESOURCES_ENV: &str = "POPULATE_APP_CALL_RESOURCES";

/// Environment variable selecting the log formatter.
///
/// `json` emits one JSON object per line; anything else is human readable.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

const DEFAULT_ALGOD_SERVER: &str = "http://localhost";
const DEFAULT_ALGOD_PORT: u16 = 4001;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_SPEC_PATH: &str = "InvestmentCaller.arc32.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    pub bind_addr: SocketAddr,
    pub app_spec_path: PathBuf,
    pub operations: OperationSettings,
    pub populate_resources: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match lookup(ALGOD_PORT_ENV) {
            None => Some(DEFAULT_ALGOD_PORT),
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(parse(ALGOD_PORT_ENV, &v)?),
        };

        let node = NodeConfig {
            server: var(ALGOD_SERVER_ENV).unwrap_or_else(|| DEFAULT_ALGOD_SERVER.to_string()),
            port,
            token: lookup(ALGOD_TOKEN_ENV).unwrap_or_default(),
        };

        let host: IpAddr = match var(HOST_ENV) {
            Some(v) => parse(HOST_ENV, &v)?,
            None => parse(HOST_ENV, DEFAULT_HOST)?,
        };
        let listen_port = parse_or(&var, PORT_ENV, DEFAULT_PORT)?;

        let operations = OperationSettings {
            app_funding_microalgos: parse_or(&var, APP_FUNDING_ENV, DEFAULT_APP_FUNDING_MICROALGOS)?,
            method_call_fee_microalgos: parse_or(
                &var,
                METHOD_CALL_FEE_ENV,
                DEFAULT_METHOD_CALL_FEE_MICROALGOS,
            )?,
            confirmation_rounds: parse_or(&var, CONFIRMATION_ROUNDS_ENV, DEFAULT_CONFIRMATION_ROUNDS)?,
        };
        if operations.confirmation_rounds == 0 {
            return Err(ConfigError::InvalidValue {
                name: CONFIRMATION_ROUNDS_ENV,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            node,
            bind_addr: SocketAddr::new(host, listen_port),
            app_spec_path: var(APP_SPEC_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_APP_SPEC_PATH.to_string())
                .into(),
            operations,
            populate_resources: parse_or(&var, POPULATE_RESOURCES_ENV, true)?,
        })
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            confirmation_rounds: self.operations.confirmation_rounds,
            populate_resources: self.populate_resources,
        }
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

fn parse_or<T: FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => parse(name, &value),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.node.server, "http://localhost");
        assert_eq!(config.node.port, Some(4001));
        assert_eq!(config.node.token, "");
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.app_spec_path, PathBuf::from("InvestmentCaller.arc32.json"));
        assert_eq!(config.operations, OperationSettings::default());
        assert!(config.populate_resources);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            (ALGOD_SERVER_ENV, "https://testnet-api.example.org"),
            (ALGOD_PORT_ENV, ""),
            (ALGOD_TOKEN_ENV, "secret"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "8080"),
            (METHOD_CALL_FEE_ENV, "3000"),
            (CONFIRMATION_ROUNDS_ENV, "10"),
            (POPULATE_RESOURCES_ENV, "false"),
        ])
        .unwrap();

        assert_eq!(config.node.port, None);
        assert_eq!(config.node.token, "secret");
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.operations.method_call_fee_microalgos, 3000);
        assert_eq!(config.ledger_settings().confirmation_rounds, 10);
        assert!(!config.ledger_settings().populate_resources);
    }

    #[test]
    fn rejects_invalid_numbers() {
        let error = load(&[(PORT_ENV, "eighty")]).unwrap_err();
        assert!(error.to_string().contains(PORT_ENV));

        assert!(load(&[(POPULATE_RESOURCES_ENV, "sometimes")]).is_err());
        assert!(load(&[(APP_FUNDING_ENV, "-5")]).is_err());
    }

    #[test]
    fn rejects_zero_confirmation_rounds() {
        let error = load(&[(CONFIRMATION_ROUNDS_ENV, "0")]).unwrap_err();
        assert!(error.to_string().contains(CONFIRMATION_ROUNDS_ENV));
    }
}
