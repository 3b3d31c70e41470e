// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Algod REST client for ledger interactions.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header::CONTENT_TYPE, Client, Response};
use serde::{de::DeserializeOwned, Deserialize};

use super::abi::AbiError;
use super::address::Address;
use super::app_spec::AppSpecError;
use super::transaction::{encode_value, CanonicalMap, SignedTransaction};
use super::types::{NodeConfig, PendingTransaction, SuggestedParams};

/// Header carrying the node API token.
const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

const BINARY_CONTENT_TYPE: &str = "application/x-binary";
const MSGPACK_CONTENT_TYPE: &str = "application/msgpack";

/// Algod client.
#[derive(Debug, Clone)]
pub struct AlgodClient {
    /// Base URL without trailing slash
    base_url: String,
    token: String,
    http: Client,
}

/// Resources an application call touched without declaring them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcesAccessed {
    pub accounts: Vec<Address>,
    pub assets: Vec<u64>,
    pub apps: Vec<u64>,
    /// `(app id, box name)` pairs
    pub boxes: Vec<(u64, Vec<u8>)>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ParamsResponse {
    fee: u64,
    min_fee: u64,
    last_round: u64,
    genesis_id: String,
    genesis_hash: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct StatusResponse {
    last_round: u64,
}

#[derive(Deserialize)]
struct SendResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PendingResponse {
    #[serde(default)]
    confirmed_round: Option<u64>,
    #[serde(default)]
    pool_error: String,
    #[serde(default)]
    application_index: Option<u64>,
    #[serde(default)]
    asset_index: Option<u64>,
    #[serde(default)]
    logs: Vec<String>,
}

#[derive(Deserialize)]
struct CompileResponse {
    result: String,
}

#[derive(Deserialize)]
struct NodeErrorBody {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SimulateResponse {
    #[serde(default)]
    txn_groups: Vec<SimulateGroup>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SimulateGroup {
    #[serde(default)]
    failure_message: Option<String>,
    #[serde(default)]
    unnamed_resources_accessed: Option<UnnamedResources>,
    #[serde(default)]
    txn_results: Vec<SimulateTxnResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SimulateTxnResult {
    #[serde(default)]
    unnamed_resources_accessed: Option<UnnamedResources>,
}

#[derive(Deserialize, Default)]
struct UnnamedResources {
    #[serde(default)]
    accounts: Vec<String>,
    #[serde(default)]
    assets: Vec<u64>,
    #[serde(default)]
    apps: Vec<u64>,
    #[serde(default)]
    boxes: Vec<BoxResource>,
}

#[derive(Deserialize)]
struct BoxResource {
    app: u64,
    name: String,
}

impl AlgodClient {
    /// Create a new client for the configured node.
    pub fn new(config: &NodeConfig) -> Result<Self, LedgerError> {
        let mut url: url::Url = config
            .server
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidNodeUrl(e.to_string()))?;

        if let Some(port) = config.port {
            url.set_port(Some(port))
                .map_err(|_| LedgerError::InvalidNodeUrl(config.server.clone()))?;
        }

        let http = Client::builder()
            .build()
            .map_err(|e| LedgerError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: url.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current network parameters for building transactions.
    pub async fn suggested_params(&self) -> Result<SuggestedParams, LedgerError> {
        let params: ParamsResponse = self.get_json("/v2/transactions/params").await?;

        let genesis_hash = STANDARD
            .decode(params.genesis_hash.as_bytes())
            .ok()
            .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
            .ok_or_else(|| LedgerError::InvalidResponse("genesis-hash".into()))?;

        Ok(SuggestedParams {
            fee_per_byte: params.fee,
            min_fee: params.min_fee,
            last_round: params.last_round,
            genesis_id: params.genesis_id,
            genesis_hash,
        })
    }

    /// Last round the node has seen.
    pub async fn last_round(&self) -> Result<u64, LedgerError> {
        let status: StatusResponse = self.get_json("/v2/status").await?;
        Ok(status.last_round)
    }

    /// Block until the node has seen the round after `round`.
    pub async fn wait_for_block_after(&self, round: u64) -> Result<u64, LedgerError> {
        let status: StatusResponse = self
            .get_json(&format!("/v2/status/wait-for-block-after/{round}"))
            .await?;
        Ok(status.last_round)
    }

    /// Submit a group of signed transactions. Returns the first transaction id.
    pub async fn send_raw_transaction(
        &self,
        group: &[SignedTransaction],
    ) -> Result<String, LedgerError> {
        let body: Vec<u8> = group.iter().flat_map(|txn| txn.to_msgpack()).collect();
        let response: SendResponse = self
            .post_bytes("/v2/transactions", BINARY_CONTENT_TYPE, body)
            .await?;
        Ok(response.tx_id)
    }

    pub async fn pending_transaction(&self, tx_id: &str) -> Result<PendingTransaction, LedgerError> {
        let pending: PendingResponse = self
            .get_json(&format!("/v2/transactions/pending/{tx_id}?format=json"))
            .await?;

        let logs = pending
            .logs
            .iter()
            .map(|log| STANDARD.decode(log.as_bytes()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LedgerError::InvalidResponse("logs".into()))?;

        Ok(PendingTransaction {
            confirmed_round: pending.confirmed_round,
            pool_error: pending.pool_error,
            application_index: pending.application_index,
            asset_index: pending.asset_index,
            logs,
        })
    }

    /// Poll until the transaction is confirmed, rejected, or `max_rounds`
    /// rounds have passed.
    pub async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransaction, LedgerError> {
        let start = self.last_round().await?.saturating_add(1);
        let end = start.saturating_add(max_rounds);
        let mut round = start;

        while round < end {
            let pending = self.pending_transaction(tx_id).await?;
            if pending.is_confirmed() {
                return Ok(pending);
            }
            if !pending.pool_error.is_empty() {
                return Err(LedgerError::Rejected {
                    tx_id: tx_id.to_string(),
                    reason: pending.pool_error,
                });
            }

            self.wait_for_block_after(round).await?;
            round += 1;
        }

        Err(LedgerError::ConfirmationTimeout {
            tx_id: tx_id.to_string(),
            rounds: max_rounds,
        })
    }

    /// Compile TEAL source into program bytes.
    pub async fn compile_teal(&self, source: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let compiled: CompileResponse = self
            .post_bytes("/v2/teal/compile", "text/plain", source)
            .await?;
        STANDARD
            .decode(compiled.result.as_bytes())
            .map_err(|_| LedgerError::InvalidResponse("compiled program".into()))
    }

    /// Simulate a group with empty signatures and report the resources it
    /// used without declaring them.
    pub async fn simulate_resources(
        &self,
        group: &[SignedTransaction],
    ) -> Result<ResourcesAccessed, LedgerError> {
        let mut txn_group = CanonicalMap::default();
        txn_group.array("txns", group.iter().map(SignedTransaction::to_value).collect());

        let mut request = CanonicalMap::default();
        request.bool("allow-empty-signatures", true);
        request.bool("allow-unnamed-resources", true);
        request.array("txn-groups", vec![txn_group.into_value()]);

        let response: SimulateResponse = self
            .post_bytes(
                "/v2/transactions/simulate",
                MSGPACK_CONTENT_TYPE,
                encode_value(&request.into_value()),
            )
            .await?;

        let group = response
            .txn_groups
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::InvalidResponse("empty simulation".into()))?;

        if let Some(message) = group.failure_message.filter(|m| !m.is_empty()) {
            return Err(LedgerError::SimulationFailed(message));
        }

        let mut accessed = ResourcesAccessed::default();
        let sources = group
            .unnamed_resources_accessed
            .into_iter()
            .chain(
                group
                    .txn_results
                    .into_iter()
                    .filter_map(|r| r.unnamed_resources_accessed),
            );
        for resources in sources {
            for account in resources.accounts {
                let address = account
                    .parse()
                    .map_err(|_| LedgerError::InvalidResponse(format!("account {account}")))?;
                accessed.accounts.push(address);
            }
            accessed.assets.extend(resources.assets);
            accessed.apps.extend(resources.apps);
            for b in resources.boxes {
                let name = STANDARD
                    .decode(b.name.as_bytes())
                    .map_err(|_| LedgerError::InvalidResponse("box name".into()))?;
                accessed.boxes.push((b.app, name));
            }
        }

        Ok(accessed)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LedgerError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(API_TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn post_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<T, LedgerError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(API_TOKEN_HEADER, &self.token)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| LedgerError::Request(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, LedgerError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<NodeErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(LedgerError::Node {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid node URL: {0}")]
    InvalidNodeUrl(String),

    #[error("Node request failed: {0}")]
    Request(String),

    #[error("Node returned {status}: {message}")]
    Node { status: u16, message: String },

    #[error("Invalid node response: {0}")]
    InvalidResponse(String),

    #[error("Transaction {tx_id} rejected: {reason}")]
    Rejected { tx_id: String, reason: String },

    #[error("Transaction {tx_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout { tx_id: String, rounds: u64 },

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),

    #[error(transparent)]
    AppSpec(#[from] AppSpecError),

    #[error(transparent)]
    Abi(#[from] AbiError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock_algod::MockAlgod;
    use crate::blockchain::transaction::Transaction;

    fn node(server: &str, port: Option<u16>) -> NodeConfig {
        NodeConfig {
            server: server.to_string(),
            port,
            token: "a".repeat(64),
        }
    }

    #[test]
    fn base_url_includes_port() {
        let client = AlgodClient::new(&node("http://localhost", Some(4001))).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4001");

        let client = AlgodClient::new(&node("https://testnet-api.example.org/", None)).unwrap();
        assert_eq!(client.base_url(), "https://testnet-api.example.org");
    }

    #[test]
    fn rejects_invalid_server() {
        assert!(matches!(
            AlgodClient::new(&node("not a url", None)),
            Err(LedgerError::InvalidNodeUrl(_))
        ));
    }

    #[tokio::test]
    async fn reads_suggested_params() {
        let mock = MockAlgod::start().await;
        let client = mock.client();

        let params = client.suggested_params().await.unwrap();
        assert_eq!(params.min_fee, 1000);
        assert_eq!(params.last_round, 100);
        assert_eq!(params.genesis_id, "dockernet-v1");
        assert_eq!(params.genesis_hash, [7u8; 32]);
    }

    #[tokio::test]
    async fn wrong_token_maps_to_node_error() {
        let mock = MockAlgod::start().await;
        let client = AlgodClient::new(&NodeConfig {
            server: mock.url(),
            port: None,
            token: "wrong".into(),
        })
        .unwrap();

        match client.last_round().await {
            Err(LedgerError::Node { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Token");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submits_and_confirms() {
        let mock = MockAlgod::start().await;
        let client = mock.client();
        let params = client.suggested_params().await.unwrap();

        let txn = Transaction::payment(Address::ZERO, Address::ZERO, 1, &params)
            .with_fee(&params, None)
            .unsigned();
        let expected_id = txn.id();

        let tx_id = client.send_raw_transaction(&[txn]).await.unwrap();
        assert_eq!(tx_id, expected_id);
        assert_eq!(mock.submitted().len(), 1);

        let pending = client.wait_for_confirmation(&tx_id, 4).await.unwrap();
        assert_eq!(pending.confirmed_round, Some(101));
    }

    #[tokio::test]
    async fn pool_error_is_a_rejection() {
        let mock = MockAlgod::start().await;
        mock.set_pool_error("asset already opted in");
        let client = mock.client();

        match client.wait_for_confirmation("TXID", 4).await {
            Err(LedgerError::Rejected { reason, .. }) => {
                assert_eq!(reason, "asset already opted in")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unconfirmed_transaction_times_out() {
        let mock = MockAlgod::start().await;
        mock.set_confirmed(false);
        let client = mock.client();

        assert!(matches!(
            client.wait_for_confirmation("TXID", 3).await,
            Err(LedgerError::ConfirmationTimeout { rounds: 3, .. })
        ));
    }

    #[tokio::test]
    async fn huge_round_window_still_polls() {
        let mock = MockAlgod::start().await;
        let client = mock.client();

        let pending = client.wait_for_confirmation("TXID", u64::MAX).await.unwrap();
        assert!(pending.is_confirmed());
    }

    #[tokio::test]
    async fn compiles_teal() {
        let mock = MockAlgod::start().await;
        let program = mock
            .client()
            .compile_teal(b"#pragma version 10".to_vec())
            .await
            .unwrap();
        assert_eq!(program, vec![0x0a, 0x81, 0x01, 0x43]);
    }

    #[tokio::test]
    async fn simulation_reports_unnamed_resources() {
        let mock = MockAlgod::start().await;
        let client = mock.client();
        let params = client.suggested_params().await.unwrap();
        let txn = Transaction::payment(Address::ZERO, Address::ZERO, 1, &params).unsigned();

        let accessed = client.simulate_resources(&[txn]).await.unwrap();
        assert_eq!(accessed.accounts, vec![Address::ZERO]);
        assert_eq!(accessed.assets, vec![55]);
        assert_eq!(accessed.boxes, vec![(1234, b"holder".to_vec())]);
    }
}
