// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process algod stand-in for client and ledger tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use data_encoding::BASE32_NOPAD;
use rmpv::Value;
use serde_json::json;
use sha2::{Digest, Sha512_256};

use super::client::AlgodClient;
use super::transaction::encode_value;
use super::types::NodeConfig;

pub(crate) const TOKEN: &str = "mock-token";
pub(crate) const LAST_ROUND: u64 = 100;
pub(crate) const CREATED_APP_ID: u64 = 1234;

#[derive(Default)]
struct MockState {
    submitted: Vec<Value>,
    simulations: usize,
    pool_error: String,
    unconfirmed: bool,
    logs: Vec<Vec<u8>>,
    simulate_error: bool,
    send_error: Option<String>,
}

type Shared = Arc<Mutex<MockState>>;
type Reply = (StatusCode, Json<serde_json::Value>);

pub(crate) struct MockAlgod {
    addr: SocketAddr,
    state: Shared,
}

impl MockAlgod {
    pub(crate) async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route("/v2/transactions/params", get(params))
            .route("/v2/status", get(status))
            .route("/v2/status/wait-for-block-after/{round}", get(wait_for_block))
            .route("/v2/transactions", post(send))
            .route("/v2/transactions/pending/{tx_id}", get(pending))
            .route("/v2/teal/compile", post(compile))
            .route("/v2/transactions/simulate", post(simulate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        Self { addr, state }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn client(&self) -> AlgodClient {
        AlgodClient::new(&NodeConfig {
            server: self.url(),
            port: None,
            token: TOKEN.into(),
        })
        .unwrap()
    }

    /// Signed transactions received so far, decoded.
    pub(crate) fn submitted(&self) -> Vec<Value> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub(crate) fn simulations(&self) -> usize {
        self.state.lock().unwrap().simulations
    }

    pub(crate) fn set_pool_error(&self, error: &str) {
        self.state.lock().unwrap().pool_error = error.into();
    }

    pub(crate) fn set_confirmed(&self, confirmed: bool) {
        self.state.lock().unwrap().unconfirmed = !confirmed;
    }

    pub(crate) fn set_logs(&self, logs: Vec<Vec<u8>>) {
        self.state.lock().unwrap().logs = logs;
    }

    pub(crate) fn fail_simulation(&self) {
        self.state.lock().unwrap().simulate_error = true;
    }

    pub(crate) fn fail_send(&self, message: &str) {
        self.state.lock().unwrap().send_error = Some(message.into());
    }
}

/// Look up a key in a decoded msgpack map.
pub(crate) fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value
        .as_map()?
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)
}

fn authorize(headers: &HeaderMap) -> Result<(), Reply> {
    match headers.get("X-Algo-API-Token") {
        Some(token) if token == TOKEN => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API Token" })),
        )),
    }
}

fn ok(body: serde_json::Value) -> Reply {
    (StatusCode::OK, Json(body))
}

async fn params(headers: HeaderMap) -> Result<Reply, Reply> {
    authorize(&headers)?;
    Ok(ok(json!({
        "consensus-version": "future",
        "fee": 0,
        "min-fee": 1000,
        "last-round": LAST_ROUND,
        "genesis-id": "dockernet-v1",
        "genesis-hash": STANDARD.encode([7u8; 32]),
    })))
}

async fn status(headers: HeaderMap) -> Result<Reply, Reply> {
    authorize(&headers)?;
    Ok(ok(json!({ "last-round": LAST_ROUND })))
}

async fn wait_for_block(headers: HeaderMap, Path(round): Path<u64>) -> Result<Reply, Reply> {
    authorize(&headers)?;
    Ok(ok(json!({ "last-round": round + 1 })))
}

async fn send(
    State(state): State<Shared>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Reply, Reply> {
    authorize(&headers)?;
    let mut state = state.lock().unwrap();
    if let Some(message) = &state.send_error {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": message })),
        ));
    }

    let mut rest = &body[..];
    let mut first_id = None;
    while !rest.is_empty() {
        let signed = rmpv::decode::read_value(&mut rest).unwrap();
        let txn = field(&signed, "txn").unwrap();
        let mut message = b"TX".to_vec();
        message.extend(encode_value(txn));
        first_id.get_or_insert_with(|| BASE32_NOPAD.encode(&Sha512_256::digest(&message)));
        state.submitted.push(signed);
    }

    Ok(ok(json!({ "txId": first_id.unwrap_or_default() })))
}

async fn pending(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(_tx_id): Path<String>,
) -> Result<Reply, Reply> {
    authorize(&headers)?;
    let state = state.lock().unwrap();
    let logs: Vec<String> = state.logs.iter().map(|l| STANDARD.encode(l)).collect();

    if !state.pool_error.is_empty() {
        return Ok(ok(json!({ "pool-error": state.pool_error, "txn": {} })));
    }
    if state.unconfirmed {
        return Ok(ok(json!({ "pool-error": "", "txn": {} })));
    }
    Ok(ok(json!({
        "confirmed-round": LAST_ROUND + 1,
        "pool-error": "",
        "application-index": CREATED_APP_ID,
        "logs": logs,
        "txn": {},
    })))
}

async fn compile(headers: HeaderMap) -> Result<Reply, Reply> {
    authorize(&headers)?;
    Ok(ok(json!({ "hash": "MOCKHASH", "result": "CoEBQw==" })))
}

async fn simulate(State(state): State<Shared>, headers: HeaderMap) -> Result<Reply, Reply> {
    authorize(&headers)?;
    let mut state = state.lock().unwrap();
    if state.simulate_error {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "simulation unavailable" })),
        ));
    }
    state.simulations += 1;

    Ok(ok(json!({
        "version": 2,
        "last-round": LAST_ROUND,
        "txn-groups": [{
            "txn-results": [{ "txn-result": { "txn": {} } }],
            "unnamed-resources-accessed": {
                "accounts": ["AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"],
                "assets": [55],
                "boxes": [{ "app": CREATED_APP_ID, "name": STANDARD.encode(b"holder") }],
            },
        }],
    })))
}
