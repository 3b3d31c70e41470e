// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # HTTP Server Lifecycle
//!
//! [`start`] binds the listener and serves the API on a background task.
//! The returned [`RunningServer`] stops it through a `CancellationToken`:
//! in-flight requests finish, then the listener is closed.

use std::{io, net::SocketAddr};

use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{api::router, state::AppState};

/// Handle to a server started with [`start`].
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<io::Result<()>>,
}

/// Bind `addr` and serve the API until stopped.
pub async fn start(addr: SocketAddr, state: AppState) -> io::Result<RunningServer> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();

    let app = router(state);
    let signal = shutdown.clone();
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
    });

    tracing::info!(%local_addr, "Investment gateway listening (docs at /docs)");

    Ok(RunningServer {
        local_addr,
        shutdown,
        task,
    })
}

impl RunningServer {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn stop(self) -> io::Result<()> {
        self.shutdown.cancel();
        self.wait().await
    }

    /// Wait for the server task to finish.
    pub async fn wait(self) -> io::Result<()> {
        let result = match self.task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        };
        tracing::info!(local_addr = %self.local_addr, "Server stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::blockchain::ledger::stub::StubLedger;

    fn state() -> AppState {
        AppState::new(Arc::new(StubLedger::default()))
    }

    #[tokio::test]
    async fn serves_and_releases_socket() {
        let server = start("127.0.0.1:0".parse().unwrap(), state())
            .await
            .unwrap();
        let addr = server.local_addr();
        assert_ne!(addr.port(), 0);

        let response = reqwest::Client::new()
            .post(format!("http://{addr}/fund"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
        drop(response);

        server.stop().await.unwrap();
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let server = start("127.0.0.1:0".parse().unwrap(), state())
            .await
            .unwrap();

        assert!(start(server.local_addr(), state()).await.is_err());
        server.stop().await.unwrap();
    }
}
