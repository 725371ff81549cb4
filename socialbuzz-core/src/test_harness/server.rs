//! In-process backend server for tests and demos

use super::api::build_router;
use super::state::HarnessState;
use anyhow::Result;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Running harness instance. Dropping the handle without calling
/// [`HarnessHandle::shutdown`] leaves the server task running until the
/// runtime shuts down.
pub struct HarnessHandle {
    addr: SocketAddr,
    state: HarnessState,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl HarnessHandle {
    /// Bound address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL for a gateway pointed at this harness
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Direct handle to the backing state, for seeding and fault toggles
    pub fn state(&self) -> &HarnessState {
        &self.state
    }

    /// Stop the server and wait for the task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

/// Backend harness serving the REST contract on an ephemeral port
pub struct HarnessServer;

impl HarnessServer {
    /// Bind 127.0.0.1 on an OS-assigned port and serve until shutdown
    pub async fn spawn() -> Result<HarnessHandle> {
        Self::spawn_with_state(HarnessState::new()).await
    }

    /// Spawn over pre-seeded state
    pub async fn spawn_with_state(state: HarnessState) -> Result<HarnessHandle> {
        let router = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        info!(addr = %addr, "Backend harness listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = serve.await {
                tracing::error!(error = %e, "Harness server failed");
            }
        });

        Ok(HarnessHandle {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}
