//! Test utilities for starline-client
//!
//! - [`MockTransport`] replays queued responses and records every request.
//! - [`MemoryLogger`] keeps every error record in memory.
//! - [`TestServer`] serves an axum router on a local port and points a
//!   client with the real reqwest transport at it.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::error::{Result, StarlineError};
use crate::logger::ErrorLogger;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportOptions};
use crate::{Config, StarlineClient};

enum MockReply {
    Response(HttpResponse),
    Fault(String),
}

/// Transport that answers from a FIFO queue
///
/// An empty queue is a transport fault, so a test that sends more requests
/// than it expected fails loudly.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response
    pub fn push_response(&self, response: HttpResponse) -> &Self {
        self.replies.lock().push_back(MockReply::Response(response));
        self
    }

    /// Queue a JSON response with the given status
    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push_response(HttpResponse::new(status, body.to_string()))
    }

    /// Queue a transport fault (connection refused, timeout, ...)
    pub fn push_fault(&self, message: impl Into<String>) -> &Self {
        self.replies.lock().push_back(MockReply::Fault(message.into()));
        self
    }

    /// Every request sent so far, oldest first
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request);
        match self.replies.lock().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Fault(message)) => Err(StarlineError::transport(message)),
            None => Err(StarlineError::transport("no mock response queued")),
        }
    }
}

/// Error logger that records into memory
#[derive(Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(String, Value)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(message, context)` pairs
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries.lock().clone()
    }

    /// Recorded messages only
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }
}

impl ErrorLogger for MemoryLogger {
    fn log_error(&self, message: &str, context: &Value) {
        self.entries
            .lock()
            .push((message.to_string(), context.clone()));
    }
}

/// A test server that automatically shuts down when dropped
///
/// Both StarLine hosts are mapped to the same server, so one router
/// serves the `apiV3/...` and `json/...` paths.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: StarlineClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start serving `router` with a client for `config`
    pub async fn start<S>(router: axum::Router<S>, config: Config) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        let options = TransportOptions {
            timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
        };
        Self::start_with_options(router, config, options).await
    }

    /// Start serving `router` with custom transport options
    pub async fn start_with_options<S>(
        router: axum::Router<S>,
        config: Config,
        options: TransportOptions,
    ) -> Result<Self>
    where
        S: Clone + Send + Sync + 'static,
        axum::Router<S>: Into<axum::Router>,
    {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| StarlineError::transport(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| StarlineError::transport(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let router: axum::Router = router.into();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let transport = Arc::new(ReqwestTransport::new(options));
        let client = StarlineClient::with_transport(config, transport)?
            .with_base_urls(&base_url, &base_url)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &StarlineClient {
        &self.client
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
