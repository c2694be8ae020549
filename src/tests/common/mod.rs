// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;

use crate::cache::token::Token;
use crate::errors::{FetchError, TransportError};
use crate::sources::fetch::TokenFetcher;
use crate::transport::request::{Transport, UpstreamRequest, UpstreamResponse};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Fetcher with a fixed outcome that counts its invocations.
pub struct CountingFetcher {
    calls: AtomicUsize,
    outcome: Result<Token, FetchError>,
}

impl CountingFetcher {
    pub fn ok(token: &str) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), outcome: Ok(Token::new(token)) })
    }

    pub fn failing(error: FetchError) -> Arc<Self> {
        Arc::new(Self { calls: AtomicUsize::new(0), outcome: Err(error) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenFetcher for CountingFetcher {
    async fn fetch(&self, _identifier: &str) -> Result<Token, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Transport that records every request and answers with a fixed outcome.
#[derive(Clone)]
pub struct FakeTransport {
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
    outcome: Result<String, TransportError>,
    delay: Duration,
}

impl FakeTransport {
    pub fn answering(outcome: Result<&str, TransportError>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            outcome: outcome.map(str::to_owned),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone().map(|body| UpstreamResponse {
            status: http::StatusCode::OK,
            body,
        })
    }
}
