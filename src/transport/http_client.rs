use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::errors::TransportError;
use crate::transport::request::{Transport, UpstreamRequest, UpstreamResponse};

/// [`Transport`] backed by a shared `reqwest` client (connection pool, TLS).
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, TransportError> {
        Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map(Self::new)
            .map_err(|err| TransportError::Connection {
                reason: format!("cannot build http client: {err}"),
            })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "sending upstream request");

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| TransportError::Connection {
            reason: err.to_string(),
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|err| TransportError::Connection {
            reason: format!("reading response body: {err}"),
        })?;

        if !status.is_success() {
            return Err(TransportError::Status { status, body });
        }
        Ok(UpstreamResponse { status, body })
    }
}
