use std::sync::Arc;
use std::time::Duration;

use http::Method;
use serde_json::json;
use tokio::time::{timeout, Instant};

use crate::cache::token::Token;
use crate::errors::FetchError;
use crate::observability::observer::RelayObserver;
use crate::parser::parser::extract_token;
use crate::transport::request::{Transport, UpstreamRequest};
use crate::utils::constants::{DEFAULT_FETCH_TIMEOUT_MS, IDENTIFIER_PLACEHOLDER};

/// Performs the authorization exchange for one identifier.
/// Implementations never retry.
pub trait TokenFetcher: Send + Sync {
    fn fetch(
        &self,
        identifier: &str,
    ) -> impl std::future::Future<Output = Result<Token, FetchError>> + Send;
}

/// Fetches a token by POSTing `{"clientKey": ...}` to the authorization
/// endpoint and extracting the `token` field of the answer.
pub struct HttpTokenFetcher<T> {
    transport: T,
    authorization_url: String,
    client_key: String,
    timeout: Duration,
    observer: Arc<dyn RelayObserver>,
}

impl<T: Transport> HttpTokenFetcher<T> {
    pub fn new(
        transport: T,
        authorization_url: impl Into<String>,
        client_key: impl Into<String>,
        observer: Arc<dyn RelayObserver>,
    ) -> Self {
        Self {
            transport,
            authorization_url: authorization_url.into(),
            client_key: client_key.into(),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            observer,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authorization URL for `identifier`: an `{id}` placeholder is replaced
    /// by the percent-encoded identifier, a URL without one is used as-is.
    pub fn authorization_url_for(&self, identifier: &str) -> String {
        self.authorization_url
            .replace(IDENTIFIER_PLACEHOLDER, &urlencoding::encode(identifier))
    }

    async fn exchange(&self, identifier: &str) -> Result<Token, FetchError> {
        let body = json!({ "clientKey": self.client_key }).to_string();
        let request = UpstreamRequest::new(Method::POST, self.authorization_url_for(identifier))
            .json_body(body);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| FetchError::RemoteRejected {
                status: err.status(),
                reason: err.reason(),
            })?;

        extract_token(&response.body)
    }
}

impl<T: Transport> TokenFetcher for HttpTokenFetcher<T> {
    async fn fetch(&self, identifier: &str) -> Result<Token, FetchError> {
        self.observer.on_fetch_started(identifier);
        let start = Instant::now();

        let outcome = match timeout(self.timeout, self.exchange(identifier)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::RemoteRejected {
                status: None,
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        };

        match &outcome {
            Ok(_) => self.observer.on_token_fetched(identifier, start.elapsed()),
            Err(err) => self.observer.on_fetch_failure(identifier, err, start.elapsed()),
        }
        outcome
    }
}
