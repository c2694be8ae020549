use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Method;
use tokio::time::{timeout, Instant};

use crate::cache::token_cache::TokenCache;
use crate::errors::{ForwardError, TransportError};
use crate::forwarder::target::{UpstreamEndpoints, UpstreamTarget};
use crate::observability::observer::RelayObserver;
use crate::sources::fetch::TokenFetcher;
use crate::transport::request::{Transport, UpstreamRequest};
use crate::utils::constants::DEFAULT_FORWARD_TIMEOUT_MS;

/// Forwards caller requests to an upstream with the cached bearer token.
pub struct AuthenticatedForwarder<F, T> {
    cache: Arc<TokenCache>,
    fetcher: Arc<F>,
    transport: T,
    endpoints: UpstreamEndpoints,
    timeout: Duration,
    observer: Arc<dyn RelayObserver>,
}

impl<F, T> AuthenticatedForwarder<F, T>
where
    F: TokenFetcher + 'static,
    T: Transport,
{
    pub fn new(
        cache: Arc<TokenCache>,
        fetcher: Arc<F>,
        transport: T,
        endpoints: UpstreamEndpoints,
        observer: Arc<dyn RelayObserver>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            transport,
            endpoints,
            timeout: Duration::from_millis(DEFAULT_FORWARD_TIMEOUT_MS),
            observer,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &Arc<TokenCache> {
        &self.cache
    }

    /// GET the application upstream on behalf of `identifier`.
    pub async fn call_application(&self, identifier: &str) -> Result<String, ForwardError> {
        self.forward(identifier, UpstreamTarget::Application, Method::GET, None)
            .await
    }

    /// POST `body` (JSON) to the other-service upstream on behalf of `identifier`.
    pub async fn call_other_service(
        &self,
        identifier: &str,
        body: Bytes,
    ) -> Result<String, ForwardError> {
        self.forward(identifier, UpstreamTarget::Other, Method::POST, Some(body))
            .await
    }

    /// Obtain the token (fetching on a cold cache) and issue the call.
    /// Returns the upstream body untouched. Nothing is sent upstream when
    /// no token could be obtained.
    pub async fn forward(
        &self,
        identifier: &str,
        target: UpstreamTarget,
        method: Method,
        body: Option<Bytes>,
    ) -> Result<String, ForwardError> {
        let token = match self.cache.get_or_fetch(identifier, self.fetcher.clone()).await {
            Ok(token) => token,
            Err(fetch_error) => {
                let err = ForwardError::TokenUnavailable(fetch_error);
                self.observer.on_forward_failure(identifier, target, &err);
                return Err(err);
            }
        };

        let mut request = match UpstreamRequest::new(method, self.endpoints.url(target)).bearer(&token) {
            Ok(request) => request,
            Err(_) => {
                let err = ForwardError::UpstreamFailed {
                    target,
                    status: None,
                    reason: "token is not a valid header value".to_owned(),
                };
                self.observer.on_forward_failure(identifier, target, &err);
                return Err(err);
            }
        };
        if let Some(body) = body {
            request = request.json_body(body);
        }

        self.observer
            .on_upstream_request(identifier, target, &request.method);
        let start = Instant::now();

        let outcome = match timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response.body),
            Ok(Err(transport_error)) => Err(upstream_failed(target, transport_error)),
            Err(_) => Err(ForwardError::UpstreamFailed {
                target,
                status: None,
                reason: format!("timed out after {}ms", self.timeout.as_millis()),
            }),
        };
        self.observer
            .on_upstream_response(identifier, target, start.elapsed());

        if let Err(err) = &outcome {
            self.observer.on_forward_failure(identifier, target, err);
        }
        outcome
    }
}

fn upstream_failed(target: UpstreamTarget, err: TransportError) -> ForwardError {
    ForwardError::UpstreamFailed {
        target,
        status: err.status(),
        reason: err.reason(),
    }
}
