use std::sync::Arc;
use std::time::Duration;

use http::Method;
use tracing::{debug, error, warn};

use crate::errors::{FetchError, ForwardError};
use crate::forwarder::target::UpstreamTarget;
use crate::observability::metrics::Metrics;

/// Hook invoked by the fetcher and the forwarder at each outcome site.
///
/// Errors are returned to callers unchanged; reporting happens here, so
/// callers and tests never depend on what gets logged.
pub trait RelayObserver: Send + Sync {
    fn on_fetch_started(&self, _identifier: &str) {}

    fn on_token_fetched(&self, _identifier: &str, _elapsed: Duration) {}

    fn on_fetch_failure(&self, identifier: &str, error: &FetchError, elapsed: Duration);

    fn on_upstream_request(&self, _identifier: &str, _target: UpstreamTarget, _method: &Method) {}

    fn on_upstream_response(&self, _identifier: &str, _target: UpstreamTarget, _elapsed: Duration) {}

    fn on_forward_failure(&self, identifier: &str, target: UpstreamTarget, error: &ForwardError);
}

/// Logs through `tracing` and records Prometheus metrics.
#[derive(Clone)]
pub struct TracingObserver {
    metrics: Arc<Metrics>,
}

impl TracingObserver {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl RelayObserver for TracingObserver {
    fn on_fetch_started(&self, identifier: &str) {
        debug!(identifier, "fetching token");
        self.metrics.token_fetches.inc();
    }

    fn on_token_fetched(&self, identifier: &str, elapsed: Duration) {
        debug!(identifier, elapsed_ms = elapsed.as_millis() as u64, "token fetched");
        self.metrics.token_fetch_duration.observe(elapsed.as_secs_f64());
    }

    fn on_fetch_failure(&self, identifier: &str, error: &FetchError, elapsed: Duration) {
        error!(
            identifier,
            status = ?error.status(),
            error = %error,
            "error fetching token"
        );
        self.metrics.token_fetch_duration.observe(elapsed.as_secs_f64());
        self.metrics
            .token_fetch_failures
            .with_label_values(&[error.kind()])
            .inc();
    }

    fn on_upstream_request(&self, identifier: &str, target: UpstreamTarget, method: &Method) {
        debug!(identifier, %target, %method, "forwarding request");
        self.metrics
            .upstream_requests
            .with_label_values(&[target.as_str(), method.as_str()])
            .inc();
    }

    fn on_upstream_response(&self, _identifier: &str, target: UpstreamTarget, elapsed: Duration) {
        self.metrics
            .upstream_duration
            .with_label_values(&[target.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    fn on_forward_failure(&self, identifier: &str, target: UpstreamTarget, error: &ForwardError) {
        match error {
            // already reported by the fetcher
            ForwardError::TokenUnavailable(_) => {
                warn!(identifier, %target, "no token, upstream call skipped");
            }
            ForwardError::UpstreamFailed { status, .. } => {
                error!(
                    identifier,
                    %target,
                    status = ?status,
                    error = %error,
                    "error calling upstream"
                );
            }
        }
        self.metrics
            .upstream_failures
            .with_label_values(&[target.as_str(), error.kind()])
            .inc();
    }
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RelayObserver for NoopObserver {
    fn on_fetch_failure(&self, _identifier: &str, _error: &FetchError, _elapsed: Duration) {}

    fn on_forward_failure(&self, _identifier: &str, _target: UpstreamTarget, _error: &ForwardError) {}
}
