use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use axum::Router;
use tracing::info;

use crate::cache::token_cache::TokenCache;
use crate::config::relay::ServiceConfig;
use crate::config::settings::SettingsConfig;
use crate::forwarder::forwarder::AuthenticatedForwarder;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::observer::RelayObserver;
use crate::observability::routes::MetricsState;
use crate::server::gateway::GatewayState;
use crate::sources::fetch::HttpTokenFetcher;
use crate::transport::http_client::ReqwestTransport;
use crate::utils::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_FORWARD_TIMEOUT_MS};

/// Forwarder wired to the real HTTP transport
pub type RelayForwarder = AuthenticatedForwarder<HttpTokenFetcher<ReqwestTransport>, ReqwestTransport>;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub gateway_state: GatewayState,
}

impl AppState {
    pub fn new (
        metrics: &Metrics,
        forwarder: Arc<RelayForwarder>,
    ) -> Self{
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            gateway_state: GatewayState::new(forwarder),
        }
    }
}

/// Build the forwarder and its collaborators from config. The token cache
/// starts empty and lives as long as the returned forwarder.
pub fn build_forwarder(
    service_config: &ServiceConfig,
    transport: ReqwestTransport,
    observer: Arc<dyn RelayObserver>,
) -> RelayForwarder {
    let timeouts = service_config.settings.timeouts.as_ref();
    let fetch_ms = timeouts.and_then(|t| t.fetch_ms).unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
    let forward_ms = timeouts.and_then(|t| t.forward_ms).unwrap_or(DEFAULT_FORWARD_TIMEOUT_MS);

    let fetcher = HttpTokenFetcher::new(
        transport.clone(),
        service_config.endpoints.authorization_url.to_owned(),
        service_config.client.api_key.to_owned(),
        observer.clone(),
    )
    .with_timeout(Duration::from_millis(fetch_ms));

    AuthenticatedForwarder::new(
        Arc::new(TokenCache::new()),
        Arc::new(fetcher),
        transport,
        service_config.endpoints.upstreams(),
        observer,
    )
    .with_timeout(Duration::from_millis(forward_ms))
}

/// Relay routes plus the metrics route when enabled.
pub async fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics).await)
        .merge(state.gateway_state.router().await)
        .with_state(state)
}

/// Serve the relay until ctrl-c.
pub async fn start(
    settings_config: &SettingsConfig,
    forwarder: Arc<RelayForwarder>,
) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, forwarder);
    let app = router(settings_config, state).await;

    let bind_addr = &settings_config.server.host;
    let port = &settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port))
        .await
        .map_err(|e| anyhow!("cannot bind {}:{}: {}", bind_addr, port, e))?;
    info!("listening on {}:{}", bind_addr, port);

    metrics.up.set(1);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    metrics.up.set(0);

    served.map_err(|e| anyhow!("server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
