// Drives the inbound routes against mocked authorization / upstream servers:
//  - authorization endpoint (POST) -> {"token": "T"}
//  - application endpoint (GET) and other-service endpoint (POST)
// and checks status, body and how often each mock was hit.

#[cfg(test)]
mod test {

use std::sync::Arc;

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::config::relay::{ClientConfig, EndpointsConfig, ServiceConfig};
use crate::config::settings::{MetricsConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;
use crate::observability::observer::TracingObserver;
use crate::server::server::{build_forwarder, router, AppState, RelayForwarder};
use crate::tests::common::{build_reqwest_client, spawn_axum};
use crate::transport::http_client::ReqwestTransport;

struct Upstreams {
    auth: MockServer,
    application: MockServer,
    other: MockServer,
}

impl Upstreams {
    async fn start() -> Self {
        Self {
            auth: MockServer::start_async().await,
            application: MockServer::start_async().await,
            other: MockServer::start_async().await,
        }
    }

    fn config(&self) -> ServiceConfig {
        ServiceConfig {
            client: ClientConfig { api_key: "client-key".to_owned() },
            endpoints: EndpointsConfig {
                authorization_url: self.auth.url("/token/{id}"),
                application_url: self.application.url("/data"),
                other_url: self.other.url("/ingest"),
            },
            settings: SettingsConfig {
                metrics: MetricsConfig { path: "/metrics".to_owned(), is_enabled: true },
                ..SettingsConfig::default()
            },
        }
    }
}

async fn spawn_relay(config: &ServiceConfig) -> (tokio::task::JoinHandle<()>, String) {
    let metrics = get_metrics().await;
    let observer = Arc::new(TracingObserver::new(metrics.clone()));
    let forwarder: RelayForwarder =
        build_forwarder(config, ReqwestTransport::new(Client::new()), observer);
    let state = AppState::new(metrics, Arc::new(forwarder));
    let app = router(&config.settings, state).await;
    let (handle, addr) = spawn_axum(app).await;
    (handle, format!("http://{}", addr))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fetch_on_cold_cache_returns_application_body() {
    let upstreams = Upstreams::start().await;
    let auth = upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST)
                .path("/token/42")
                .json_body(json!({ "clientKey": "client-key" }));
            then.status(200).body(r#"{"token":"T"}"#);
        })
        .await;
    let application = upstreams
        .application
        .mock_async(|when, then| {
            when.method(GET).path("/data").header("authorization", "Bearer T");
            then.status(200).body("application-response");
        })
        .await;

    let (handle, base) = spawn_relay(&upstreams.config()).await;
    let client = build_reqwest_client();

    let response = client.get(format!("{}/fetch/42", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "application-response");

    // second caller is served from the cache
    let response = client.get(format!("{}/fetch/43", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    auth.assert_hits_async(1).await;
    application.assert_hits_async(2).await;
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn other_service_receives_raw_body_with_bearer() {
    let upstreams = Upstreams::start().await;
    upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST).path("/token/7");
            then.status(200).body(r#"{"token":"T"}"#);
        })
        .await;
    let other = upstreams
        .other
        .mock_async(|when, then| {
            when.method(POST)
                .path("/ingest")
                .header("authorization", "Bearer T")
                .header("content-type", "application/json")
                .json_body(json!({ "order": 7, "items": ["a", "b"] }));
            then.status(200).body("other-service-response");
        })
        .await;

    let (handle, base) = spawn_relay(&upstreams.config()).await;
    let response = build_reqwest_client()
        .post(format!("{}/other/7", base))
        .json(&json!({ "order": 7, "items": ["a", "b"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "other-service-response");
    other.assert_async().await;
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn upstream_failure_maps_to_generic_500() {
    let upstreams = Upstreams::start().await;
    upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST).path("/token/42");
            then.status(200).body(r#"{"token":"T"}"#);
        })
        .await;
    upstreams
        .other
        .mock_async(|when, then| {
            when.method(POST).path("/ingest");
            then.status(500).body("database exploded");
        })
        .await;

    let (handle, base) = spawn_relay(&upstreams.config()).await;
    let response = build_reqwest_client()
        .post(format!("{}/other/42", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_server_error());
    let body = response.text().await.unwrap();
    assert_eq!(body, "500 Internal Server Error from POST /other/42");
    assert!(!body.contains("database exploded"));
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn token_failure_skips_upstream_and_is_retried_next_call() {
    let upstreams = Upstreams::start().await;
    let mut auth_down = upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST).path("/token/42");
            then.status(503);
        })
        .await;
    let application = upstreams
        .application
        .mock_async(|when, then| {
            when.method(GET).path("/data");
            then.status(200).body("application-response");
        })
        .await;

    let (handle, base) = spawn_relay(&upstreams.config()).await;
    let client = build_reqwest_client();

    let response = client.get(format!("{}/fetch/42", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.text().await.unwrap(),
        "500 Internal Server Error from GET /fetch/42"
    );
    application.assert_hits_async(0).await;

    // authorization recovers, the empty cache fetches again
    auth_down.delete_async().await;
    let auth_up = upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST).path("/token/42");
            then.status(200).body(r#"{"token":"T"}"#);
        })
        .await;

    let response = client.get(format!("{}/fetch/42", base)).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    auth_up.assert_hits_async(1).await;
    application.assert_hits_async(1).await;
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inbound_calls_share_one_token_fetch() {
    let upstreams = Upstreams::start().await;
    let auth = upstreams
        .auth
        .mock_async(|when, then| {
            when.method(POST).path("/token/42");
            then.status(200)
                .delay(std::time::Duration::from_millis(200))
                .body(r#"{"token":"T"}"#);
        })
        .await;
    upstreams
        .application
        .mock_async(|when, then| {
            when.method(GET).path("/data").header("authorization", "Bearer T");
            then.status(200).body("application-response");
        })
        .await;

    let (handle, base) = spawn_relay(&upstreams.config()).await;
    let client = build_reqwest_client();

    let calls = (0..20).map(|_| {
        let client = client.clone();
        let url = format!("{}/fetch/42", base);
        tokio::spawn(async move { client.get(url).send().await.unwrap().status() })
    });
    for status in futures::future::join_all(calls).await {
        assert_eq!(status.unwrap(), StatusCode::OK);
    }

    auth.assert_hits_async(1).await;
    handle.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn metrics_route_exposes_relay_counters() {
    let upstreams = Upstreams::start().await;
    let (handle, base) = spawn_relay(&upstreams.config()).await;

    let response = build_reqwest_client()
        .get(format!("{}/metrics", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("tokenrelay_up"));
    handle.abort();
}

}
