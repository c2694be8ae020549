//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - client credential present
//! - endpoint URLs are http(s), `{id}` placeholder only in the authorization URL
//! - server / metrics / logging / timeout invariants

use tracing::{error, info};

use crate::config::relay::{EndpointsConfig, ServiceConfig};
use crate::config::settings::{SettingsConfig, TimeoutConfig};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::IDENTIFIER_PLACEHOLDER;
use anyhow::Result;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.client.api_key.trim().is_empty() {
        errors.push("client.api_key cannot be empty".to_string());
    }

    validate_endpoints(&cfg.endpoints, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// ENDPOINTS VALIDATION
fn validate_endpoints(endpoints: &EndpointsConfig, errors: &mut Vec<String>) {
    let urls = [
        ("endpoints.authorization_url", &endpoints.authorization_url),
        ("endpoints.application_url", &endpoints.application_url),
        ("endpoints.other_url", &endpoints.other_url),
    ];
    for (path, url) in urls {
        validate_url(path, url, errors);
    }

    // the upstream calls carry no identifier
    for (path, url) in &urls[1..] {
        if url.contains(IDENTIFIER_PLACEHOLDER) {
            errors.push(format!(
                "{} '{}' must not contain '{}'; only the authorization url is templated",
                path, url, IDENTIFIER_PLACEHOLDER
            ));
        }
    }
}

fn validate_url(path: &str, url: &str, errors: &mut Vec<String>) {
    if url.trim().is_empty() {
        errors.push(format!("{} cannot be empty", path));
        return;
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!("{} '{}' must start with http:// or https://", path, url));
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.is_empty() {
        errors.push(format!(
            "settings.server.host '{}' must be valid",
            settings.server.host
        ));
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            settings.server.port
        ));
    }

    // metrics endpoint start with '/'
    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && (metrics.path.starts_with("/fetch/") || metrics.path.starts_with("/other/")) {
        errors.push(format!(
            "settings.metrics.path '{}' collides with the relay routes",
            metrics.path
        ));
    }

    if let Some(timeouts) = &settings.timeouts {
        validate_timeouts(timeouts, errors);
    }

    // logging level
    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_timeouts(timeouts: &TimeoutConfig, errors: &mut Vec<String>) {
    if timeouts.fetch_ms == Some(0) {
        errors.push("settings.timeouts.fetch_ms must be greater than 0".to_string());
    }
    if timeouts.forward_ms == Some(0) {
        errors.push("settings.timeouts.forward_ms must be greater than 0".to_string());
    }
}
