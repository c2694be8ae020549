use std::sync::LazyLock;
use std::{fs, path::Path};
use crate::config::settings::{LogFormat, LoggingConfig, TimeoutConfig};
use crate::config::relay::ServiceConfig;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_FORWARD_TIMEOUT_MS};
use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};
use crate::config::proc_validator;

/// `${VAR}` or `${VAR:default}`; a default may hold `{name}` placeholders
static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(\w+)(?::((?:[^{}]|\{\w+\})+))?\}").expect("env var pattern is valid")
});

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow!("cannot read config {}: {}", path.display(), e))?;

    let expanded = expand_env_vars(&content);
    parse_config(expanded).await
}

pub async fn parse_config(content: String) -> Result<ServiceConfig> {
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_parse_failures.inc();
        })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    let timeouts = service_config.settings.timeouts.get_or_insert(TimeoutConfig {
        fetch_ms: None,
        forward_ms: None,
    });
    timeouts.fetch_ms.get_or_insert(DEFAULT_FETCH_TIMEOUT_MS);
    timeouts.forward_ms.get_or_insert(DEFAULT_FORWARD_TIMEOUT_MS);

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| anyhow!("invalid config:\n  - {}", errors.join("\n  - ")))?;

    Ok(service_config)
}

fn expand_env_vars(input: &str) -> String {
    ENV_VAR.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
