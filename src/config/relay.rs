use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::forwarder::target::UpstreamEndpoints;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub client: ClientConfig,
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Credential presented to the authorization endpoint
#[derive(Deserialize, Clone)]
pub struct ClientConfig {
    pub api_key: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig").field("api_key", &"***").finish()
    }
}

/// ================================
/// Outbound endpoints
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    /// may contain an `{id}` placeholder for the caller identifier
    pub authorization_url: String,
    pub application_url: String,
    pub other_url: String,
}

impl EndpointsConfig {
    pub fn upstreams(&self) -> UpstreamEndpoints {
        UpstreamEndpoints {
            application_url: self.application_url.to_owned(),
            other_url: self.other_url.to_owned(),
        }
    }
}
