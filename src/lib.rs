//! # Token Relay Library
//!
//! Obtains a bearer token from an authorization endpoint, caches it in a
//! single shared slot, and forwards caller requests to upstream services
//! with the token attached.
//!
//! Modules:
//! - `config`: service configuration, loading and validation
//! - `cache`: token type and the single-flight token cache
//! - `sources`: authorization exchange (token fetcher)
//! - `parser`: extracting the token from the authorization response
//! - `transport`: outbound HTTP capability
//! - `forwarder`: authenticated forwarding to the upstreams
//! - `server`: inbound routes (`GET /fetch/{id}`, `POST /other/{id}`)

pub mod config;
pub mod cache;
pub mod errors;
pub mod sources;
pub mod parser;
pub mod transport;
pub mod forwarder;
pub mod observability;
pub mod server;
pub mod utils;
#[cfg(test)]
pub mod tests;


pub use crate::cache::token::Token;
pub use crate::cache::token_cache::TokenCache;
pub use crate::config::relay::ServiceConfig;
pub use crate::errors::{FetchError, ForwardError, TransportError};
pub use crate::forwarder::{AuthenticatedForwarder, UpstreamTarget};
pub use crate::sources::{HttpTokenFetcher, TokenFetcher};
