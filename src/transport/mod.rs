//! Outbound HTTP capability.
//!
//! The relay core never talks to `reqwest` directly: the token fetcher and
//! the forwarder hand an [`UpstreamRequest`] to a [`Transport`] and get the
//! response body back, or a [`TransportError`](crate::errors::TransportError).

pub mod http_client;
pub mod request;

pub use http_client::ReqwestTransport;
pub use request::{Transport, UpstreamRequest, UpstreamResponse};
