use http::StatusCode;
use thiserror::Error;

use crate::forwarder::target::UpstreamTarget;
use crate::utils::constants::MAX_ERROR_BODY_CHARS;

/// Failure of the authorization exchange.
///
/// `Clone` because one in-flight fetch hands the same outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Non-2xx answer, connection failure or timeout. `status` is `None`
    /// when no response was received.
    #[error("authorization endpoint rejected the exchange (status: {status:?}): {reason}")]
    RemoteRejected {
        status: Option<StatusCode>,
        reason: String,
    },
    #[error("authorization response carries no token: {reason}")]
    MalformedResponse { reason: String },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::RemoteRejected { status, .. } => *status,
            FetchError::MalformedResponse { .. } => None,
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::RemoteRejected { .. } => "remote_rejected",
            FetchError::MalformedResponse { .. } => "malformed_response",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// No upstream call was attempted.
    #[error("token unavailable: {0}")]
    TokenUnavailable(#[from] FetchError),
    #[error("upstream '{target}' failed (status: {status:?}): {reason}")]
    UpstreamFailed {
        target: UpstreamTarget,
        status: Option<StatusCode>,
        reason: String,
    },
}

impl ForwardError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ForwardError::TokenUnavailable(fetch_error) => fetch_error.status(),
            ForwardError::UpstreamFailed { status, .. } => *status,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::TokenUnavailable(_) => "token_unavailable",
            ForwardError::UpstreamFailed { .. } => "upstream_failed",
        }
    }
}

/// Failure reported by the outbound transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("remote answered {status}")]
    Status { status: StatusCode, body: String },
    #[error("connection failed: {reason}")]
    Connection { reason: String },
}

impl TransportError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Connection { .. } => None,
        }
    }

    /// Failure reason carried into fetch and forward errors. Keeps the head
    /// of a non-empty response body.
    pub fn reason(&self) -> String {
        match self {
            TransportError::Status { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    format!("remote answered {status}")
                } else if body.chars().count() > MAX_ERROR_BODY_CHARS {
                    let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
                    format!("remote answered {status}: {head}...")
                } else {
                    format!("remote answered {status}: {body}")
                }
            }
            TransportError::Connection { reason } => reason.clone(),
        }
    }
}
