//! Shared constants and invariants

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_FORWARD_TIMEOUT_MS: u64 = 10000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;

/// replaced by the caller identifier in the authorization url
pub const IDENTIFIER_PLACEHOLDER: &str = "{id}";

/// response body kept in failure reasons
pub const MAX_ERROR_BODY_CHARS: usize = 256;
