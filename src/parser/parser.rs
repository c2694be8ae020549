use std::sync::LazyLock;

use http::HeaderValue;
use regex::Regex;
use tracing::warn;

use crate::cache::token::Token;
use crate::errors::FetchError;

/// `"token":"<value>"`, whitespace around the colon tolerated
static TOKEN_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""token"\s*:\s*"([^"]+)""#).expect("token field pattern is valid")
});

/// Extract the token value from an authorization response body.
///
/// Works on the raw text, so the field is found whether it sits at the top
/// level or inside an envelope. The first match wins.
///
/// A value that cannot travel in an `Authorization` header is malformed,
/// so it is never cached.
pub fn extract_token(body: &str) -> Result<Token, FetchError> {
    let value = TOKEN_FIELD
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str())
        .ok_or_else(|| {
            warn!(body_len = body.len(), "authorization response has no token field");
            FetchError::MalformedResponse {
                reason: "no \"token\" string field in response body".to_owned(),
            }
        })?;

    if HeaderValue::from_str(value).is_err() {
        warn!(token_len = value.len(), "token holds characters not allowed in a header");
        return Err(FetchError::MalformedResponse {
            reason: "token is not a valid header value".to_owned(),
        });
    }
    Ok(Token::new(value))
}
