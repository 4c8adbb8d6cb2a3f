//! Access token inspection.
//!
//! Tokens are JWTs issued by the backend. Only the payload is decoded, to
//! read expiry and identity claims; signature checks are the server's job.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is not a three-part JWT")]
    Malformed,

    #[error("Token payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON claims: {0}")]
    Claims(#[from] serde_json::Error),
}

/// Claims read from a token payload
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry as seconds since the Unix epoch
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Any other claims (roles, municipality, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }
}

/// Decode the payload segment of a JWT. A leading `Bearer ` is accepted.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Whether the token is expired at `now`, treating it as expired `leeway`
/// early. Undecodable tokens and tokens without `exp` count as expired.
pub fn is_token_expired(token: &str, now: DateTime<Utc>, leeway: Duration) -> bool {
    match decode_claims(token).map(|c| c.expires_at()) {
        Ok(Some(expires_at)) => now + leeway >= expires_at,
        _ => true,
    }
}

/// Time left before expiry; negative once expired, `None` when unknown
pub fn time_until_expiry(token: &str, now: DateTime<Utc>) -> Option<Duration> {
    let expires_at = decode_claims(token).ok()?.expires_at()?;
    Some(expires_at - now)
}
