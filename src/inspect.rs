use livekit_api::access_token::{AccessTokenError, Claims, TokenVerifier};
use serde::Serialize;

use crate::signer::SigningKeys;

/// The parts of an issued token worth showing to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSummary {
    pub identity: String,
    pub name: String,
    pub room: String,
    pub room_join: bool,
    pub ttl_seconds: usize,
}

impl From<Claims> for TokenSummary {
    fn from(claims: Claims) -> Self {
        Self {
            identity: claims.sub,
            name: claims.name,
            room: claims.video.room,
            room_join: claims.video.room_join,
            ttl_seconds: claims.exp.saturating_sub(claims.nbf),
        }
    }
}

/// Verifies `token` against `keys` and summarizes its claims.
pub fn inspect_token(keys: &SigningKeys, token: &str) -> Result<TokenSummary, AccessTokenError> {
    let claims = TokenVerifier::with_api_key(&keys.api_key, &keys.api_secret).verify(token)?;
    Ok(claims.into())
}
