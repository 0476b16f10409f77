use std::fmt;
use std::time::Duration;

use livekit_api::access_token::{self, AccessTokenError};

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Signing keys are not configured")]
    MissingKeys,
    #[error("Failed to sign access token: {0}")]
    Rejected(#[from] AccessTokenError),
}

/// LiveKit api key pair used to sign access tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKeys {
    pub api_key: String,
    pub api_secret: String,
}

impl SigningKeys {
    /// Returns `None` unless both values are present and non-empty.
    pub fn from_parts(api_key: Option<String>, api_secret: Option<String>) -> Option<Self> {
        match (api_key, api_secret) {
            (Some(api_key), Some(api_secret)) if !api_key.is_empty() && !api_secret.is_empty() => {
                Some(Self {
                    api_key,
                    api_secret,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Everything the signer needs to produce one credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    pub identity: String,
    pub name: String,
    pub ttl: Duration,
    /// Room the credential grants `roomJoin` on.
    pub room: String,
}

/// Produces signed credentials.
///
/// The process builds one signer at startup and shares it between all
/// invocations, so implementations must be thread safe.
pub trait CredentialSigner: Send + Sync {
    fn sign(&self, request: &SigningRequest) -> Result<String, SigningError>;
}

/// Signs LiveKit access tokens with the server sdk.
#[derive(Debug, Clone)]
pub struct LiveKitSigner {
    keys: Option<SigningKeys>,
}

impl LiveKitSigner {
    pub fn new(keys: SigningKeys) -> Self {
        Self { keys: Some(keys) }
    }

    /// A signer without keys, every call fails with [`SigningError::MissingKeys`].
    pub fn unconfigured() -> Self {
        Self { keys: None }
    }

    pub fn from_keys(keys: Option<SigningKeys>) -> Self {
        Self { keys }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }
}

impl CredentialSigner for LiveKitSigner {
    fn sign(&self, request: &SigningRequest) -> Result<String, SigningError> {
        let keys = self.keys.as_ref().ok_or(SigningError::MissingKeys)?;

        let token = access_token::AccessToken::with_api_key(&keys.api_key, &keys.api_secret)
            .with_identity(&request.identity)
            .with_name(&request.name)
            .with_ttl(request.ttl)
            .with_grants(access_token::VideoGrants {
                room_join: true,
                room: request.room.clone(),
                ..Default::default()
            })
            .to_jwt()?;

        Ok(token)
    }
}
