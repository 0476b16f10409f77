use std::fmt;
use std::net::SocketAddr;

use crate::signer::SigningKeys;

pub const API_KEY_VAR: &str = "LIVEKIT_API_KEY";
pub const API_SECRET_VAR: &str = "LIVEKIT_API_SECRET";
pub const BIND_VAR: &str = "ROOM_TOKEN_BIND";
pub const SENTRY_DSN_VAR: &str = "SENTRY_DSN";
pub const GATEWAY_SECRET_VAR: &str = "ROOM_TOKEN_GATEWAY_SECRET";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bind address {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Shared secret the authenticating gateway presents with every request that
/// carries caller headers.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewaySecret(String);

impl GatewaySecret {
    /// Returns `None` for an empty value.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return None;
        }
        Some(Self(secret))
    }

    pub fn matches(&self, presented: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), presented.as_bytes())
    }
}

impl fmt::Debug for GatewaySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GatewaySecret(<redacted>)")
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    pub bind_addr: SocketAddr,
    /// `None` when either key is unset, the service still runs but every
    /// invocation fails.
    pub signing_keys: Option<SigningKeys>,
    pub sentry_dsn: Option<String>,
    /// `None` when unset, caller headers are then never trusted and only
    /// guest tokens are issued.
    pub gateway_secret: Option<GatewaySecret>,
}

impl IssuerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_value = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_bind_addr(&bind_value)?;
        let signing_keys = SigningKeys::from_parts(lookup(API_KEY_VAR), lookup(API_SECRET_VAR));
        let sentry_dsn = lookup(SENTRY_DSN_VAR).filter(|dsn| !dsn.is_empty());
        let gateway_secret = lookup(GATEWAY_SECRET_VAR).and_then(GatewaySecret::new);

        Ok(Self {
            bind_addr,
            signing_keys,
            sentry_dsn,
            gateway_secret,
        })
    }
}

pub fn parse_bind_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidBindAddr {
            value: value.to_string(),
            source,
        })
}
