pub mod callable;
pub mod caller;
pub mod config;
pub mod inspect;
pub mod issuer;
pub mod signer;

use std::future::Future;
use std::sync::Arc;

use callable::{build_router, AppState};
use config::IssuerConfig;
use issuer::TokenIssuer;
use signer::LiveKitSigner;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Builds the issuer for the configured keys.
///
/// Missing keys are not fatal here, the issuer is still returned and fails
/// each invocation instead.
pub fn build_issuer(config: &IssuerConfig) -> TokenIssuer {
    let signer = LiveKitSigner::from_keys(config.signing_keys.clone());
    if !signer.is_configured() {
        log::warn!(
            "build_issuer: {} or {} is not set, every invocation will fail",
            config::API_KEY_VAR,
            config::API_SECRET_VAR
        );
    }
    TokenIssuer::new(Arc::new(signer))
}

/// Serves the callable endpoint until `shutdown` resolves.
pub async fn serve<F>(config: IssuerConfig, shutdown: F) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if config.gateway_secret.is_none() {
        log::warn!(
            "serve: {} is not set, requests with caller headers will be rejected",
            config::GATEWAY_SECRET_VAR
        );
    }
    let state = AppState {
        issuer: build_issuer(&config),
        gateway_secret: config.gateway_secret.clone(),
    };
    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    log::info!("serve: listening on {addr}");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("serve: stopped");
    Ok(())
}
