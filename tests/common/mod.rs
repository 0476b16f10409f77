use std::sync::Arc;

use room_token::callable::{build_router, AppState};
use room_token::config::GatewaySecret;
use room_token::issuer::TokenIssuer;
use room_token::signer::{LiveKitSigner, SigningKeys};

pub const API_KEY: &str = "APIintegrationkey";
pub const API_SECRET: &str = "integration-secret-that-is-long-enough-for-hs256";
pub const GATEWAY_SECRET: &str = "integration-gateway-secret";

fn gateway_secret() -> Option<GatewaySecret> {
    GatewaySecret::new(GATEWAY_SECRET)
}

pub fn router_with_keys() -> axum::Router {
    let keys = SigningKeys {
        api_key: API_KEY.to_string(),
        api_secret: API_SECRET.to_string(),
    };
    build_router(AppState {
        issuer: TokenIssuer::new(Arc::new(LiveKitSigner::new(keys))),
        gateway_secret: gateway_secret(),
    })
}

pub fn router_without_keys() -> axum::Router {
    build_router(AppState {
        issuer: TokenIssuer::new(Arc::new(LiveKitSigner::unconfigured())),
        gateway_secret: gateway_secret(),
    })
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
