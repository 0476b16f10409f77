//! HTTP surface of the issuer.
//!
//! Invocations use the callable envelope: the payload is sent as
//! `{"data": {...}}` and answered with `{"result": ...}` or
//! `{"error": {"status": ..., "message": ...}}`.
//!
//! The caller identity is read from headers set by the fronting gateway
//! after it authenticated the request. The body is never consulted for it.
//! Those headers are only trusted when the request also presents the
//! configured gateway secret, otherwise it is rejected as unauthenticated.
//! A request without any caller header is served with the guest identity.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::caller::{CallerContext, TokenRequest};
use crate::config::GatewaySecret;
use crate::issuer::TokenIssuer;

pub const TOKEN_PATH: &str = "/retrieveLiveKitToken";
pub const HEALTH_PATH: &str = "/healthz";

pub const CALLER_UID_HEADER: &str = "x-caller-uid";
pub const CALLER_EMAIL_HEADER: &str = "x-caller-email";
pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

#[derive(Clone)]
pub struct AppState {
    pub issuer: TokenIssuer,
    pub gateway_secret: Option<GatewaySecret>,
}

#[derive(Debug, Deserialize)]
struct CallableRequest {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CallableResponse {
    result: String,
}

#[derive(Debug, Serialize)]
struct CallableErrorBody {
    error: CallableErrorStatus,
}

#[derive(Debug, Serialize)]
struct CallableErrorStatus {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug)]
enum CallableError {
    InvalidArgument,
    Unauthenticated,
    Internal,
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            CallableError::InvalidArgument => (
                StatusCode::BAD_REQUEST,
                CallableErrorStatus {
                    status: "INVALID_ARGUMENT",
                    message: "Bad Request",
                },
            ),
            CallableError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                CallableErrorStatus {
                    status: "UNAUTHENTICATED",
                    message: "Unauthenticated",
                },
            ),
            // The cause stays in the logs, callers only learn that it failed.
            CallableError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                CallableErrorStatus {
                    status: "INTERNAL",
                    message: "INTERNAL",
                },
            ),
        };
        (status, Json(CallableErrorBody { error })).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(TOKEN_PATH, post(retrieve_token))
        .route(HEALTH_PATH, get(health))
        .with_state(state)
}

/// Reads the platform-injected caller identity.
///
/// Returns `None` when neither header carries a value.
pub fn caller_from_headers(headers: &HeaderMap) -> Option<CallerContext> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    CallerContext::from_parts(header(CALLER_EMAIL_HEADER), header(CALLER_UID_HEADER))
}

/// Returns the caller identity if the gateway vouched for it.
///
/// Caller headers without a matching [`GATEWAY_SECRET_HEADER`] are rejected,
/// also when no secret is configured at all.
fn authorized_caller(
    gateway_secret: Option<&GatewaySecret>,
    headers: &HeaderMap,
) -> Result<Option<CallerContext>, CallableError> {
    let caller = match caller_from_headers(headers) {
        Some(caller) => caller,
        None => return Ok(None),
    };

    let presented = headers
        .get(GATEWAY_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    match (gateway_secret, presented) {
        (Some(secret), Some(presented)) if secret.matches(presented) => Ok(Some(caller)),
        (None, _) => {
            log::warn!("authorized_caller: caller headers sent but no gateway secret configured");
            Err(CallableError::Unauthenticated)
        }
        _ => {
            log::warn!("authorized_caller: caller headers without a valid gateway secret");
            Err(CallableError::Unauthenticated)
        }
    }
}

fn parse_request(body: &[u8]) -> Result<TokenRequest, CallableError> {
    let envelope: CallableRequest = serde_json::from_slice(body).map_err(|e| {
        log::warn!("parse_request: malformed callable body: {e}");
        CallableError::InvalidArgument
    })?;

    match envelope.data {
        Some(data @ serde_json::Value::Object(_)) => {
            serde_json::from_value(data).map_err(|e| {
                log::warn!("parse_request: malformed data: {e}");
                CallableError::InvalidArgument
            })
        }
        // Missing, null or scalar data carries no room name, it is served
        // like `{}` instead of failing.
        _ => Ok(TokenRequest::default()),
    }
}

async fn retrieve_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallableResponse>, CallableError> {
    let caller = authorized_caller(state.gateway_secret.as_ref(), &headers)?;
    let request = parse_request(&body)?;
    if caller.is_none() {
        log::debug!("retrieve_token: no caller context, using guest identity");
    }

    match state.issuer.issue(caller.as_ref(), &request) {
        Ok(token) => Ok(Json(CallableResponse { result: token })),
        Err(e) => {
            sentry_utils::report_failure("Token issuance failed", &e);
            Err(CallableError::Internal)
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
