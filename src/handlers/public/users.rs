// handlers/public/users.rs - POST /api/v1/users/register, POST /api/v1/users/login

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use serde_json::json;
use std::net::SocketAddr;

use crate::api::ValidatedJson;
use crate::app::AppState;
use crate::database::models::{LoginRequest, RegisterUser};
use crate::middleware::{ApiResponse, ApiResult};

pub async fn register_post(State(state): State<AppState>, ValidatedJson(body): ValidatedJson<RegisterUser>) -> ApiResult {
    let (tenant_id, input) = body.into_parts();
    let user = state.users.register(tenant_id, input).await?;
    Ok(ApiResponse::created("User registered successfully").with("user", user))
}

/// Authenticate with email and password and receive a bearer token.
pub async fn login_post(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult {
    let client_ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let outcome = state.users.login(&body.email, &body.password, client_ip).await?;

    Ok(ApiResponse::ok("Login successful")
        .with("token", outcome.token)
        .with(
            "user",
            json!({
                "id": outcome.user.id,
                "name": outcome.user.name,
                "email": outcome.user.email,
                "role": outcome.user.role,
                "tenant": outcome.tenant.name,
            }),
        ))
}

/// First `X-Forwarded-For` hop, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
