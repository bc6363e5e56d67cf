//! Token issuance and refresh endpoints (unauthenticated)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppResult;

/// Token issue request
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Access + refresh token pair
#[derive(Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Token refresh request
#[derive(Deserialize, ToSchema)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Refreshed access token
#[derive(Serialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access: String,
}

/// Issue an access/refresh token pair for valid credentials
#[utoipa::path(
    post,
    path = "/token",
    tag = "tokens",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token pair issued", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn issue_token(
    State(state): State<crate::AppState>,
    Json(request): Json<TokenRequest>,
) -> AppResult<Json<TokenPairResponse>> {
    let pair = state
        .services
        .auth
        .issue_tokens(&request.username, &request.password)
        .await?;

    Ok(Json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// Exchange a refresh token for a fresh access token
#[utoipa::path(
    post,
    path = "/token/refresh",
    tag = "tokens",
    request_body = TokenRefreshRequest,
    responses(
        (status = 200, description = "Access token refreshed", body = TokenRefreshResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    State(state): State<crate::AppState>,
    Json(request): Json<TokenRefreshRequest>,
) -> AppResult<Json<TokenRefreshResponse>> {
    let access = state.services.auth.refresh_access_token(&request.refresh)?;
    Ok(Json(TokenRefreshResponse { access }))
}
