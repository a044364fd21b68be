//! Auth Endpoints
//! Mission: Signup and login, returning a bearer token plus the user view

use crate::api::AppState;
use crate::auth::models::{AuthResponse, CredentialsRequest};
use crate::error::Result;
use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

/// PUT /auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = state.credentials.register(&req.username, &req.password)?;
    let token = state.issuer.issue(&user.id)?;
    info!("signup successful: {}", user.username);
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state.credentials.login(&req.username, &req.password)?;
    let token = state.issuer.issue(&user.id)?;
    info!("login successful: {}", user.username);
    Ok(Json(AuthResponse { token, user }))
}
