//! User Endpoints
//! Mission: Profile reads and owner-only profile mutation

use crate::api::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{Error, Result};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// GET /users/:id
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let view = state
        .credentials
        .get_view(&id)?
        .ok_or(Error::NotFound("user"))?;
    Ok(Json(json!({ "user": view })))
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdate {
    pub image: Option<String>,
    pub description: Option<String>,
}

/// PATCH /users/:id — only the owner may edit their profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileUpdate>,
) -> Result<Json<Value>> {
    if actor != id {
        return Err(Error::Forbidden);
    }
    let view =
        state
            .credentials
            .update_profile(&id, req.image.as_deref(), req.description.as_deref())?;
    Ok(Json(json!({ "user": view, "message": "profile updated" })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub password: String,
}

/// POST /users/:id/password — owner-only credential replacement.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<PasswordChange>,
) -> Result<Json<Value>> {
    if actor != id {
        return Err(Error::Forbidden);
    }
    state.credentials.change_password(&id, &req.password)?;
    Ok(Json(json!({ "message": "password changed" })))
}
