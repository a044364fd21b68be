//! Vote Endpoints
//! Mission: Apply vote transitions and expose live tallies

use crate::api::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{Error, Result};
use crate::votes::Vote;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote: i64,
}

/// PATCH /votes/:id — the acting user is the authenticated subject, never a
/// body field.
pub async fn apply(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>> {
    let vote = Vote::from_value(req.vote)?;
    let tally = state
        .ledger
        .apply_vote("posts", &id, &actor, vote)
        .map_err(|err| match err {
            Error::NotFound("resource") => Error::NotFound("post"),
            other => other,
        })?;
    Ok(Json(
        json!({ "tally": tally, "vote": vote.value(), "message": "vote recorded" }),
    ))
}

/// GET /votes/:id
pub async fn tally(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let tally = state.ledger.tally(&id)?;
    Ok(Json(json!({ "tally": tally })))
}
