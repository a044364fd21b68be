//! Comment Endpoints
//! Mission: Threaded comments under posts, with soft deletion

use crate::api::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{Error, Result};
use crate::store::Patch;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const COMMENTS: &str = "comments";
const DELETED_BODY: &str = "[deleted]";

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub body: String,
    #[serde(default)]
    pub parent_comment_id: Option<String>,
}

/// PUT /comments/:post_id
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(post_id): Path<String>,
    Json(req): Json<NewComment>,
) -> Result<(StatusCode, Json<Value>)> {
    if req.body.trim().is_empty() {
        return Err(Error::InvalidInput("comment body is required".into()));
    }
    if !state.store.has("posts", &post_id)? {
        return Err(Error::NotFound("post"));
    }

    let id = Uuid::new_v4().to_string();
    let comment = json!({
        "body": req.body,
        "user": actor,
        "post_id": post_id,
        "parent_comment_id": req.parent_comment_id,
        "deleted": false,
        "date": Utc::now().timestamp_millis(),
    });
    state.store.create(COMMENTS, &id, comment)?;

    let mut comment = state
        .store
        .get(COMMENTS, &id)?
        .ok_or(Error::NotFound("comment"))?;
    hydrate_author(&state, &mut comment)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "comment": comment, "message": "comment created" })),
    ))
}

/// GET /comments/:post_id
pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let mut comments = state
        .store
        .get_many_by(COMMENTS, "post_id", json!(post_id))?;
    for comment in &mut comments {
        hydrate_author(&state, comment)?;
    }
    Ok(Json(json!({ "comments": comments })))
}

/// GET /comments/:post_id/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path((_post_id, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let mut comment = state
        .store
        .get(COMMENTS, &id)?
        .ok_or(Error::NotFound("comment"))?;
    hydrate_author(&state, &mut comment)?;
    Ok(Json(json!({ "comment": comment })))
}

#[derive(Debug, Deserialize)]
pub struct CommentUpdate {
    pub body: String,
}

/// PATCH /comments/:post_id/:id — only the author may edit.
pub async fn edit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path((_post_id, id)): Path<(String, String)>,
    Json(req): Json<CommentUpdate>,
) -> Result<Json<Value>> {
    if req.body.trim().is_empty() {
        return Err(Error::InvalidInput("comment body is required".into()));
    }
    let comment = state
        .store
        .get(COMMENTS, &id)?
        .ok_or(Error::NotFound("comment"))?;
    check_owner(&comment, &actor)?;

    let patch = Patch::new()
        .set("body", req.body)
        .set("edited", Utc::now().timestamp_millis());
    state.store.update(COMMENTS, &id, &patch, false)?;

    let mut comment = state
        .store
        .get(COMMENTS, &id)?
        .ok_or(Error::NotFound("comment"))?;
    hydrate_author(&state, &mut comment)?;
    Ok(Json(json!({ "comment": comment, "message": "comment updated" })))
}

/// DELETE /comments/:post_id/:id — soft delete: the record stays so the
/// thread keeps its shape, but body and author are masked.
pub async fn remove(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path((_post_id, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let comment = state
        .store
        .get(COMMENTS, &id)?
        .ok_or(Error::NotFound("comment"))?;
    check_owner(&comment, &actor)?;

    let patch = Patch::new()
        .set("body", DELETED_BODY)
        .set("deleted", true)
        .set("user", Value::Null);
    state.store.update(COMMENTS, &id, &patch, false)?;

    Ok(Json(json!({ "message": "comment deleted" })))
}

fn check_owner(comment: &Value, actor: &Uuid) -> Result<()> {
    if comment["user"] == json!(actor) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Replace the stored author id with the stripped user view. Deleted
/// comments keep their null author.
fn hydrate_author(state: &AppState, comment: &mut Value) -> Result<()> {
    if comment["deleted"] == json!(true) {
        return Ok(());
    }
    let author_id = comment["user"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok());
    if let Some(author_id) = author_id {
        if let Some(view) = state.credentials.get_view(&author_id)? {
            comment["user"] = json!(view);
        }
    }
    Ok(())
}
