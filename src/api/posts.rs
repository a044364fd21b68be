//! Post Endpoints
//! Mission: Post creation, cursor-paginated listing, and owner-only edits

use crate::api::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{Error, Result};
use crate::store::{Cursor, Patch, MAX_PAGE_SIZE};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

const POSTS: &str = "posts";

#[derive(Debug, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// PUT /posts
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Json(req): Json<NewPost>,
) -> Result<(StatusCode, Json<Value>)> {
    if req.title.trim().is_empty() {
        return Err(Error::InvalidInput("post title is required".into()));
    }
    let author = state
        .credentials
        .get_view(&actor)?
        .ok_or(Error::NotFound("user"))?;

    let id = Uuid::new_v4().to_string();
    let post = json!({
        // Denormalized author view; credential-free by construction
        "user": { "id": author.id, "username": author.username, "image": author.image },
        "title": req.title,
        "body": req.body,
        "image": req.image,
        "date": Utc::now().timestamp_millis(),
        "edited": false,
    });
    state.store.create(POSTS, &id, post)?;

    let post = state.store.get(POSTS, &id)?.ok_or(Error::NotFound("post"))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "post": post, "message": "post created" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub last: Option<i64>,
    pub limit: Option<usize>,
}

/// GET /posts?last=<date>&limit=<n> — pages walk the `date` key descending.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<Json<Value>> {
    let cursor = Cursor {
        key: "date".to_string(),
        value: json!(query.last.unwrap_or(i64::MAX)),
    };
    let page = state
        .store
        .get_paginated(POSTS, query.limit.unwrap_or(MAX_PAGE_SIZE), &cursor)?;
    Ok(Json(
        json!({ "posts": page.documents, "loadedAll": page.loaded_all }),
    ))
}

/// GET /posts/:id
pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    let post = state.store.get(POSTS, &id)?.ok_or(Error::NotFound("post"))?;
    Ok(Json(json!({ "post": post })))
}

#[derive(Debug, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
}

/// PATCH /posts/:id — only the author may edit.
pub async fn edit(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(actor)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(req): Json<PostUpdate>,
) -> Result<Json<Value>> {
    let post = state.store.get(POSTS, &id)?.ok_or(Error::NotFound("post"))?;
    if post["user"]["id"] != json!(actor) {
        return Err(Error::Forbidden);
    }

    let mut patch = Patch::new().set("edited", true);
    if let Some(title) = req.title {
        patch = patch.set("title", title);
    }
    if let Some(body) = req.body {
        patch = patch.set("body", body);
    }
    if let Some(image) = req.image {
        patch = patch.set("image", image);
    }
    state.store.update(POSTS, &id, &patch, false)?;

    let post = state.store.get(POSTS, &id)?.ok_or(Error::NotFound("post"))?;
    Ok(Json(json!({ "post": post, "message": "post updated" })))
}
