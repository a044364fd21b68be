//! API Module
//! Mission: Thin HTTP glue over the core components

pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;
pub mod votes;

use crate::auth::{auth_middleware, AuthPipeline, CredentialStore, TokenIssuer};
use crate::service::AppService;
use crate::store::DocumentStore;
use crate::votes::VoteLedger;
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: DocumentStore,
    pub credentials: CredentialStore,
    pub issuer: Arc<TokenIssuer>,
    pub pipeline: Arc<AuthPipeline>,
    pub ledger: VoteLedger,
}

impl AppState {
    pub fn from_service(service: &AppService) -> Self {
        Self {
            store: service.store(),
            credentials: service.credentials(),
            issuer: service.issuer(),
            pipeline: service.pipeline(),
            ledger: service.ledger(),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the full router. Every mutating route sits behind the
/// authentication middleware; reads and the auth endpoints do not.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users/:id", patch(users::update_profile))
        .route("/users/:id/password", post(users::change_password))
        .route("/posts", put(posts::create))
        .route("/posts/:id", patch(posts::edit))
        .route("/comments/:post_id", put(comments::create))
        .route(
            "/comments/:post_id/:id",
            patch(comments::edit).delete(comments::remove),
        )
        .route("/votes/:id", patch(votes::apply))
        .layer(middleware::from_fn_with_state(
            state.pipeline.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", put(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/users/:id", get(users::get_profile))
        .route("/posts", get(posts::list))
        .route("/posts/:id", get(posts::get_one))
        .route("/comments/:post_id", get(comments::list))
        .route("/comments/:post_id/:id", get(comments::get_one))
        .route("/votes/:id", get(votes::tally))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
