//! Authentication Middleware
//! Mission: Gate mutating routes on the authentication pipeline

use crate::auth::pipeline::{AuthOutcome, AuthPipeline};
use crate::error::Error;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

/// The authenticated subject, injected into request extensions for handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

/// Runs the pipeline on the `Authorization: Bearer` header and rejects with
/// 401 before any handler code executes.
pub async fn auth_middleware(
    State(pipeline): State<Arc<AuthPipeline>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Error> {
    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    match pipeline.authenticate(bearer) {
        AuthOutcome::Authenticated(id) => {
            req.extensions_mut().insert(AuthenticatedUser(id));
            Ok(next.run(req).await)
        }
        AuthOutcome::Unauthenticated(reason) => Err(Error::Unauthorized(reason.as_str())),
        AuthOutcome::Failed(err) => Err(err),
    }
}
