//! Authentication Pipeline
//! Mission: One verification entry point for every protected resource handler

use crate::auth::token::{TokenError, TokenIssuer};
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    MalformedToken,
    InvalidSignature,
    UnknownUser,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingToken => "missing bearer token",
            RejectReason::MalformedToken => "malformed token",
            RejectReason::InvalidSignature => "invalid token signature",
            RejectReason::UnknownUser => "user not found",
        }
    }
}

/// Discriminated result of authentication. Handlers branch on this before
/// performing any mutation.
#[derive(Debug)]
pub enum AuthOutcome {
    Authenticated(Uuid),
    Unauthenticated(RejectReason),
    Failed(Error),
}

impl AuthOutcome {
    /// Collapse into a `Result` for call sites that just want to gate.
    pub fn require(self) -> Result<Uuid> {
        match self {
            AuthOutcome::Authenticated(id) => Ok(id),
            AuthOutcome::Unauthenticated(reason) => Err(Error::Unauthorized(reason.as_str())),
            AuthOutcome::Failed(err) => Err(err),
        }
    }
}

/// Composes token verification with a user-existence check.
pub struct AuthPipeline {
    issuer: Arc<TokenIssuer>,
    store: DocumentStore,
}

impl AuthPipeline {
    pub fn new(issuer: Arc<TokenIssuer>, store: DocumentStore) -> Self {
        Self { issuer, store }
    }

    /// Resolve a bearer value to a user id. Pure with respect to the store:
    /// nothing is written on any path.
    pub fn authenticate(&self, bearer: Option<&str>) -> AuthOutcome {
        let token = match bearer {
            Some(token) => token,
            None => return AuthOutcome::Unauthenticated(RejectReason::MissingToken),
        };
        let id = match self.issuer.verify(token) {
            Ok(id) => id,
            Err(TokenError::Malformed) => {
                return AuthOutcome::Unauthenticated(RejectReason::MalformedToken)
            }
            Err(TokenError::InvalidSignature) => {
                return AuthOutcome::Unauthenticated(RejectReason::InvalidSignature)
            }
        };
        // The embedded id must still resolve to a live user.
        match self.store.has("users", &id.to_string()) {
            Ok(true) => AuthOutcome::Authenticated(id),
            Ok(false) => AuthOutcome::Unauthenticated(RejectReason::UnknownUser),
            Err(err) => AuthOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialStore;
    use crate::auth::hash::HashStrategy;
    use tempfile::NamedTempFile;

    fn create_test_pipeline() -> (AuthPipeline, Arc<TokenIssuer>, CredentialStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = DocumentStore::open(temp_file.path().to_str().unwrap()).unwrap();
        let issuer = Arc::new(TokenIssuer::new("test-secret"));
        let credentials = CredentialStore::new(store.clone(), HashStrategy::Bcrypt { cost: 4 });
        let pipeline = AuthPipeline::new(issuer.clone(), store);
        (pipeline, issuer, credentials, temp_file)
    }

    #[test]
    fn test_authenticates_existing_user() {
        let (pipeline, issuer, credentials, _temp) = create_test_pipeline();
        let user = credentials.register("alice", "hunter22").unwrap();
        let token = issuer.issue(&user.id).unwrap();

        match pipeline.authenticate(Some(&token)) {
            AuthOutcome::Authenticated(id) => assert_eq!(id, user.id),
            other => panic!("expected authentication, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_missing_and_malformed() {
        let (pipeline, _issuer, _credentials, _temp) = create_test_pipeline();

        assert!(matches!(
            pipeline.authenticate(None),
            AuthOutcome::Unauthenticated(RejectReason::MissingToken)
        ));
        assert!(matches!(
            pipeline.authenticate(Some("garbage")),
            AuthOutcome::Unauthenticated(RejectReason::MalformedToken)
        ));
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let (pipeline, _issuer, credentials, _temp) = create_test_pipeline();
        let user = credentials.register("alice", "hunter22").unwrap();
        let foreign = TokenIssuer::new("other-secret").issue(&user.id).unwrap();

        assert!(matches!(
            pipeline.authenticate(Some(&foreign)),
            AuthOutcome::Unauthenticated(RejectReason::InvalidSignature)
        ));
    }

    #[test]
    fn test_rejects_unknown_subject() {
        let (pipeline, issuer, _credentials, _temp) = create_test_pipeline();
        let ghost = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"ghost");
        let token = issuer.issue(&ghost).unwrap();

        assert!(matches!(
            pipeline.authenticate(Some(&token)),
            AuthOutcome::Unauthenticated(RejectReason::UnknownUser)
        ));
        assert!(matches!(
            pipeline.authenticate(Some(&token)).require().unwrap_err(),
            Error::Unauthorized(_)
        ));
    }
}
