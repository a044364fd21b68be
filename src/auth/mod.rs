//! Authentication Module
//! Mission: Credentials, bearer tokens, and the verification pipeline

pub mod credentials;
pub mod hash;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod token;

pub use credentials::CredentialStore;
pub use hash::{CredentialRecord, HashAlgorithm, HashStrategy};
pub use middleware::{auth_middleware, AuthenticatedUser};
pub use pipeline::{AuthOutcome, AuthPipeline, RejectReason};
pub use token::{TokenError, TokenIssuer};
