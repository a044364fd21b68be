//! Bearer Tokens
//! Mission: Sign and verify stateless bearer tokens

use crate::error::Result;
use anyhow::Context;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims payload: just the subject id, matching what callers present.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed at all.
    Malformed,
    /// The token parsed but its signature does not check out.
    InvalidSignature,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
        }
    }
}

/// Issues and verifies HS256 bearer tokens with a process-wide secret.
///
/// Tokens never expire and there is no revocation list; an issued token
/// stays valid until the signing secret rotates.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign `{id}` into an opaque bearer value.
    pub fn issue(&self, user_id: &Uuid) -> Result<String> {
        let token = encode(&Header::default(), &Claims { id: *user_id }, &self.encoding)
            .context("failed to sign token")?;
        Ok(token)
    }

    /// Check the signature and extract the subject id. Whether that id still
    /// resolves to a user is the pipeline's concern, not this one's.
    pub fn verify(&self, token: &str) -> std::result::Result<Uuid, TokenError> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims.id),
            Err(err) => match err.kind() {
                ErrorKind::InvalidSignature => Err(TokenError::InvalidSignature),
                _ => Err(TokenError::Malformed),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret-key-12345");
        let user_id = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"alice");

        let token = issuer.issue(&user_id).unwrap();
        assert!(!token.is_empty());
        assert_eq!(issuer.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let issuer = TokenIssuer::new("test-secret-key-12345");
        assert_eq!(
            issuer.verify("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(issuer.verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_different_secrets_reject() {
        let issuer1 = TokenIssuer::new("secret1");
        let issuer2 = TokenIssuer::new("secret2");
        let user_id = Uuid::new_v5(&Uuid::NAMESPACE_URL, b"alice");

        let token = issuer1.issue(&user_id).unwrap();
        assert_eq!(
            issuer2.verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }
}
