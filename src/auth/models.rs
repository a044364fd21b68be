//! Authentication Models
//! Mission: User records, stripped views, and auth wire types

use crate::auth::hash::CredentialRecord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full user record as stored. Only the credential subsystem ever sees this
/// shape; everything returned to callers goes through [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub credential: CredentialRecord,
    pub image: String,
    #[serde(default)]
    pub description: String,
}

/// User view with credential fields stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub image: String,
    #[serde(default)]
    pub description: String,
}

impl UserView {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            image: user.image.clone(),
            description: user.description.clone(),
        }
    }
}

/// Signup / login request body.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response for successful signup or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash::HashStrategy;

    #[test]
    fn test_view_strips_credential() {
        let user = User {
            id: Uuid::new_v5(&Uuid::NAMESPACE_URL, b"alice"),
            username: "alice".to_string(),
            credential: HashStrategy::Plaintext.hash("secret").unwrap(),
            image: "https://robohash.org/alice".to_string(),
            description: String::new(),
        };

        let view = UserView::from_user(&user);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("credential").is_none());
        assert!(!json.to_string().contains("secret"));
    }
}
