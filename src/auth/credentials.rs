//! Credential Store
//! Mission: User registration and login over the document store

use crate::auth::hash::HashStrategy;
use crate::auth::models::{User, UserView};
use crate::error::{Error, Result};
use crate::store::{DocumentStore, Patch};
use anyhow::Context;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

const USERS: &str = "users";
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_USERNAME_LEN: usize = 20;

/// Registration and login logic. Uniqueness of usernames is enforced by the
/// store's unique index, never by a read-then-write check.
#[derive(Clone)]
pub struct CredentialStore {
    store: DocumentStore,
    strategy: HashStrategy,
}

impl CredentialStore {
    pub fn new(store: DocumentStore, strategy: HashStrategy) -> Self {
        Self { store, strategy }
    }

    /// Deterministic user id: the same username always maps to the same id.
    pub fn user_id_for(username: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, username.as_bytes())
    }

    /// Create a new account and return the stripped user view.
    pub fn register(&self, username: &str, password: &str) -> Result<UserView> {
        validate_username(username)?;
        validate_password(password)?;

        let id = Self::user_id_for(username);
        let credential = self.strategy.hash(password)?;
        let user = User {
            id,
            username: username.to_string(),
            credential,
            image: format!("https://robohash.org/{username}"),
            description: String::new(),
        };
        let doc = serde_json::to_value(&user).context("failed to serialize user")?;

        match self.store.create(USERS, &id.to_string(), doc) {
            Ok(()) => {
                info!("created user {} ({})", user.username, user.id);
                Ok(UserView::from_user(&user))
            }
            Err(Error::Conflict(_)) => {
                Err(Error::Conflict(format!("user {username} already exists")))
            }
            Err(err) => Err(err),
        }
    }

    /// Verify a username/password pair and return the stripped user view.
    pub fn login(&self, username: &str, password: &str) -> Result<UserView> {
        let doc = self
            .store
            .find_one(USERS, &[("username", json!(username))])?
            .ok_or(Error::NotFound("user"))?;
        let user = parse_user(doc)?;

        if !HashStrategy::verify(password, &user.credential)? {
            warn!("failed login attempt for {}", username);
            return Err(Error::Unauthorized("credentials mismatch"));
        }

        Ok(UserView::from_user(&user))
    }

    /// Fetch a stripped view by id.
    pub fn get_view(&self, id: &Uuid) -> Result<Option<UserView>> {
        match self.store.get(USERS, &id.to_string())? {
            Some(doc) => Ok(Some(UserView::from_user(&parse_user(doc)?))),
            None => Ok(None),
        }
    }

    /// Update profile fields. Unrelated fields (including the credential)
    /// are left untouched by the merge.
    pub fn update_profile(
        &self,
        id: &Uuid,
        image: Option<&str>,
        description: Option<&str>,
    ) -> Result<UserView> {
        let mut patch = Patch::new();
        if let Some(image) = image {
            patch = patch.set("image", image);
        }
        if let Some(description) = description {
            patch = patch.set("description", description);
        }
        if patch.is_empty() {
            return Err(Error::InvalidInput("no profile fields to update".into()));
        }

        match self.store.update(USERS, &id.to_string(), &patch, false) {
            Ok(()) => {}
            Err(Error::NotFound(_)) => return Err(Error::NotFound("user")),
            Err(err) => return Err(err),
        }
        self.get_view(id)?.ok_or(Error::NotFound("user"))
    }

    /// Replace the stored credential wholesale, re-hashed under the
    /// configured strategy.
    pub fn change_password(&self, id: &Uuid, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let credential = self.strategy.hash(new_password)?;
        let credential =
            serde_json::to_value(&credential).context("failed to serialize credential")?;
        let patch = Patch::new().set("credential", credential);
        match self.store.update(USERS, &id.to_string(), &patch, false) {
            Ok(()) => {
                info!("credential replaced for user {}", id);
                Ok(())
            }
            Err(Error::NotFound(_)) => Err(Error::NotFound("user")),
            Err(err) => Err(err),
        }
    }
}

fn parse_user(doc: Value) -> Result<User> {
    Ok(serde_json::from_value(doc).context("corrupt user record")?)
}

fn validate_username(username: &str) -> Result<()> {
    let ok = (1..=MAX_USERNAME_LEN).contains(&username.len())
        && username.chars().all(|c| c.is_ascii_alphanumeric());
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidInput("username is invalid".into()))
    }
}

fn validate_password(password: &str) -> Result<()> {
    if password.len() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(Error::InvalidInput("password is too short".into()))
    }
}
