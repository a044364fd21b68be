//! Process Service
//! Mission: Own the store connection and signing secret for the process lifetime

use crate::auth::{AuthPipeline, CredentialStore, HashStrategy, TokenIssuer};
use crate::error::{Error, Result};
use crate::store::DocumentStore;
use crate::votes::VoteLedger;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: String,
    pub signing_secret: String,
    pub hash_strategy: HashStrategy,
}

/// Process-scoped service object holding the shared store connection and the
/// loaded signing secret. Built once at startup and passed by reference into
/// components; there are no implicit globals. Both pieces are read-only
/// after `init`.
pub struct AppService {
    store: DocumentStore,
    issuer: Arc<TokenIssuer>,
    pipeline: Arc<AuthPipeline>,
    credentials: CredentialStore,
    ledger: VoteLedger,
}

impl AppService {
    /// Establish the store connection and load the secret. Absence of either
    /// is fatal: the process must not come up without them.
    pub fn init(config: &ServiceConfig) -> Result<Self> {
        if config.signing_secret.trim().is_empty() {
            return Err(Error::InvalidInput(
                "signing secret must not be empty".into(),
            ));
        }
        if config.database_path.trim().is_empty() {
            return Err(Error::InvalidInput(
                "database path must not be empty".into(),
            ));
        }

        let store = DocumentStore::open(&config.database_path)?;
        let issuer = Arc::new(TokenIssuer::new(&config.signing_secret));
        let pipeline = Arc::new(AuthPipeline::new(issuer.clone(), store.clone()));
        let credentials = CredentialStore::new(store.clone(), config.hash_strategy);
        let ledger = VoteLedger::new(store.clone());

        info!("service initialized (database: {})", config.database_path);
        Ok(Self {
            store,
            issuer,
            pipeline,
            credentials,
            ledger,
        })
    }

    pub fn store(&self) -> DocumentStore {
        self.store.clone()
    }

    pub fn issuer(&self) -> Arc<TokenIssuer> {
        self.issuer.clone()
    }

    pub fn pipeline(&self) -> Arc<AuthPipeline> {
        self.pipeline.clone()
    }

    pub fn credentials(&self) -> CredentialStore {
        self.credentials.clone()
    }

    pub fn ledger(&self) -> VoteLedger {
        self.ledger.clone()
    }

    /// Tear down the service. The underlying connection closes once the last
    /// component handle is dropped.
    pub fn shutdown(self) {
        info!("service shut down");
    }
}
