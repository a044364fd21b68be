//! Password Hashing
//! Mission: Pluggable hashing strategies that can coexist during a migration

use crate::error::Result;
use anyhow::{anyhow, Context};
use bcrypt::DEFAULT_COST;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Iteration count used when hashing new salted-digest credentials.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Algorithm tag stored with every credential, so verification can dispatch
/// on what the record was actually hashed with rather than on whatever the
/// process is configured to use today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Plaintext,
    SaltedSha256,
    Bcrypt,
}

/// Stored representation of a password. Never serialized into user views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub algorithm: HashAlgorithm,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

/// The strategy used for newly created credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashStrategy {
    /// Stores the password as-is and compares directly. Historical baseline
    /// kept for old data sets; never run this in production.
    Plaintext,
    /// Per-credential random salt plus an iterated SHA-256 digest. Salt and
    /// iteration count ride along in the record.
    SaltedSha256 { iterations: u32 },
    /// Self-contained bcrypt hash; salt and cost are embedded in the hash
    /// string itself, so the record carries no separate salt.
    Bcrypt { cost: u32 },
}

impl Default for HashStrategy {
    fn default() -> Self {
        HashStrategy::Bcrypt { cost: DEFAULT_COST }
    }
}

impl HashStrategy {
    /// Parse a config selector such as `bcrypt` or `salted_sha256`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "plaintext" => Some(HashStrategy::Plaintext),
            "salted_sha256" => Some(HashStrategy::SaltedSha256 {
                iterations: DEFAULT_ITERATIONS,
            }),
            "bcrypt" => Some(HashStrategy::Bcrypt { cost: DEFAULT_COST }),
            _ => None,
        }
    }

    pub fn hash(&self, plaintext: &str) -> Result<CredentialRecord> {
        match *self {
            HashStrategy::Plaintext => Ok(CredentialRecord {
                algorithm: HashAlgorithm::Plaintext,
                hash: plaintext.to_string(),
                salt: None,
                iterations: None,
            }),
            HashStrategy::SaltedSha256 { iterations } => {
                let salt: [u8; 16] = rand::thread_rng().gen();
                Ok(CredentialRecord {
                    algorithm: HashAlgorithm::SaltedSha256,
                    hash: iterated_digest(plaintext, &salt, iterations),
                    salt: Some(hex::encode(salt)),
                    iterations: Some(iterations),
                })
            }
            HashStrategy::Bcrypt { cost } => {
                let hash =
                    bcrypt::hash(plaintext, cost).context("failed to hash password")?;
                Ok(CredentialRecord {
                    algorithm: HashAlgorithm::Bcrypt,
                    hash,
                    salt: None,
                    iterations: None,
                })
            }
        }
    }

    /// Check `plaintext` against a stored record.
    ///
    /// Dispatches on the record's own algorithm tag, not on the configured
    /// strategy, so credentials hashed under an older scheme keep verifying
    /// while a migration is in flight.
    pub fn verify(plaintext: &str, record: &CredentialRecord) -> Result<bool> {
        match record.algorithm {
            HashAlgorithm::Plaintext => Ok(record.hash == plaintext),
            HashAlgorithm::SaltedSha256 => {
                let salt_hex = record
                    .salt
                    .as_deref()
                    .ok_or_else(|| anyhow!("salted credential record missing salt"))?;
                let iterations = record
                    .iterations
                    .ok_or_else(|| anyhow!("salted credential record missing iterations"))?;
                let salt = hex::decode(salt_hex)
                    .context("salted credential record has malformed salt")?;
                Ok(iterated_digest(plaintext, &salt, iterations) == record.hash)
            }
            HashAlgorithm::Bcrypt => {
                Ok(bcrypt::verify(plaintext, &record.hash)
                    .context("failed to verify password")?)
            }
        }
    }
}

fn iterated_digest(plaintext: &str, salt: &[u8], iterations: u32) -> String {
    let mut state = Sha256::new()
        .chain_update(salt)
        .chain_update(plaintext.as_bytes())
        .finalize();
    for _ in 1..iterations {
        state = Sha256::digest(state);
    }
    hex::encode(state)
}
