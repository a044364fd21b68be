//! Vote Ledger
//! Mission: Per-user-per-resource vote state with live tallies

use crate::error::{Error, Result};
use crate::store::{DocumentStore, Patch};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

const VOTES: &str = "votes";

/// Vote state for one (resource, user) pair. No stored record means
/// `NoVote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Down,
    NoVote,
    Up,
}

impl Vote {
    /// Parse the caller's `-1 / 0 / +1` input.
    pub fn from_value(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(Vote::Down),
            0 => Ok(Vote::NoVote),
            1 => Ok(Vote::Up),
            _ => Err(Error::InvalidInput(format!(
                "vote must be -1, 0 or 1, got {value}"
            ))),
        }
    }

    pub fn value(&self) -> i64 {
        match self {
            Vote::Down => -1,
            Vote::NoVote => 0,
            Vote::Up => 1,
        }
    }
}

/// Vote records keyed by the (resource, user) pair.
///
/// The tally for a resource is always recomputed by summing stored records,
/// never maintained as a separate counter, so it cannot drift from the
/// underlying ledger.
#[derive(Clone)]
pub struct VoteLedger {
    store: DocumentStore,
}

impl VoteLedger {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    fn record_id(resource_id: &str, user_id: &Uuid) -> String {
        Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            format!("{resource_id}:{user_id}").as_bytes(),
        )
        .to_string()
    }

    /// Transition the pair's state and return the resource's new tally.
    ///
    /// `NoVote` deletes any record; `Up`/`Down` upserts one. Both are
    /// idempotent: re-applying the current state changes nothing. The acting
    /// user and the target resource must exist before anything is written.
    pub fn apply_vote(
        &self,
        resource_collection: &str,
        resource_id: &str,
        user_id: &Uuid,
        vote: Vote,
    ) -> Result<i64> {
        if !self.store.has("users", &user_id.to_string())? {
            return Err(Error::NotFound("user"));
        }
        if !self.store.has(resource_collection, resource_id)? {
            return Err(Error::NotFound("resource"));
        }

        match vote {
            Vote::NoVote => {
                let removed = self.store.delete_where(
                    VOTES,
                    &[
                        ("resource_id", json!(resource_id)),
                        ("user_id", json!(user_id.to_string())),
                    ],
                )?;
                debug!(
                    "retracted vote of {} on {} (removed {})",
                    user_id, resource_id, removed
                );
            }
            Vote::Up | Vote::Down => {
                let patch = Patch::new()
                    .set("resource_id", resource_id)
                    .set("user_id", user_id.to_string())
                    .set("value", vote.value());
                self.store
                    .update(VOTES, &Self::record_id(resource_id, user_id), &patch, true)?;
                debug!("{} voted {} on {}", user_id, vote.value(), resource_id);
            }
        }

        self.tally(resource_id)
    }

    /// The pair's current state.
    pub fn vote_of(&self, resource_id: &str, user_id: &Uuid) -> Result<Vote> {
        let record = self.store.find_one(
            VOTES,
            &[
                ("resource_id", json!(resource_id)),
                ("user_id", json!(user_id.to_string())),
            ],
        )?;
        match record {
            Some(doc) => Vote::from_value(doc["value"].as_i64().unwrap_or(0)),
            None => Ok(Vote::NoVote),
        }
    }

    /// Net sum of all vote values recorded against the resource, computed
    /// live from the ledger.
    pub fn tally(&self, resource_id: &str) -> Result<i64> {
        self.store
            .aggregate_sum(VOTES, &[("resource_id", json!(resource_id))], "value")
    }
}
