use std::fmt::Display;
use std::sync::Arc;

use crate::{
    config::CorruptRecordPolicy,
    db::KeyValueBackend,
    error::{AppError, AppResult},
    models::{RecommendationList, UserRecommendations},
};

/// Glob matching every stored recommendation list
pub const RECOMMENDATION_KEY_PATTERN: &str = "user:*:recommendations";

/// Storage key of one user's recommendation list: `user:<user_id>:recommendations`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecommendationKey<'a>(pub &'a str);

impl Display for RecommendationKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}:recommendations", self.0)
    }
}

impl<'a> RecommendationKey<'a> {
    /// Recovers the user id from a stored key by taking the second
    /// `:`-separated component.
    ///
    /// User ids that themselves contain `:` do not survive this: the key of
    /// `a:b` reads back as `a`. Existing keys rely on this layout, so ids are
    /// stored unescaped.
    pub fn user_id(key: &'a str) -> Option<&'a str> {
        key.split(':').nth(1)
    }
}

/// Per-user category lists kept in a shared key-value backend
///
/// Each list is stored as one JSON array under [`RecommendationKey`]. Mutations
/// are read-modify-write guarded by a conditional write, so concurrent adds or
/// removes on one user are retried instead of overwriting each other.
#[derive(Clone)]
pub struct RecommendationStore {
    backend: Arc<dyn KeyValueBackend>,
    max_write_attempts: u32,
    corrupt_record_policy: CorruptRecordPolicy,
}

impl RecommendationStore {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        max_write_attempts: u32,
        corrupt_record_policy: CorruptRecordPolicy,
    ) -> Self {
        Self {
            backend,
            max_write_attempts: max_write_attempts.max(1),
            corrupt_record_policy,
        }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Appends `category` to the user's list, creating the list on first use
    ///
    /// Duplicates are kept. Returns the full list after the write.
    pub async fn add(&self, user_id: &str, category: &str) -> AppResult<RecommendationList> {
        let key = RecommendationKey(user_id).to_string();

        let list = self
            .update(&key, |current| {
                let mut list = current.unwrap_or_default();
                list.push(category.to_string());
                Ok(list)
            })
            .await?;

        tracing::info!(user_id, category, count = list.len(), "Recommendation added");
        Ok(list)
    }

    /// Returns the user's list, or an empty list if nothing is stored
    pub async fn get(&self, user_id: &str) -> AppResult<RecommendationList> {
        Ok(self.find(user_id).await?.unwrap_or_default())
    }

    /// Like [`get`](Self::get), but `None` when nothing is stored for the user
    ///
    /// A stored empty list comes back as `Some(vec![])`.
    pub async fn find(&self, user_id: &str) -> AppResult<Option<RecommendationList>> {
        let key = RecommendationKey(user_id).to_string();
        let raw = self.backend.get(&key).await?;
        decode(&key, raw.as_deref())
    }

    /// Lists every user with a stored list, ordered by storage key
    ///
    /// Scans the whole keyspace; meant for administrative use. Undecodable
    /// values are handled according to the configured [`CorruptRecordPolicy`].
    pub async fn get_all(&self) -> AppResult<Vec<UserRecommendations>> {
        let mut keys = self.backend.scan_keys(RECOMMENDATION_KEY_PATTERN).await?;
        // SCAN may hand back the same key twice
        keys.sort();
        keys.dedup();

        let values = self.backend.get_many(&keys).await?;
        let mut all = Vec::with_capacity(keys.len());

        for (key, raw) in keys.iter().zip(values) {
            // deleted between SCAN and MGET
            let Some(raw) = raw else { continue };

            let Some(user_id) = RecommendationKey::user_id(key) else {
                tracing::warn!(key = %key, "Skipping key without a user id");
                continue;
            };

            let recommendations = match decode(key, Some(&raw)) {
                Ok(list) => list.unwrap_or_default(),
                Err(e) => match self.corrupt_record_policy {
                    CorruptRecordPolicy::Abort => {
                        tracing::error!(key = %key, error = %e, "Corrupt record, aborting listing");
                        return Err(e);
                    }
                    CorruptRecordPolicy::Skip => {
                        tracing::warn!(key = %key, error = %e, "Corrupt record, skipping");
                        continue;
                    }
                },
            };

            all.push(UserRecommendations {
                user_id: user_id.to_string(),
                recommendations,
            });
        }

        tracing::debug!(users = all.len(), "Listed all recommendations");
        Ok(all)
    }

    /// Removes the first occurrence of `category` from the user's list
    ///
    /// Fails with [`AppError::NotFound`] when the user has no stored list or the
    /// category is not in it. Removing the last entry leaves an empty list
    /// behind rather than deleting the key.
    pub async fn remove(&self, user_id: &str, category: &str) -> AppResult<RecommendationList> {
        let key = RecommendationKey(user_id).to_string();

        let list = self
            .update(&key, |current| {
                let mut list = current.ok_or_else(|| {
                    AppError::NotFound("No recommendations found for this user".to_string())
                })?;
                let position = list
                    .iter()
                    .position(|c| c == category)
                    .ok_or_else(|| AppError::NotFound("Recommendation not found".to_string()))?;
                list.remove(position);
                Ok(list)
            })
            .await?;

        tracing::info!(user_id, category, count = list.len(), "Recommendation removed");
        Ok(list)
    }

    /// Read-modify-write on one key, retried while other writers win the race
    ///
    /// `apply` gets the decoded current list (`None` when nothing is stored)
    /// and returns the list to write back. Its errors abort without writing.
    async fn update<F>(&self, key: &str, mut apply: F) -> AppResult<RecommendationList>
    where
        F: FnMut(Option<RecommendationList>) -> AppResult<RecommendationList> + Send,
    {
        for attempt in 1..=self.max_write_attempts {
            let raw = self.backend.get(key).await?;
            let updated = apply(decode(key, raw.as_deref())?)?;
            let encoded = encode(&updated)?;

            if self
                .backend
                .compare_and_set(key, raw.as_deref(), &encoded)
                .await?
            {
                return Ok(updated);
            }

            tracing::debug!(key, attempt, "Concurrent write detected, retrying");
        }

        tracing::warn!(
            key,
            attempts = self.max_write_attempts,
            "Giving up after repeated write conflicts"
        );
        Err(AppError::Conflict(key.to_string()))
    }
}

/// Decodes a stored value; absent and empty values decode to `None`
fn decode(key: &str, raw: Option<&str>) -> AppResult<Option<RecommendationList>> {
    match raw {
        None | Some("") => Ok(None),
        Some(json) => serde_json::from_str(json)
            .map(Some)
            .map_err(|source| AppError::CorruptData {
                key: key.to_string(),
                source,
            }),
    }
}

fn encode(list: &RecommendationList) -> AppResult<String> {
    serde_json::to_string(list)
        .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))
}
