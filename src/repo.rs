use std::sync::Arc;

use anyhow::Context;

use async_trait::async_trait;

use bson::oid::ObjectId;

use chrono::{DateTime, Utc};

use crate::model::{DayGroup, Submission, SubmissionFields};
use crate::settings::DatabaseSettings;
use crate::Result;

mod memory;
mod mongo;

pub use memory::InMemorySubmissionStore;
pub use mongo::MongoSubmissionStore;

/// Storage for submission records
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert a new record, or merge into the record with the same phone on the same UTC day.
    /// The returned record has `is_updated` set when a merge happened.
    async fn merge_same_day(
        &self,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Submission>;

    /// Overwrite the provided fields of a record, marking it updated as of `now`.
    /// `None` if no record has this id.
    async fn update_by_id(
        &self,
        id: ObjectId,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Submission>>;

    /// Remove a record, returning it if it existed
    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Submission>>;

    /// All records grouped by UTC day of `created_at`.
    /// Groups are sorted newest day first, each list oldest record first.
    async fn grouped_by_day(&self) -> Result<Vec<DayGroup>>;
}

/// Open the configured store
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Arc<dyn SubmissionStore>> {
    if settings.in_memory() {
        tracing::warn!("Using the in-memory submission store, records will not survive a restart");
        return Ok(Arc::new(InMemorySubmissionStore::default()));
    }

    let store = MongoSubmissionStore::connect(settings)
        .await
        .context("Failed to create MongoDB client")?;

    // An unreachable server is not fatal, requests fail until it comes up
    match store.ensure_indexes().await {
        Ok(()) => tracing::info!(database = settings.name(), "Connected to MongoDB"),
        Err(error) => tracing::error!(error.cause_chain = ?error, "Failed to connect to MongoDB"),
    }

    Ok(Arc::new(store))
}
