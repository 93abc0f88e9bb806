use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use bson::oid::ObjectId;

use chrono::{DateTime, Utc};

use crate::domain::DayKey;
use crate::model::{DayGroup, Submission, SubmissionFields};
use crate::Result;

use super::SubmissionStore;

/// Stored submission plus its dedup key.
/// `day` is `None` once an update could not take today's key,
/// like a MongoDB document without `day`.
#[derive(Debug, Clone)]
struct Record {
    submission: Submission,
    day: Option<DayKey>,
}

impl Record {
    fn holds_key(&self, phone: &Option<String>, day: &DayKey) -> bool {
        self.submission.phone == *phone && self.day.as_ref() == Some(day)
    }
}

/// Process-local store, kept in insertion order.
/// One lock serializes every operation, so the (phone, day) key is never duplicated.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    records: Mutex<Vec<Record>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every stored record, in insertion order
    pub fn snapshot(&self) -> Vec<Submission> {
        self.lock().iter().map(|r| r.submission.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        // A panic while holding the lock cannot leave a record half-written
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    #[tracing::instrument(name = "Merge same-day submission in memory", skip(self))]
    async fn merge_same_day(
        &self,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        let day = DayKey::of(&now);
        let mut records = self.lock();

        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.holds_key(&fields.phone, &day))
        {
            let submission = &mut existing.submission;
            fields.merge_into(submission);
            submission.created_at = now;
            submission.is_updated = true;
            return Ok(submission.clone());
        }

        let submission = Submission::new(fields, now);
        records.push(Record {
            submission: submission.clone(),
            day: Some(day),
        });
        Ok(submission)
    }

    #[tracing::instrument(name = "Update submission by id in memory", skip(self))]
    async fn update_by_id(
        &self,
        id: ObjectId,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let mut records = self.lock();

        let Some(index) = records.iter().position(|r| r.submission.id == id) else {
            return Ok(None);
        };

        let mut updated = records[index].submission.clone();
        fields.patch(&mut updated);
        updated.created_at = now;
        updated.is_updated = true;

        // Another record holding today's key stays the merge target
        let day = DayKey::of(&now);
        let taken = records
            .iter()
            .any(|r| r.submission.id != id && r.holds_key(&updated.phone, &day));

        records[index] = Record {
            submission: updated.clone(),
            day: (!taken).then_some(day),
        };
        Ok(Some(updated))
    }

    #[tracing::instrument(name = "Delete submission by id in memory", skip(self))]
    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Submission>> {
        let mut records = self.lock();

        Ok(records
            .iter()
            .position(|r| r.submission.id == id)
            .map(|index| records.remove(index).submission))
    }

    #[tracing::instrument(name = "Group submissions by day in memory", skip(self))]
    async fn grouped_by_day(&self) -> Result<Vec<DayGroup>> {
        let mut records = self.snapshot();
        records.sort_by_key(|s| s.created_at);

        let mut groups: Vec<DayGroup> = Vec::new();
        for submission in records {
            let date: String = DayKey::of(&submission.created_at).into();
            match groups.iter_mut().find(|g| g.date == date) {
                Some(group) => group.list.push(submission),
                None => groups.push(DayGroup {
                    date,
                    list: vec![submission],
                }),
            }
        }
        groups.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(groups)
    }
}
