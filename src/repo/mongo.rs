use async_trait::async_trait;

use bson::oid::ObjectId;
use bson::{doc, Bson, Document};

use chrono::{DateTime, Utc};

use futures_util::TryStreamExt;

use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, IndexModel};

use secrecy::ExposeSecret;

use serde::Deserialize;

use crate::domain::DayKey;
use crate::model::{DayGroup, Submission, SubmissionFields};
use crate::settings::DatabaseSettings;
use crate::{Error, Result};

use super::SubmissionStore;

const APP_NAME: &str = "order-intake";
const PHONE_DAY_INDEX: &str = "phone_day_unique";
const DUPLICATE_KEY: i32 = 11000;

/// Submission document as stored in MongoDB.
/// `day` is absent on documents written before the (phone, day) key existed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    address: Option<String>,
    name: Option<String>,
    phone: Option<String>,
    remark: Option<String>,
    amount: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    is_updated: bool,
}

impl From<SubmissionDocument> for Submission {
    fn from(doc: SubmissionDocument) -> Self {
        Self {
            id: doc.id,
            address: doc.address,
            name: doc.name,
            phone: doc.phone,
            remark: doc.remark,
            amount: doc.amount,
            created_at: doc.created_at,
            is_updated: doc.is_updated,
        }
    }
}

/// One `$group` output of [`grouping_pipeline`]
#[derive(Debug, Deserialize)]
struct DayGroupDocument {
    #[serde(rename = "_id")]
    date: String,
    list: Vec<SubmissionDocument>,
}

impl From<DayGroupDocument> for DayGroup {
    fn from(doc: DayGroupDocument) -> Self {
        Self {
            date: doc.date,
            list: doc.list.into_iter().map(Into::into).collect(),
        }
    }
}

/// MongoDB-backed submission store
#[derive(Debug, Clone)]
pub struct MongoSubmissionStore {
    collection: Collection<SubmissionDocument>,
}

impl MongoSubmissionStore {
    /// Create the client. No server round trip happens until the first operation.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let mut options = ClientOptions::parse(settings.uri().expose_secret()).await?;
        options.app_name = Some(APP_NAME.into());

        let client = Client::with_options(options)?;
        let collection = client
            .database(settings.name())
            .collection(settings.collection());

        Ok(Self { collection })
    }

    /// Create the unique (phone, day) index if it does not exist yet
    #[tracing::instrument(name = "Ensure submission indexes", skip(self))]
    pub async fn ensure_indexes(&self) -> Result<()> {
        let options = IndexOptions::builder()
            .name(PHONE_DAY_INDEX.to_string())
            .unique(true)
            .partial_filter_expression(doc! { "day": { "$exists": true } })
            .build();
        let index = IndexModel::builder()
            .keys(doc! { "phone": 1, "day": 1 })
            .options(options)
            .build();

        self.collection.create_index(index, None).await?;
        Ok(())
    }
}

fn optional(value: &Option<String>) -> Bson {
    value.as_deref().map_or(Bson::Null, Bson::from)
}

/// Aggregation value that writes `value` verbatim, or drops the field when absent.
/// `$literal` keeps client text starting with `$` from being read as a field path.
fn literal_or_remove(value: &Option<String>) -> Bson {
    match value {
        Some(value) => Bson::Document(doc! { "$literal": value.as_str() }),
        None => Bson::String("$$REMOVE".into()),
    }
}

fn merge_filter(fields: &SubmissionFields, day: &DayKey) -> Document {
    doc! { "phone": optional(&fields.phone), "day": day.as_str() }
}

/// Update pipeline for the same-day upsert.
/// `$createdAt` still refers to the stored value inside the `$set` stage,
/// so it is missing exactly when the upsert inserted a new document.
fn merge_pipeline(fields: &SubmissionFields, now: DateTime<Utc>) -> Vec<Document> {
    vec![doc! {
        "$set": {
            "address": literal_or_remove(&fields.address),
            "name": literal_or_remove(&fields.name),
            "remark": literal_or_remove(&fields.remark),
            "amount": literal_or_remove(&fields.amount),
            "isUpdated": {
                "$cond": [{ "$eq": [{ "$type": "$createdAt" }, "missing"] }, false, true]
            },
            "createdAt": bson::DateTime::from_chrono(now),
        }
    }]
}

/// `$set` for update-by-id. A keyed update moves the record onto today's (phone, day) key;
/// an unkeyed one drops `day`, taking the record out of the unique index.
fn update_document(fields: &SubmissionFields, now: DateTime<Utc>, keyed: bool) -> Document {
    let mut set = doc! {
        "isUpdated": true,
        "createdAt": bson::DateTime::from_chrono(now),
    };
    let provided = [
        ("address", &fields.address),
        ("name", &fields.name),
        ("phone", &fields.phone),
        ("remark", &fields.remark),
        ("amount", &fields.amount),
    ];
    for (key, value) in provided {
        if let Some(value) = value {
            set.insert(key, value.as_str());
        }
    }

    if keyed {
        set.insert("day", DayKey::of(&now).as_str());
        doc! { "$set": set }
    } else {
        doc! { "$set": set, "$unset": { "day": "" } }
    }
}

fn grouping_pipeline() -> Vec<Document> {
    vec![
        doc! { "$sort": { "createdAt": 1, "_id": 1 } },
        doc! {
            "$addFields": {
                "date": { "$dateToString": { "format": DayKey::FORMAT, "date": "$createdAt" } }
            }
        },
        doc! { "$group": { "_id": "$date", "list": { "$push": "$$ROOT" } } },
        doc! { "$sort": { "_id": -1 } },
    ]
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match &*error.kind {
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn conflict_or_database(
    error: mongodb::error::Error,
    phone: &Option<String>,
    day: DayKey,
) -> Error {
    if is_duplicate_key(&error) {
        Error::Conflict {
            phone: phone.clone(),
            day: day.into(),
        }
    } else {
        Error::Database(error)
    }
}

#[async_trait]
impl SubmissionStore for MongoSubmissionStore {
    #[tracing::instrument(name = "Merge same-day submission", skip(self))]
    async fn merge_same_day(
        &self,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        let day = DayKey::of(&now);
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(
                merge_filter(fields, &day),
                merge_pipeline(fields, now),
                options,
            )
            .await
            .map_err(|e| conflict_or_database(e, &fields.phone, day.clone()))?
            .map(Submission::from)
            .ok_or(Error::MissingDocument)
    }

    #[tracing::instrument(name = "Update submission by id", skip(self))]
    async fn update_by_id(
        &self,
        id: ObjectId,
        fields: &SubmissionFields,
        now: DateTime<Utc>,
    ) -> Result<Option<Submission>> {
        let options = || {
            FindOneAndUpdateOptions::builder()
                .return_document(ReturnDocument::After)
                .build()
        };

        let keyed = self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                update_document(fields, now, true),
                options(),
            )
            .await;

        let updated = match keyed {
            // Another record holds today's key for this phone and stays the merge target
            Err(error) if is_duplicate_key(&error) => {
                tracing::warn!(%id, "Today's key is taken, updating without a dedup key");
                self.collection
                    .find_one_and_update(
                        doc! { "_id": id },
                        update_document(fields, now, false),
                        options(),
                    )
                    .await?
            }
            other => other?,
        };

        Ok(updated.map(Into::into))
    }

    #[tracing::instrument(name = "Delete submission by id", skip(self))]
    async fn delete_by_id(&self, id: ObjectId) -> Result<Option<Submission>> {
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": id }, None)
            .await?;

        Ok(deleted.map(Into::into))
    }

    #[tracing::instrument(name = "Group submissions by day", skip(self))]
    async fn grouped_by_day(&self) -> Result<Vec<DayGroup>> {
        let mut cursor = self.collection.aggregate(grouping_pipeline(), None).await?;

        let mut groups = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            let group: DayGroupDocument = bson::from_document(document)?;
            groups.push(group.into());
        }

        Ok(groups)
    }
}
