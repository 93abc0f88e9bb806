use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Deserializer, Serialize};

/// JSON scalar accepted where text is expected
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Flag(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Signed(n) => n.to_string(),
            Scalar::Unsigned(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Flag(b) => b.to_string(),
        }
    }
}

/// Coerce a string, number or boolean to text; `null` stays absent
fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

/// Client-supplied submission fields, none of which are required
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionFields {
    #[serde(deserialize_with = "deserialize_text")]
    pub address: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub remark: Option<String>,
    #[serde(deserialize_with = "deserialize_text")]
    pub amount: Option<String>,
}

impl SubmissionFields {
    /// Replace the free-text fields of a same-day record.
    /// Absent fields clear the stored value; the phone is the match key and stays put.
    pub fn merge_into(&self, submission: &mut Submission) {
        submission.address = self.address.clone();
        submission.name = self.name.clone();
        submission.remark = self.remark.clone();
        submission.amount = self.amount.clone();
    }

    /// Overwrite only the fields present in the request
    pub fn patch(&self, submission: &mut Submission) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set(&mut submission.address, &self.address);
        set(&mut submission.name, &self.name);
        set(&mut submission.phone, &self.phone);
        set(&mut submission.remark, &self.remark);
        set(&mut submission.amount, &self.amount);
    }
}

/// Stored submission record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Creation timestamp, refreshed by every merge or update
    pub created_at: DateTime<Utc>,
    /// `true` once the record has been merged or updated
    pub is_updated: bool,
}

impl Submission {
    /// A fresh, never-updated record
    pub fn new(fields: &SubmissionFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            address: fields.address.clone(),
            name: fields.name.clone(),
            phone: fields.phone.clone(),
            remark: fields.remark.clone(),
            amount: fields.amount.clone(),
            created_at,
            is_updated: false,
        }
    }
}

/// Submissions sharing one `YYYY-MM-DD` calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: String,
    pub list: Vec<Submission>,
}
