use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the precision the document store keeps
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// UTC calendar day (`YYYY-MM-DD`) of a timestamp.
/// Together with the phone number it forms the dedup key for submissions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(String);

impl DayKey {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn of(timestamp: &DateTime<Utc>) -> Self {
        Self(timestamp.format(Self::FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DayKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
