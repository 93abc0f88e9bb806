pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Store errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("Failed to decode stored document: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("Store returned no document after an upsert")]
    MissingDocument,
    // Path parameters
    #[error("Invalid order id: {0}")]
    InvalidId(#[from] bson::oid::Error),
    // Unique (phone, day) violations
    #[error(
        "A submission for phone {} already exists on {day}",
        .phone.as_deref().unwrap_or("")
    )]
    Conflict { phone: Option<String>, day: String },
}
