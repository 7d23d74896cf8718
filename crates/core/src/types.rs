/// Document identifiers are opaque strings assigned by the store.
pub type DocId = String;

/// User identifiers as issued by the identity provider.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
