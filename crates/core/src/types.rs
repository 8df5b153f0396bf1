/// All primary keys are PostgreSQL UUIDs. User ids are issued by the
/// identity provider and share the same representation.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
