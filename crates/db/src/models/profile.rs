//! Profile model.

use serde::Serialize;
use sqlx::FromRow;
use interpret_core::types::{DbId, Timestamp};

/// A row from the `profiles` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub rid_member_number: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or refreshing a profile row.
#[derive(Debug)]
pub struct UpsertProfile {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub rid_member_number: Option<String>,
    pub role: String,
}
