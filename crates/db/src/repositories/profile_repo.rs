//! Repository for the `profiles` table.

use interpret_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{Profile, UpsertProfile};

/// Column list for profile queries.
const COLUMNS: &str = "id, full_name, email, rid_member_number, role, created_at, updated_at";

/// Profiles mirror identity-provider users. [`ProfileRepo::ensure`] creates
/// a bare row the first time a token subject writes anything.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Find a profile by its user id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up only the role column.
    pub async fn find_role(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT role FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(role,)| role))
    }

    /// Insert a bare profile for `id` unless one exists. Existing rows are
    /// left untouched. Returns `true` when a row was created.
    pub async fn ensure(pool: &PgPool, id: DbId, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO profiles (id, email) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Insert a profile or refresh its name, email, RID number, and role.
    pub async fn upsert(pool: &PgPool, input: &UpsertProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, full_name, email, rid_member_number, role)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                email = EXCLUDED.email,
                rid_member_number = EXCLUDED.rid_member_number,
                role = EXCLUDED.role,
                updated_at = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.rid_member_number)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }
}
