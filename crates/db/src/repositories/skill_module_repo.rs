//! Repository for the `skill_modules` table.

use interpret_core::ceu::lifecycle::DEFAULT_PASSING_SCORE;
use interpret_core::types::DbId;
use sqlx::PgPool;

use crate::models::skill_module::{CreateSkillModule, SkillModule};

/// Column list for skill module queries.
const COLUMNS: &str = "id, title, description, learning_objectives, ceu_value, rid_category, \
    rid_subcategory, rid_activity_type, passing_score, is_active, created_at, updated_at";

/// Default RID activity type for self-paced modules.
const DEFAULT_ACTIVITY_TYPE: &str = "Independent Study";

pub struct SkillModuleRepo;

impl SkillModuleRepo {
    /// Create a module definition, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSkillModule,
    ) -> Result<SkillModule, sqlx::Error> {
        let query = format!(
            "INSERT INTO skill_modules
                (title, description, learning_objectives, ceu_value, rid_category,
                 rid_subcategory, rid_activity_type, passing_score)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SkillModule>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.learning_objectives)
            .bind(input.ceu_value)
            .bind(&input.rid_category)
            .bind(&input.rid_subcategory)
            .bind(input.rid_activity_type.as_deref().unwrap_or(DEFAULT_ACTIVITY_TYPE))
            .bind(input.passing_score.unwrap_or(DEFAULT_PASSING_SCORE))
            .fetch_one(pool)
            .await
    }

    /// Find a module by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SkillModule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM skill_modules WHERE id = $1");
        sqlx::query_as::<_, SkillModule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active modules ordered by title.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<SkillModule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM skill_modules WHERE is_active ORDER BY title ASC, id ASC"
        );
        sqlx::query_as::<_, SkillModule>(&query).fetch_all(pool).await
    }
}
