//! Skill module (CEU workshop) definition.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use interpret_core::types::{DbId, Timestamp};

/// A row from the `skill_modules` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SkillModule {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub learning_objectives: Vec<String>,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub rid_activity_type: String,
    pub passing_score: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a module definition.
#[derive(Debug, Deserialize)]
pub struct CreateSkillModule {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub rid_activity_type: Option<String>,
    pub passing_score: Option<i32>,
}
