//! CEU certification lifecycle.
//!
//! - [`lifecycle`] -- quiz gate and the forward-only per-module state machine.
//! - [`evaluation`] -- the mandatory post-quiz evaluation survey.
//! - [`certificate`] -- certificate numbering and issuance rules.
//! - [`verification`] -- the public verification payload.
//! - [`export`] -- RID batch-upload CSV/JSON layout.
//! - [`summary`] -- reporting statistics over an export window.

pub mod certificate;
pub mod evaluation;
pub mod export;
pub mod lifecycle;
pub mod summary;
pub mod verification;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// RID-issued sponsor number for this CEU-granting organization.
pub const DEFAULT_SPONSOR_NUMBER: &str = "2309";

/// Issuer name shown on certificates and verification payloads.
pub const ISSUER_NAME: &str = "InterpretReflect";

pub const CATEGORY_PROFESSIONAL_STUDIES: &str = "Professional Studies";
pub const CATEGORY_PPO: &str = "PPO";
pub const CATEGORY_GENERAL_STUDIES: &str = "General Studies";

/// All valid RID category strings, in report order.
pub const VALID_RID_CATEGORIES: &[&str] = &[
    CATEGORY_PROFESSIONAL_STUDIES,
    CATEGORY_PPO,
    CATEGORY_GENERAL_STUDIES,
];

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_REVOKED: &str = "revoked";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// RID continuing-education content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RidCategory {
    #[serde(rename = "Professional Studies")]
    ProfessionalStudies,
    #[serde(rename = "PPO")]
    Ppo,
    #[serde(rename = "General Studies")]
    GeneralStudies,
}

impl RidCategory {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            CATEGORY_PROFESSIONAL_STUDIES => Ok(Self::ProfessionalStudies),
            CATEGORY_PPO => Ok(Self::Ppo),
            CATEGORY_GENERAL_STUDIES => Ok(Self::GeneralStudies),
            _ => Err(format!(
                "Invalid RID category '{s}'. Must be one of: {}",
                VALID_RID_CATEGORIES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfessionalStudies => CATEGORY_PROFESSIONAL_STUDIES,
            Self::Ppo => CATEGORY_PPO,
            Self::GeneralStudies => CATEGORY_GENERAL_STUDIES,
        }
    }
}

/// Certificate validity. Revocation is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Active,
    Revoked,
}

impl CertificateStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_REVOKED => Ok(Self::Revoked),
            _ => Err(format!(
                "Invalid certificate status '{s}'. Must be one of: {STATUS_ACTIVE}, {STATUS_REVOKED}"
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => STATUS_ACTIVE,
            Self::Revoked => STATUS_REVOKED,
        }
    }
}
