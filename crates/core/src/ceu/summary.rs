//! Summary statistics for an export window.
//!
//! The whole window is processed in memory. That is fine while certificate
//! volume is small; it is the scalability boundary of the report.

use std::collections::HashSet;

use serde::Serialize;

use crate::ceu::export::ExportSource;
use crate::ceu::RidCategory;
use crate::types::DbId;

/// CEU totals per RID category. All three buckets are always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    #[serde(rename = "Professional Studies")]
    pub professional_studies: f64,
    #[serde(rename = "PPO")]
    pub ppo: f64,
    #[serde(rename = "General Studies")]
    pub general_studies: f64,
}

impl CategoryBreakdown {
    fn add(&mut self, category: RidCategory, ceu_value: f64) {
        match category {
            RidCategory::ProfessionalStudies => self.professional_studies += ceu_value,
            RidCategory::Ppo => self.ppo += ceu_value,
            RidCategory::GeneralStudies => self.general_studies += ceu_value,
        }
    }

    fn rounded(&self) -> Self {
        Self {
            professional_studies: round2(self.professional_studies),
            ppo: round2(self.ppo),
            general_studies: round2(self.general_studies),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CeuSummary {
    pub total_certificates: usize,
    pub unique_participants: usize,
    pub total_ceus: f64,
    pub by_category: CategoryBreakdown,
    /// Distinct participants whose profile lacks an RID member number.
    pub missing_rid_numbers: usize,
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute summary statistics over the certificates of an export window.
///
/// Rows with an unrecognised category still count toward the totals but
/// land in no bucket.
pub fn summarize(rows: &[ExportSource]) -> CeuSummary {
    let mut participants: HashSet<DbId> = HashSet::new();
    let mut missing_rid: HashSet<DbId> = HashSet::new();
    let mut total = 0.0;
    let mut by_category = CategoryBreakdown::default();

    for row in rows {
        participants.insert(row.user_id);
        let has_rid = row
            .rid_member_number
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        if !has_rid {
            missing_rid.insert(row.user_id);
        }

        total += row.ceu_value;
        if let Ok(category) = RidCategory::from_str_value(&row.rid_category) {
            by_category.add(category, row.ceu_value);
        }
    }

    CeuSummary {
        total_certificates: rows.len(),
        unique_participants: participants.len(),
        total_ceus: round2(total),
        by_category: by_category.rounded(),
        missing_rid_numbers: missing_rid.len(),
    }
}
