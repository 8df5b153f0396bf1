//! Post-quiz evaluation survey.
//!
//! RID requires every CEU activity to collect a participant evaluation
//! before a certificate can be issued. The survey has four mandatory Likert
//! ratings (1-5) and two optional free-text answers.

use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::CoreError;
use crate::types::DbId;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Raw evaluation submission as posted by the client.
///
/// Ratings are raw JSON values, optional at the type level, so a missing,
/// fractional, oversized, or non-numeric answer surfaces as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EvaluationSubmission {
    pub user_id: DbId,
    pub module_id: DbId,
    pub progress_id: DbId,
    /// The learning objectives were clear.
    #[validate(required, custom(function = "validate_rating"))]
    pub q1: Option<Value>,
    /// The content was relevant to interpreting practice.
    #[validate(required, custom(function = "validate_rating"))]
    pub q2: Option<Value>,
    /// The material is applicable to my work.
    #[validate(required, custom(function = "validate_rating"))]
    pub q3: Option<Value>,
    /// The presenter was effective.
    #[validate(required, custom(function = "validate_rating"))]
    pub q4: Option<Value>,
    /// What was most valuable.
    pub q5: Option<String>,
    /// Suggestions for improvement.
    pub q6: Option<String>,
}

/// The four validated Likert ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationRatings {
    pub objectives_clear: i16,
    pub content_relevant: i16,
    pub applicable_to_work: i16,
    pub presenter_effective: i16,
}

impl EvaluationRatings {
    /// Build from individual ratings, each of which must be in `[1, 5]`.
    pub fn new(q1: i16, q2: i16, q3: i16, q4: i16) -> Result<Self, CoreError> {
        let bad: Vec<&str> = [("q1", q1), ("q2", q2), ("q3", q3), ("q4", q4)]
            .into_iter()
            .filter(|(_, v)| !(MIN_RATING..=MAX_RATING).contains(v))
            .map(|(name, _)| name)
            .collect();
        if !bad.is_empty() {
            return Err(rating_error(&bad));
        }
        Ok(Self {
            objectives_clear: q1,
            content_relevant: q2,
            applicable_to_work: q3,
            presenter_effective: q4,
        })
    }

    pub fn average(&self) -> f64 {
        f64::from(
            self.objectives_clear
                + self.content_relevant
                + self.applicable_to_work
                + self.presenter_effective,
        ) / 4.0
    }
}

/// Validated evaluation ready to be persisted.
#[derive(Debug, Clone)]
pub struct ValidatedEvaluation {
    pub user_id: DbId,
    pub module_id: DbId,
    pub progress_id: DbId,
    pub ratings: EvaluationRatings,
    pub most_valuable: Option<String>,
    pub suggestions: Option<String>,
}

impl EvaluationSubmission {
    /// Check all four ratings and normalize the free-text answers.
    ///
    /// Must run before any write; a failure here leaves no trace.
    pub fn into_validated(self) -> Result<ValidatedEvaluation, CoreError> {
        if let Err(errors) = self.validate() {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|k| k.to_string())
                .collect();
            fields.sort();
            let names: Vec<&str> = fields.iter().map(String::as_str).collect();
            return Err(rating_error(&names));
        }

        // `validate` guarantees presence and range; fall back to an
        // out-of-range value so `EvaluationRatings::new` reports it if that
        // ever changes.
        let rating = |v: &Option<Value>| v.as_ref().and_then(rating_value).unwrap_or(0);
        let ratings = EvaluationRatings::new(
            rating(&self.q1),
            rating(&self.q2),
            rating(&self.q3),
            rating(&self.q4),
        )?;

        Ok(ValidatedEvaluation {
            user_id: self.user_id,
            module_id: self.module_id,
            progress_id: self.progress_id,
            ratings,
            most_valuable: normalize_free_text(self.q5),
            suggestions: normalize_free_text(self.q6),
        })
    }
}

/// A rating is a JSON integer in `[MIN_RATING, MAX_RATING]`.
pub fn rating_value(value: &Value) -> Option<i16> {
    value
        .as_i64()
        .filter(|v| (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(v))
        .and_then(|v| i16::try_from(v).ok())
}

fn validate_rating(value: &Value) -> Result<(), ValidationError> {
    rating_value(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("rating"))
}

/// Trim free text; blank answers are stored as `NULL`.
pub fn normalize_free_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn rating_error(fields: &[&str]) -> CoreError {
    CoreError::Validation(format!(
        "Ratings {} are required and must be integers between {MIN_RATING} and {MAX_RATING}",
        fields.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn submission(q: [Option<i16>; 4]) -> EvaluationSubmission {
        raw_submission(q.map(|r| r.map(Value::from)))
    }

    fn raw_submission([q1, q2, q3, q4]: [Option<Value>; 4]) -> EvaluationSubmission {
        EvaluationSubmission {
            user_id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            progress_id: Uuid::new_v4(),
            q1,
            q2,
            q3,
            q4,
            q5: Some("  The role-play segment  ".to_string()),
            q6: Some("   ".to_string()),
        }
    }

    #[test]
    fn every_valid_rating_tuple_is_accepted() {
        for a in 1..=5 {
            for b in 1..=5 {
                let sub = submission([Some(a), Some(b), Some(b), Some(a)]);
                let v = sub.into_validated().expect("valid ratings");
                assert_eq!(v.ratings.objectives_clear, a);
                assert_eq!(v.ratings.content_relevant, b);
                assert_eq!(v.ratings.applicable_to_work, b);
                assert_eq!(v.ratings.presenter_effective, a);
            }
        }
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let err = submission([Some(5), Some(0), Some(5), Some(6)])
            .into_validated()
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("q2") && msg.contains("q4"));
    }

    #[test]
    fn missing_rating_is_rejected() {
        let err = submission([Some(5), Some(4), None, Some(5)])
            .into_validated()
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("q3"));
    }

    #[test]
    fn non_integer_ratings_are_rejected_by_name() {
        let err = raw_submission([
            Some(json!(70000)),
            Some(json!(4.5)),
            Some(json!("5")),
            Some(json!(5)),
        ])
        .into_validated()
        .unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(ref msg)
                if msg.contains("q1") && msg.contains("q2") && msg.contains("q3") && !msg.contains("q4")
        );
    }

    #[test]
    fn submission_with_oversized_rating_still_deserializes() {
        let body = json!({
            "user_id": Uuid::new_v4(),
            "module_id": Uuid::new_v4(),
            "progress_id": Uuid::new_v4(),
            "q1": 70000,
            "q2": 4,
            "q3": 4,
            "q4": 4,
        });
        let sub: EvaluationSubmission = serde_json::from_value(body).unwrap();
        assert_matches!(sub.into_validated(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn free_text_is_trimmed_and_blank_dropped() {
        let v = submission([Some(5), Some(4), Some(5), Some(5)])
            .into_validated()
            .unwrap();
        assert_eq!(v.most_valuable.as_deref(), Some("The role-play segment"));
        assert!(v.suggestions.is_none());
    }

    #[test]
    fn ratings_constructor_checks_bounds() {
        assert!(EvaluationRatings::new(1, 2, 3, 4).is_ok());
        assert_matches!(
            EvaluationRatings::new(1, 2, 3, 9),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn average_rating() {
        let r = EvaluationRatings::new(5, 4, 5, 5).unwrap();
        assert!((r.average() - 4.75).abs() < f64::EPSILON);
    }
}
