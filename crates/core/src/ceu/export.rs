//! RID batch-upload export.
//!
//! RID's uploader expects a fixed column order and header names; both are
//! frozen in [`RID_CSV_HEADERS`]. Every field goes through the CSV writer,
//! which quotes only where the value requires it, so rows without commas,
//! quotes, or newlines are byte-identical to the historical export.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Column headers of the RID batch CSV, in upload order.
pub const RID_CSV_HEADERS: [&str; 13] = [
    "RID Member Number",
    "Last Name",
    "First Name",
    "Email",
    "Activity Number",
    "Activity Title",
    "CEU Value",
    "RID Category",
    "RID Subcategory",
    "Completion Date",
    "Certificate Number",
    "Sponsor Number",
    "Assessment Score",
];

/// `MM/DD/YYYY`, matching the en-US locale date RID's uploader expects.
pub const COMPLETION_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

/// Resolve an inclusive export window to UTC bounds.
///
/// The window runs from `start 00:00:00` to `end 23:59:59`, both inclusive.
pub fn export_window(start: NaiveDate, end: NaiveDate) -> Result<(Timestamp, Timestamp), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "start_date {start} must not be after end_date {end}"
        )));
    }
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let to = end
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| CoreError::Internal("invalid end-of-day time".to_string()))?
        .and_utc();
    Ok((from, to))
}

/// Split a full name into `(first, last)`.
///
/// The first whitespace-separated token is the first name and everything
/// after it is the last name. A single-word name has an empty last name.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

pub fn format_completion_date(completed_at: Timestamp) -> String {
    completed_at.format(COMPLETION_DATE_FORMAT).to_string()
}

/// Render a CEU value the way it appears in the upload (`1`, `0.5`, `0.25`).
pub fn format_ceu_value(value: f64) -> String {
    format!("{value}")
}

/// File name offered in `Content-Disposition`.
pub fn export_filename(start: NaiveDate, end: NaiveDate) -> String {
    format!("RID_CEU_Export_{start}_to_{end}.csv")
}

/// One certificate joined with its holder's profile.
#[derive(Debug, Clone)]
pub struct ExportSource {
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
    pub rid_member_number: Option<String>,
    pub title: String,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: Option<String>,
    pub completed_at: Timestamp,
    pub certificate_number: String,
    pub sponsor_number: String,
    pub assessment_score: Option<i32>,
}

/// One row of the RID export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RidExportRecord {
    pub rid_member_number: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub activity_number: String,
    pub activity_title: String,
    pub ceu_value: f64,
    pub rid_category: String,
    pub rid_subcategory: String,
    pub completion_date: String,
    pub certificate_number: String,
    pub sponsor_number: String,
    pub assessment_score: Option<i32>,
}

impl RidExportRecord {
    pub fn from_source(source: &ExportSource, activity_number: Option<&str>) -> Self {
        let (first_name, last_name) = split_full_name(&source.full_name);
        Self {
            rid_member_number: source.rid_member_number.clone().unwrap_or_default(),
            last_name,
            first_name,
            email: source.email.clone(),
            activity_number: activity_number.unwrap_or_default().to_string(),
            activity_title: source.title.clone(),
            ceu_value: source.ceu_value,
            rid_category: source.rid_category.clone(),
            rid_subcategory: source.rid_subcategory.clone().unwrap_or_default(),
            completion_date: format_completion_date(source.completed_at),
            certificate_number: source.certificate_number.clone(),
            sponsor_number: source.sponsor_number.clone(),
            assessment_score: source.assessment_score,
        }
    }

    /// Fields in [`RID_CSV_HEADERS`] order.
    fn to_row(&self) -> [String; 13] {
        [
            self.rid_member_number.clone(),
            self.last_name.clone(),
            self.first_name.clone(),
            self.email.clone(),
            self.activity_number.clone(),
            self.activity_title.clone(),
            format_ceu_value(self.ceu_value),
            self.rid_category.clone(),
            self.rid_subcategory.clone(),
            self.completion_date.clone(),
            self.certificate_number.clone(),
            self.sponsor_number.clone(),
            self.assessment_score
                .map(|s| s.to_string())
                .unwrap_or_default(),
        ]
    }
}

/// Build export records for every source row.
pub fn build_records(sources: &[ExportSource], activity_number: Option<&str>) -> Vec<RidExportRecord> {
    sources
        .iter()
        .map(|s| RidExportRecord::from_source(s, activity_number))
        .collect()
}

/// Render records as RID batch CSV, header row first.
pub fn write_csv(records: &[RidExportRecord]) -> Result<String, CoreError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(RID_CSV_HEADERS).map_err(csv_error)?;
    for record in records {
        writer.write_record(record.to_row()).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Internal(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Internal(format!("CSV is not UTF-8: {e}")))
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::Internal(format!("CSV write failed: {e}"))
}
