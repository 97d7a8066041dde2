use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use table_derive::model;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    #[default]
    Financial,
    Occupancy,
    Maintenance,
    Boarders,
    Events,
}

impl ReportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Financial => "Financial",
            ReportKind::Occupancy => "Occupancy",
            ReportKind::Maintenance => "Maintenance",
            ReportKind::Boarders => "Boarders",
            ReportKind::Events => "Events",
        }
    }
}

/// Stored output of `reports.generate`
#[model]
#[derive(Default)]
#[table(name = "reports")]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub title: String,

    pub kind: ReportKind,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,

    #[field(date_filter)]
    pub generated_at: DateTime<Utc>,

    pub summary: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Manually maintained report (generated ones come from `reports.generate`)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_report_range"))]
pub struct ReportInput {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "Title is required"),
        length(max = 200, message = "Title is too long")
    )]
    pub title: String,

    pub kind: ReportKind,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,

    #[serde(default)]
    pub summary: Value,
}

fn validate_report_range(input: &ReportInput) -> Result<(), ValidationError> {
    match &input.date_from {
        Some(from) => ordered_window(from, input.date_to.as_ref(), "Date range is reversed"),
        None => Ok(()),
    }
}

impl EntityInput for ReportInput {
    type Model = Report;

    fn into_model(self, meta: RecordMeta) -> Report {
        let summary = match self.summary {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        Report {
            id: meta.id,
            title: self.title,
            kind: self.kind,
            date_from: self.date_from,
            date_to: self.date_to,
            generated_at: meta.updated_at,
            summary,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
