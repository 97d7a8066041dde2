use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, NaiveDate, Utc};
use table_derive::model;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[model]
#[table(name = "visitors")]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub first_name: String,

    #[field(searchable)]
    pub last_name: String,

    pub email: Option<String>,
    pub phone: Option<String>,

    #[field(searchable)]
    pub purpose: String,

    #[field(date_filter)]
    pub visit_date: NaiveDate,

    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub host_staff_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_visit_window"))]
pub struct VisitorInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "First name is required"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Purpose is required"))]
    pub purpose: String,

    pub visit_date: NaiveDate,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub host_staff_id: Option<Uuid>,
}

fn validate_visit_window(input: &VisitorInput) -> Result<(), ValidationError> {
    match &input.check_in {
        Some(check_in) => ordered_window(
            check_in,
            input.check_out.as_ref(),
            "Check-out cannot be before check-in",
        ),
        None => Ok(()),
    }
}

impl EntityInput for VisitorInput {
    type Model = Visitor;

    fn into_model(self, meta: RecordMeta) -> Visitor {
        Visitor {
            id: meta.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            purpose: self.purpose,
            visit_date: self.visit_date,
            check_in: self.check_in,
            check_out: self.check_out,
            host_staff_id: self.host_staff_id,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
