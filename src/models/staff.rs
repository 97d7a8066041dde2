use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Manager,
    Groom,
    Trainer,
    Veterinarian,
    Farrier,
    Office,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    #[default]
    Active,
    OnLeave,
    Terminated,
}

#[model]
#[table(name = "staff")]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub first_name: String,

    #[field(searchable)]
    pub last_name: String,

    #[field(searchable)]
    pub email: String,

    pub phone: Option<String>,
    pub role: StaffRole,

    #[field(date_filter)]
    pub hire_date: NaiveDate,

    pub hourly_rate_cents: Option<i64>,

    #[field(status)]
    pub status: StaffStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "First name is required"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Last name is required"))]
    pub last_name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    pub phone: Option<String>,
    pub role: StaffRole,
    pub hire_date: NaiveDate,

    #[validate(range(min = 0, message = "Hourly rate cannot be negative"))]
    pub hourly_rate_cents: Option<i64>,

    #[serde(default)]
    pub status: StaffStatus,
}

impl EntityInput for StaffInput {
    type Model = Staff;

    fn into_model(self, meta: RecordMeta) -> Staff {
        Staff {
            id: meta.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            role: self.role,
            hire_date: self.hire_date,
            hourly_rate_cents: self.hourly_rate_cents,
            status: self.status,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[model]
#[table(name = "staff_shifts")]
#[serde(rename_all = "camelCase")]
pub struct StaffShift {
    #[primary_key]
    pub id: Uuid,

    pub staff_id: Uuid,

    #[field(date_filter)]
    pub starts_at: DateTime<Utc>,

    pub ends_at: DateTime<Utc>,

    #[field(searchable)]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_shift_window"))]
pub struct StaffShiftInput {
    pub staff_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

fn validate_shift_window(input: &StaffShiftInput) -> Result<(), ValidationError> {
    ordered_window(
        &input.starts_at,
        Some(&input.ends_at),
        "Shift cannot end before it starts",
    )
}

impl EntityInput for StaffShiftInput {
    type Model = StaffShift;

    fn into_model(self, meta: RecordMeta) -> StaffShift {
        StaffShift {
            id: meta.id,
            staff_id: self.staff_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
