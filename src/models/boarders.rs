use super::{EntityInput, RecordMeta, not_blank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoarderStatus {
    #[default]
    Active,
    Inactive,
    Pending,
}

/// A customer who stables horses at the facility
#[model]
#[table(name = "boarders")]
#[serde(rename_all = "camelCase")]
pub struct Boarder {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub first_name: String,

    #[field(searchable)]
    pub last_name: String,

    #[field(searchable)]
    pub email: String,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,

    #[field(date_filter)]
    pub start_date: NaiveDate,

    #[field(status)]
    pub status: BoarderStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BoarderInput {
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
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub start_date: NaiveDate,

    #[serde(default)]
    pub status: BoarderStatus,

    pub notes: Option<String>,
}

impl EntityInput for BoarderInput {
    type Model = Boarder;

    fn into_model(self, meta: RecordMeta) -> Boarder {
        Boarder {
            id: meta.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            emergency_contact: self.emergency_contact,
            start_date: self.start_date,
            status: self.status,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
