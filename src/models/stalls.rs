use super::{EntityInput, RecordMeta, not_blank};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallStatus {
    #[default]
    Available,
    Occupied,
    Maintenance,
}

/// A housing unit assignable to one horse at a time
#[model]
#[table(name = "stalls")]
#[serde(rename_all = "camelCase")]
pub struct Stall {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    #[field(searchable)]
    pub barn: String,

    pub size: Option<String>,
    pub monthly_rate_cents: i64,

    #[field(status)]
    pub status: StallStatus,

    pub horse_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StallInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Barn is required"))]
    pub barn: String,

    pub size: Option<String>,

    #[validate(range(min = 0, message = "Monthly rate cannot be negative"))]
    pub monthly_rate_cents: i64,

    #[serde(default)]
    pub status: StallStatus,

    pub horse_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl EntityInput for StallInput {
    type Model = Stall;

    fn into_model(self, meta: RecordMeta) -> Stall {
        Stall {
            id: meta.id,
            name: self.name,
            barn: self.barn,
            size: self.size,
            monthly_rate_cents: self.monthly_rate_cents,
            status: self.status,
            horse_id: self.horse_id,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
