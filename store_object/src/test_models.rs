//! Models shared by the unit tests of this crate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StallStatus {
    Available,
    Occupied,
    Maintenance,
}

#[table_derive::model]
#[table(name = "stalls")]
#[serde(rename_all = "camelCase")]
pub struct Stall {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    #[field(searchable)]
    pub barn: String,

    #[field(status)]
    pub status: StallStatus,

    pub monthly_rate_cents: i64,

    pub horse_id: Option<Uuid>,

    #[field(date_filter)]
    pub available_from: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
}

impl Stall {
    pub fn sample(name: &str, barn: &str, status: StallStatus, rate: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            barn: barn.to_string(),
            status,
            monthly_rate_cents: rate,
            horse_id: None,
            available_from: None,
            created_at: Utc::now(),
        }
    }
}
