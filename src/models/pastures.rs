use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PastureStatus {
    #[default]
    Active,
    Resting,
    Maintenance,
}

#[model]
#[table(name = "pastures")]
#[serde(rename_all = "camelCase")]
pub struct Pasture {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    pub acreage: f64,
    pub grass_type: Option<String>,
    pub capacity: i32,

    #[field(status)]
    pub status: PastureStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PastureInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(range(min = 0.0, message = "Acreage cannot be negative"))]
    pub acreage: f64,

    pub grass_type: Option<String>,

    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: i32,

    #[serde(default)]
    pub status: PastureStatus,

    pub notes: Option<String>,
}

impl EntityInput for PastureInput {
    type Model = Pasture;

    fn into_model(self, meta: RecordMeta) -> Pasture {
        Pasture {
            id: meta.id,
            name: self.name,
            acreage: self.acreage,
            grass_type: self.grass_type,
            capacity: self.capacity,
            status: self.status,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Scheduled stay of one horse on one pasture
#[model]
#[table(name = "pasture_rotations")]
#[serde(rename_all = "camelCase")]
pub struct PastureRotation {
    #[primary_key]
    pub id: Uuid,

    pub pasture_id: Uuid,
    pub horse_id: Uuid,

    #[field(date_filter)]
    pub start_date: NaiveDate,

    pub end_date: Option<NaiveDate>,

    #[field(searchable)]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_rotation_window"))]
pub struct PastureRotationInput {
    pub pasture_id: Uuid,
    pub horse_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn validate_rotation_window(input: &PastureRotationInput) -> Result<(), ValidationError> {
    ordered_window(
        &input.start_date,
        input.end_date.as_ref(),
        "End date must not be before start date",
    )
}

impl EntityInput for PastureRotationInput {
    type Model = PastureRotation;

    fn into_model(self, meta: RecordMeta) -> PastureRotation {
        PastureRotation {
            id: meta.id,
            pasture_id: self.pasture_id,
            horse_id: self.horse_id,
            start_date: self.start_date,
            end_date: self.end_date,
            notes: self.notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rotation_window_must_be_ordered() {
        let input: PastureRotationInput = serde_json::from_value(json!({
            "pastureId": Uuid::new_v4(),
            "horseId": Uuid::new_v4(),
            "startDate": "2024-05-10",
            "endDate": "2024-05-01"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("__all__"));

        let open_ended: PastureRotationInput = serde_json::from_value(json!({
            "pastureId": Uuid::new_v4(),
            "horseId": Uuid::new_v4(),
            "startDate": "2024-05-10"
        }))
        .unwrap();
        assert!(open_ended.validate().is_ok());
    }

    #[test]
    fn test_negative_acreage_is_rejected() {
        let input: PastureInput = serde_json::from_value(json!({
            "name": "Back forty",
            "acreage": -1.5,
            "capacity": 4
        }))
        .unwrap();
        assert!(input.validate().unwrap_err().field_errors().contains_key("acreage"));
    }
}
