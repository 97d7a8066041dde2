use super::{EntityInput, RecordMeta, not_blank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorseGender {
    Mare,
    Stallion,
    Gelding,
    Filly,
    Colt,
}

#[model]
#[table(name = "horses")]
#[serde(rename_all = "camelCase")]
pub struct Horse {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    #[field(searchable)]
    pub breed: String,

    #[field(date_filter)]
    pub date_of_birth: NaiveDate,

    pub gender: HorseGender,

    #[field(searchable)]
    pub color: String,

    pub boarder_id: Option<Uuid>,
    pub stall_id: Option<Uuid>,
    pub pasture_id: Option<Uuid>,
    pub medical_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HorseInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Breed is required"))]
    pub breed: String,

    pub date_of_birth: NaiveDate,
    pub gender: HorseGender,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Color is required"))]
    pub color: String,

    pub boarder_id: Option<Uuid>,
    pub stall_id: Option<Uuid>,
    pub pasture_id: Option<Uuid>,
    pub medical_notes: Option<String>,
}

impl EntityInput for HorseInput {
    type Model = Horse;

    fn into_model(self, meta: RecordMeta) -> Horse {
        Horse {
            id: meta.id,
            name: self.name,
            breed: self.breed,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            color: self.color,
            boarder_id: self.boarder_id,
            stall_id: self.stall_id,
            pasture_id: self.pasture_id,
            medical_notes: self.medical_notes,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use store_object::TableMetadata;

    #[test]
    fn test_horse_columns() {
        assert_eq!(Horse::table_name(), "horses");
        let searchable: Vec<_> = Horse::searchable_columns().iter().map(|c| c.name).collect();
        assert_eq!(searchable, vec!["name", "breed", "color"]);
        assert_eq!(Horse::date_filter_column().unwrap().json_key, "dateOfBirth");
        assert!(Horse::status_column().is_none());
    }

    #[test]
    fn test_input_becomes_model_with_meta() {
        let input: HorseInput = serde_json::from_value(json!({
            "name": "Star",
            "breed": "Arabian",
            "dateOfBirth": "2020-01-01",
            "gender": "mare",
            "color": "bay"
        }))
        .unwrap();
        assert!(input.validate().is_ok());

        let meta = RecordMeta::fresh();
        let horse = input.into_model(meta);
        assert_eq!(horse.id, meta.id);
        assert_eq!(horse.gender, HorseGender::Mare);
        assert_eq!(horse.created_at, horse.updated_at);
        assert_eq!(horse.stall_id, None);
    }

    #[test]
    fn test_missing_name_fails_validation() {
        let input: HorseInput = serde_json::from_value(json!({
            "breed": "Arabian",
            "dateOfBirth": "2020-01-01",
            "gender": "mare",
            "color": "bay"
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }
}
