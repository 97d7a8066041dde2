use super::{EntityInput, RecordMeta, not_blank, ordered_window};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Lesson,
    Show,
    Clinic,
    VetVisit,
    Farrier,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

#[model]
#[table(name = "events")]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub title: String,

    pub description: Option<String>,
    pub kind: EventKind,

    #[field(date_filter)]
    pub starts_at: DateTime<Utc>,

    pub ends_at: Option<DateTime<Utc>>,

    #[field(searchable)]
    pub location: Option<String>,

    #[field(status)]
    pub status: EventStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_event_window"))]
pub struct EventInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
    pub kind: EventKind,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub location: Option<String>,

    #[serde(default)]
    pub status: EventStatus,
}

fn validate_event_window(input: &EventInput) -> Result<(), ValidationError> {
    ordered_window(
        &input.starts_at,
        input.ends_at.as_ref(),
        "Event cannot end before it starts",
    )
}

impl EntityInput for EventInput {
    type Model = Event;

    fn into_model(self, meta: RecordMeta) -> Event {
        Event {
            id: meta.id,
            title: self.title,
            description: self.description,
            kind: self.kind,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            location: self.location,
            status: self.status,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
