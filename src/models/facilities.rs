use super::{EntityInput, RecordMeta, not_blank};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use table_derive::model;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityStatus {
    #[default]
    Operational,
    Maintenance,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Statuses of tasks that still need doing
    pub const OPEN: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::InProgress];
}

/// Arena, barn, wash rack and the like
#[model]
#[table(name = "facilities")]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub name: String,

    #[field(searchable)]
    pub facility_type: String,

    pub capacity: Option<i32>,
    pub description: Option<String>,

    #[field(status)]
    pub status: FacilityStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacilityInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Facility type is required"))]
    pub facility_type: String,

    #[validate(range(min = 0, message = "Capacity cannot be negative"))]
    pub capacity: Option<i32>,

    pub description: Option<String>,

    #[serde(default)]
    pub status: FacilityStatus,
}

impl EntityInput for FacilityInput {
    type Model = Facility;

    fn into_model(self, meta: RecordMeta) -> Facility {
        Facility {
            id: meta.id,
            name: self.name,
            facility_type: self.facility_type,
            capacity: self.capacity,
            description: self.description,
            status: self.status,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

#[model]
#[table(name = "maintenance_tasks")]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTask {
    #[primary_key]
    pub id: Uuid,

    #[field(searchable)]
    pub title: String,

    pub description: Option<String>,
    pub facility_id: Option<Uuid>,
    pub assigned_staff_id: Option<Uuid>,
    pub priority: TaskPriority,

    #[field(status)]
    pub status: TaskStatus,

    #[field(date_filter)]
    pub due_date: Option<NaiveDate>,

    pub completed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTaskInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,

    pub description: Option<String>,
    pub facility_id: Option<Uuid>,
    pub assigned_staff_id: Option<Uuid>,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default)]
    pub status: TaskStatus,

    pub due_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
}

impl EntityInput for MaintenanceTaskInput {
    type Model = MaintenanceTask;

    fn into_model(self, meta: RecordMeta) -> MaintenanceTask {
        MaintenanceTask {
            id: meta.id,
            title: self.title,
            description: self.description,
            facility_id: self.facility_id,
            assigned_staff_id: self.assigned_staff_id,
            priority: self.priority,
            status: self.status,
            due_date: self.due_date,
            completed_date: self.completed_date,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}
