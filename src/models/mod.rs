//! Dashboard entities
//!
//! One `#[model]` struct per table, plus the validated input each one is
//! created and updated from. Inputs never carry the id or timestamps;
//! [`RecordMeta`] supplies those when an input becomes a stored record.

mod billing;
mod boarders;
mod events;
mod facilities;
mod horses;
mod pastures;
mod reports;
mod staff;
mod stalls;
mod users;
mod visitors;

pub use billing::{Budget, BudgetInput, Invoice, InvoiceInput, InvoiceStatus, Payment, PaymentInput, PaymentMethod};
pub use boarders::{Boarder, BoarderInput, BoarderStatus};
pub use events::{Event, EventInput, EventKind, EventStatus};
pub use facilities::{
    Facility, FacilityInput, FacilityStatus, MaintenanceTask, MaintenanceTaskInput, TaskPriority, TaskStatus,
};
pub use horses::{Horse, HorseGender, HorseInput};
pub use pastures::{Pasture, PastureInput, PastureRotation, PastureRotationInput, PastureStatus};
pub use reports::{Report, ReportInput, ReportKind};
pub use staff::{Staff, StaffInput, StaffRole, StaffShift, StaffShiftInput, StaffStatus};
pub use stalls::{Stall, StallInput, StallStatus};
pub use users::{RegisterInput, User};
pub use visitors::{Visitor, VisitorInput};

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use store_object::TableMetadata;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Current time at the precision PostgreSQL stores (microseconds)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Serialized name of an enum value, e.g. `"in_progress"`
pub fn wire_name<E: Serialize>(value: &E) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(name)) => name,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

/// Rejects empty and whitespace-only text
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Identity and timestamps assigned by the server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    /// Fresh id, created and updated now
    pub fn fresh() -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Keeps the id and creation time of `existing`, updated now
    pub fn updating<T: Timestamped>(existing: &T) -> Self {
        Self {
            id: existing.extract_id(),
            created_at: existing.created_at(),
            updated_at: now(),
        }
    }
}

/// Models that record when they were created
pub trait Timestamped: TableMetadata {
    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_timestamped {
    ($($model:ty),* $(,)?) => {
        $(
            impl Timestamped for $model {
                fn created_at(&self) -> DateTime<Utc> {
                    self.created_at
                }
            }
        )*
    };
}

impl_timestamped!(
    Boarder,
    Horse,
    Stall,
    Pasture,
    PastureRotation,
    Invoice,
    Payment,
    Budget,
    Event,
    Facility,
    MaintenanceTask,
    Staff,
    StaffShift,
    Visitor,
    Report,
    User,
);

/// Validated payload of `<table>.create` and `<table>.update`
pub trait EntityInput: DeserializeOwned + Validate + Send + 'static {
    type Model: Timestamped;

    fn into_model(self, meta: RecordMeta) -> Self::Model;
}

/// Fails when `end` is set and earlier than `start`
pub(crate) fn ordered_window<T: PartialOrd>(
    start: &T,
    end: Option<&T>,
    message: &'static str,
) -> Result<(), ValidationError> {
    match end {
        Some(end) if end < start => {
            let mut error = ValidationError::new("window");
            error.message = Some(Cow::Borrowed(message));
            Err(error)
        }
        _ => Ok(()),
    }
}
