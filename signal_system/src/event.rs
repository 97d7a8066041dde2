//! Record mutation events
//!
//! Stores emit one `DatabaseEvent` per successful create, update or delete,
//! carrying the affected record as a column-name keyed payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::types::PostgresValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Create,
    Update,
    Delete,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventType::Create => "create",
            EventType::Update => "update",
            EventType::Delete => "delete",
        })
    }
}

/// One record mutation on one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseEvent {
    pub event_type: EventType,
    /// Table the record lives in; doubles as its cache scope
    pub table_name: String,
    pub record_id: Option<Uuid>,
    /// Record as stored after a create or update, as last stored for a delete
    pub payload: HashMap<String, PostgresValue>,
    pub timestamp: DateTime<Utc>,
}

impl DatabaseEvent {
    pub fn new(event_type: EventType, table_name: impl Into<String>) -> Self {
        Self {
            event_type,
            table_name: table_name.into(),
            record_id: None,
            payload: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_record_id(mut self, record_id: Uuid) -> Self {
        self.record_id = Some(record_id);
        self
    }

    pub fn with_payload(mut self, payload: HashMap<String, PostgresValue>) -> Self {
        self.payload.extend(payload);
        self
    }

    /// Payload value of `key`, if the record carried one
    pub fn field(&self, key: &str) -> Option<&PostgresValue> {
        self.payload.get(key)
    }
}

impl fmt::Display for DatabaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_id {
            Some(id) => write!(f, "{} {} {}", self.event_type, self.table_name, id),
            None => write!(f, "{} {}", self.event_type, self.table_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_builder_and_display() {
        let id = Uuid::new_v4();
        let mut payload = HashMap::new();
        payload.insert("name".to_string(), PostgresValue::Text("North 1".to_string()));

        let event = DatabaseEvent::new(EventType::Update, "stalls")
            .with_record_id(id)
            .with_payload(payload);

        assert_eq!(event.to_string(), format!("update stalls {}", id));
        assert_eq!(
            event.field("name"),
            Some(&PostgresValue::Text("North 1".to_string()))
        );
        assert!(event.field("barn").is_none());
        assert_eq!(DatabaseEvent::new(EventType::Delete, "horses").to_string(), "delete horses");
    }

    #[test]
    fn test_event_type_wire_names() {
        assert_eq!(serde_json::to_value(EventType::Create).unwrap(), "create");
    }
}
