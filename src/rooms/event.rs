//! # Room Events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A change event published into a document's room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    /// Document id (room topic)
    pub document_id: String,

    /// Event name (user-defined, e.g. "document-updated")
    pub event: String,

    /// Payload
    pub payload: Value,

    /// Publishing user, if authenticated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Uuid>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl RoomEvent {
    pub fn new(
        document_id: impl Into<String>,
        event: impl Into<String>,
        payload: Value,
        sender_id: Option<Uuid>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            event: event.into(),
            payload,
            sender_id,
            timestamp: Utc::now(),
        }
    }

    /// Get the topic string for this event
    pub fn topic(&self) -> String {
        format!("room:{}", self.document_id)
    }

    /// Serialize to wire format
    pub fn to_wire_format(&self) -> Value {
        serde_json::json!({
            "type": "room_event",
            "topic": self.topic(),
            "event": self.event,
            "payload": self.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topic() {
        let event = RoomEvent::new("doc-42", "cursor-move", json!({"x": 10}), None);
        assert_eq!(event.topic(), "room:doc-42");
    }

    #[test]
    fn test_wire_format() {
        let event = RoomEvent::new("doc-42", "document-updated", json!({"version": 2}), None);

        let wire = event.to_wire_format();
        assert_eq!(wire["type"], "room_event");
        assert_eq!(wire["topic"], "room:doc-42");
        assert_eq!(wire["event"], "document-updated");
        assert_eq!(wire["payload"]["version"], 2);
    }

    #[test]
    fn test_sender_omitted_when_absent() {
        let event = RoomEvent::new("doc-1", "ping", json!({}), None);
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("sender_id").is_none());
    }
}
