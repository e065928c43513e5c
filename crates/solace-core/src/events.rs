use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SentimentLabel, Timestamp};

/// Domain events emitted after the interaction store changes.
///
/// Consumed by the dashboard SSE stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum DomainEvent {
    /// A transcript entry was appended.
    InteractionRecorded {
        entry_id: Uuid,
        seq: u64,
        user_id: String,
        label: SentimentLabel,
        confidence: f64,
        timestamp: Timestamp,
    },

    /// A negative exchange was escalated to the concerns log.
    ConcernRaised {
        concern_id: Uuid,
        transcript_seq: u64,
        user_id: String,
        text: String,
        timestamp: Timestamp,
    },

    /// Retention caps dropped old entries.
    EntriesEvicted {
        transcript: u64,
        concerns: u64,
        timestamp: Timestamp,
    },
}

impl DomainEvent {
    /// SSE event name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::InteractionRecorded { .. } => "interaction",
            DomainEvent::ConcernRaised { .. } => "concern",
            DomainEvent::EntriesEvicted { .. } => "eviction",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DomainEvent::ConcernRaised {
            concern_id: Uuid::new_v4(),
            transcript_seq: 4,
            user_id: "admin".to_string(),
            text: "this is awful".to_string(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "concern_raised");
        assert_eq!(value["transcript_seq"], 4);
        assert_eq!(event.name(), "concern");
    }

    #[test]
    fn test_interaction_event_label_is_string() {
        let event = DomainEvent::InteractionRecorded {
            entry_id: Uuid::new_v4(),
            seq: 0,
            user_id: "admin".to_string(),
            label: SentimentLabel::Positive,
            confidence: 0.91,
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["label"], "POSITIVE");
        assert_eq!(event.name(), "interaction");
    }
}
