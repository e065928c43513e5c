//! Interaction recorder: turns one completed exchange into store entries.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use solace_core::{DomainEvent, Judgment, TranscriptEntry};

use crate::store::InteractionStore;

/// Records exchanges and escalates negative ones to the concerns log.
#[derive(Debug, Clone)]
pub struct InteractionRecorder {
    store: Arc<InteractionStore>,
    events: Option<broadcast::Sender<DomainEvent>>,
}

impl InteractionRecorder {
    pub fn new(store: Arc<InteractionStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Publish a [`DomainEvent`] for every append on `tx`.
    pub fn with_events(mut self, tx: broadcast::Sender<DomainEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn store(&self) -> &Arc<InteractionStore> {
        &self.store
    }

    /// Append a transcript entry for the exchange, plus a concern entry when
    /// the judgment is `NEGATIVE`. Never fails.
    pub fn record(
        &self,
        user_id: &str,
        prompt: &str,
        reply: &str,
        judgment: &Judgment,
    ) -> TranscriptEntry {
        let draft = TranscriptEntry {
            id: Uuid::new_v4(),
            seq: 0,
            user_id: user_id.to_string(),
            prompt: prompt.to_string(),
            reply: reply.to_string(),
            sentiment_label: judgment.label.clone(),
            confidence: judgment.confidence,
            recorded_at: Utc::now(),
        };

        let outcome = self.store.append(draft);
        let entry = outcome.entry;

        tracing::debug!(
            user = %entry.user_id,
            seq = entry.seq,
            label = %entry.sentiment_label,
            "Interaction recorded"
        );
        self.publish(DomainEvent::InteractionRecorded {
            entry_id: entry.id,
            seq: entry.seq,
            user_id: entry.user_id.clone(),
            label: entry.sentiment_label.clone(),
            confidence: entry.confidence,
            timestamp: entry.recorded_at,
        });

        if let Some(concern) = outcome.concern {
            tracing::info!(
                user = %concern.user_id,
                transcript_seq = concern.transcript_seq,
                "Negative message escalated to concerns"
            );
            self.publish(DomainEvent::ConcernRaised {
                concern_id: concern.id,
                transcript_seq: concern.transcript_seq,
                user_id: concern.user_id,
                text: concern.text,
                timestamp: concern.recorded_at,
            });
        }

        if outcome.evicted_transcript > 0 || outcome.evicted_concerns > 0 {
            tracing::debug!(
                transcript = outcome.evicted_transcript,
                concerns = outcome.evicted_concerns,
                "Retention evicted old entries"
            );
            self.publish(DomainEvent::EntriesEvicted {
                transcript: outcome.evicted_transcript,
                concerns: outcome.evicted_concerns,
                timestamp: Utc::now(),
            });
        }

        entry
    }

    fn publish(&self, event: DomainEvent) {
        if let Some(ref tx) = self.events {
            // No subscribers is the normal case between dashboard sessions.
            let _ = tx.send(event);
        }
    }
}
