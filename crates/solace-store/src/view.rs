//! Read-side aggregation for the operator dashboard.

use std::sync::Arc;

use serde::Serialize;

use solace_core::{ConcernEntry, SentimentTally, TranscriptEntry};

use crate::store::{InteractionStore, StoreStats};

/// Everything the dashboard shows, taken from one consistent snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub sentiment_counts: SentimentTally,
    pub chat_history: Vec<TranscriptEntry>,
    pub concerns: Vec<ConcernEntry>,
    pub stats: StoreStats,
}

/// Pure read operations over an [`InteractionStore`].
#[derive(Debug, Clone)]
pub struct AggregationView {
    store: Arc<InteractionStore>,
    recent_limit: usize,
}

impl AggregationView {
    /// `recent_limit` is the window used by [`AggregationView::dashboard`].
    pub fn new(store: Arc<InteractionStore>, recent_limit: usize) -> Self {
        Self {
            store,
            recent_limit,
        }
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    pub fn tally(&self) -> SentimentTally {
        self.store.tally()
    }

    pub fn recent_transcript(&self, n: usize) -> Vec<TranscriptEntry> {
        self.store.recent_transcript(n)
    }

    pub fn recent_concerns(&self, n: usize) -> Vec<ConcernEntry> {
        self.store.recent_concerns(n)
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Tally and the last `recent_limit` transcript and concern entries.
    pub fn dashboard(&self) -> DashboardSnapshot {
        let (sentiment_counts, chat_history, concerns, stats) =
            self.store.snapshot(self.recent_limit);
        DashboardSnapshot {
            sentiment_counts,
            chat_history,
            concerns,
            stats,
        }
    }
}
