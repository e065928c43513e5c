//! Transcript and concerns logs.
//!
//! Both sequences sit behind a single `RwLock` so that one write lock covers
//! the transcript append and its concern append. Readers therefore never see
//! a concern whose transcript entry is missing, and every read works on a
//! consistent snapshot.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use solace_core::config::RetentionConfig;
use solace_core::{ConcernEntry, SentimentTally, TranscriptEntry};

/// Optional size caps. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Retention {
    pub max_transcript: Option<usize>,
    pub max_concerns: Option<usize>,
}

impl Retention {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

impl From<&RetentionConfig> for Retention {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            max_transcript: config.max_transcript_entries,
            max_concerns: config.max_concern_entries,
        }
    }
}

/// Result of one append.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    pub entry: TranscriptEntry,
    pub concern: Option<ConcernEntry>,
    pub evicted_transcript: u64,
    pub evicted_concerns: u64,
}

/// Sizes and eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub transcript_len: usize,
    pub concerns_len: usize,
    pub evicted_transcript: u64,
    pub evicted_concerns: u64,
}

#[derive(Debug, Default)]
struct Ledger {
    transcript: VecDeque<TranscriptEntry>,
    concerns: VecDeque<ConcernEntry>,
    next_seq: u64,
    evicted_transcript: u64,
    evicted_concerns: u64,
}

/// Append-only store for transcript and concern entries.
///
/// Exposes appends and snapshot reads only. Entries are handed out as
/// clones; no caller ever holds a reference into the store.
#[derive(Debug, Default)]
pub struct InteractionStore {
    ledger: RwLock<Ledger>,
    retention: Retention,
}

impl InteractionStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Retention) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            retention,
        }
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    // A panic while holding the lock cannot leave a half-applied append:
    // every mutation below is a single push or pop. Recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `entry` and, if its label is NEGATIVE, a concern derived from it.
    ///
    /// Assigns the entry's arrival `seq`. Both appends happen under one write
    /// lock, followed by any retention eviction.
    pub fn append(&self, mut entry: TranscriptEntry) -> AppendOutcome {
        let mut ledger = self.write();

        entry.seq = ledger.next_seq;
        ledger.next_seq += 1;

        let escalate = entry.sentiment_label.is_negative();
        let concern = escalate.then(|| ConcernEntry {
            id: Uuid::new_v4(),
            transcript_seq: entry.seq,
            user_id: entry.user_id.clone(),
            text: entry.prompt.clone(),
            recorded_at: Utc::now(),
        });

        ledger.transcript.push_back(entry.clone());
        if let Some(ref c) = concern {
            ledger.concerns.push_back(c.clone());
        }

        let mut evicted_transcript = 0;
        if let Some(max) = self.retention.max_transcript {
            while ledger.transcript.len() > max {
                ledger.transcript.pop_front();
                evicted_transcript += 1;
            }
        }
        // A concern never outlives the transcript entry it was raised from.
        let mut evicted_concerns = 0;
        let oldest = ledger
            .transcript
            .front()
            .map_or(ledger.next_seq, |e| e.seq);
        while ledger
            .concerns
            .front()
            .is_some_and(|c| c.transcript_seq < oldest)
        {
            ledger.concerns.pop_front();
            evicted_concerns += 1;
        }
        if let Some(max) = self.retention.max_concerns {
            while ledger.concerns.len() > max {
                ledger.concerns.pop_front();
                evicted_concerns += 1;
            }
        }
        ledger.evicted_transcript += evicted_transcript;
        ledger.evicted_concerns += evicted_concerns;

        AppendOutcome {
            entry,
            concern,
            evicted_transcript,
            evicted_concerns,
        }
    }

    /// Count known labels across the whole transcript.
    pub fn tally(&self) -> SentimentTally {
        let ledger = self.read();
        tally_of(&ledger.transcript)
    }

    /// Last `n` transcript entries in arrival order.
    pub fn recent_transcript(&self, n: usize) -> Vec<TranscriptEntry> {
        let ledger = self.read();
        last_n(&ledger.transcript, n)
    }

    /// Last `n` concern entries in arrival order.
    pub fn recent_concerns(&self, n: usize) -> Vec<ConcernEntry> {
        let ledger = self.read();
        last_n(&ledger.concerns, n)
    }

    /// Tally, both recent windows and stats, all under one read lock.
    pub fn snapshot(
        &self,
        n: usize,
    ) -> (SentimentTally, Vec<TranscriptEntry>, Vec<ConcernEntry>, StoreStats) {
        let ledger = self.read();
        (
            tally_of(&ledger.transcript),
            last_n(&ledger.transcript, n),
            last_n(&ledger.concerns, n),
            stats_of(&ledger),
        )
    }

    /// Full copy of the retained transcript.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.read().transcript.iter().cloned().collect()
    }

    /// Full copy of the retained concerns.
    pub fn concerns(&self) -> Vec<ConcernEntry> {
        self.read().concerns.iter().cloned().collect()
    }

    pub fn stats(&self) -> StoreStats {
        stats_of(&self.read())
    }
}

fn stats_of(ledger: &Ledger) -> StoreStats {
    StoreStats {
        transcript_len: ledger.transcript.len(),
        concerns_len: ledger.concerns.len(),
        evicted_transcript: ledger.evicted_transcript,
        evicted_concerns: ledger.evicted_concerns,
    }
}

fn tally_of(transcript: &VecDeque<TranscriptEntry>) -> SentimentTally {
    let mut tally = SentimentTally::default();
    for entry in transcript {
        tally.add(&entry.sentiment_label);
    }
    tally
}

fn last_n<T: Clone>(items: &VecDeque<T>, n: usize) -> Vec<T> {
    let skip = items.len().saturating_sub(n);
    items.iter().skip(skip).cloned().collect()
}
