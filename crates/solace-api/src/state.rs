//! Application state shared across all route handlers.
//!
//! AppState wires the store, recorder, pipeline and view together and is
//! passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use solace_chat::{PipelineConfig, SessionPipeline};
use solace_core::{DomainEvent, SolaceConfig};
use solace_models::{Classifier, Generator};
use solace_store::{AggregationView, InteractionRecorder, InteractionStore, Retention};

use crate::auth::SessionRegistry;

/// Capacity of the store event channel feeding `/api/stream`.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared application state.
///
/// All fields are cheap to clone; handler tasks each get their own copy.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SolaceConfig>,
    /// Generate, classify, record.
    pub pipeline: Arc<SessionPipeline>,
    /// Dashboard reads.
    pub view: AggregationView,
    pub sessions: Arc<SessionRegistry>,
    /// Store events for SSE subscribers.
    pub event_tx: broadcast::Sender<DomainEvent>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build the state around the given model adapters.
    ///
    /// Creates an empty store with the configured retention, a recorder that
    /// publishes on `event_tx`, and a session registry with the configured TTL.
    pub fn new(
        config: SolaceConfig,
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let store = Arc::new(InteractionStore::with_retention(Retention::from(
            &config.retention,
        )));
        let recorder = InteractionRecorder::new(Arc::clone(&store)).with_events(event_tx.clone());
        let pipeline = SessionPipeline::new(
            generator,
            classifier,
            recorder,
            PipelineConfig::from(&config.models),
        );
        let view = AggregationView::new(store, config.retention.recent_limit);
        let sessions = SessionRegistry::new(Duration::from_secs(
            config.auth.session_ttl_minutes.saturating_mul(60),
        ));

        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            view,
            sessions: Arc::new(sessions),
            event_tx,
            start_time: Instant::now(),
        }
    }
}
