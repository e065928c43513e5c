//! In-memory interaction store for Solace.
//!
//! - [`InteractionStore`]: the transcript and concerns logs behind one lock
//! - [`InteractionRecorder`]: appends an exchange and escalates negative ones
//! - [`AggregationView`]: tally and recent-entry reads for the dashboard
//!
//! State lives for the lifetime of the process. Nothing is persisted.

pub mod recorder;
pub mod store;
pub mod view;

pub use recorder::InteractionRecorder;
pub use store::{AppendOutcome, InteractionStore, Retention, StoreStats};
pub use view::{AggregationView, DashboardSnapshot};
