//! Session pipeline for Solace.
//!
//! Takes one inbound message and a caller identity, obtains a reply and a
//! sentiment judgment from the model adapters, records the exchange and
//! returns the reply.

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{PipelineConfig, SessionPipeline};
