pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::SolaceConfig;
pub use error::{Result, SolaceError};
pub use events::DomainEvent;
pub use types::*;
