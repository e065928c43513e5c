//! Model adapters for Solace.
//!
//! Thin shims over the external text-generation model and sentiment
//! classifier. Each adapter normalizes its backend's output into the shapes
//! the rest of the service works with: a reply `String` and a [`Judgment`].
//!
//! - [`Generator`] / [`Classifier`]: object-safe async traits
//! - [`EchoGenerator`] / [`LexiconClassifier`]: offline backends
//! - [`HttpGenerator`] / [`HttpClassifier`]: hosted inference endpoints
//!
//! [`Judgment`]: solace_core::Judgment

pub mod classifier;
pub mod error;
pub mod generator;
pub mod http;

use std::sync::Arc;

use solace_core::config::{ClassifierBackend, GeneratorBackend, ModelsConfig};

pub use classifier::{Classifier, HttpClassifier, LexiconClassifier};
pub use error::ModelError;
pub use generator::{EchoGenerator, Generator, HttpGenerator};

/// Build the generator selected by `config.generator`.
pub fn build_generator(config: &ModelsConfig) -> Result<Arc<dyn Generator>, ModelError> {
    let generator: Arc<dyn Generator> = match config.generator {
        GeneratorBackend::Echo => Arc::new(EchoGenerator::new(config.max_new_tokens)),
        GeneratorBackend::Http => Arc::new(HttpGenerator::from_config(config)?),
    };
    tracing::info!(backend = generator.name(), "Generator adapter ready");
    Ok(generator)
}

/// Build the classifier selected by `config.classifier`.
pub fn build_classifier(config: &ModelsConfig) -> Result<Arc<dyn Classifier>, ModelError> {
    let classifier: Arc<dyn Classifier> = match config.classifier {
        ClassifierBackend::Lexicon => Arc::new(LexiconClassifier::new()),
        ClassifierBackend::Http => Arc::new(HttpClassifier::from_config(config)?),
    };
    tracing::info!(backend = classifier.name(), "Classifier adapter ready");
    Ok(classifier)
}
