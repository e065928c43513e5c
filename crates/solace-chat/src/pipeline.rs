//! Session pipeline: the orchestrator between the HTTP layer, the model
//! adapters and the interaction recorder.
//!
//! Generation and classification both run on the raw message and run
//! concurrently. The exchange is recorded only when both succeed. No store
//! lock is held while an adapter call is in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use solace_core::config::ModelsConfig;
use solace_core::TranscriptEntry;
use solace_models::{Classifier, Generator, ModelError};
use solace_store::InteractionRecorder;

use crate::error::PipelineError;

/// Limits applied per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on each adapter call.
    pub adapter_timeout: Duration,
    pub max_message_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&ModelsConfig::default())
    }
}

impl From<&ModelsConfig> for PipelineConfig {
    fn from(config: &ModelsConfig) -> Self {
        Self {
            adapter_timeout: Duration::from_secs(config.timeout_secs),
            max_message_chars: config.max_message_chars,
        }
    }
}

/// Orchestrates one message through generate, classify and record.
#[derive(Clone)]
pub struct SessionPipeline {
    generator: Arc<dyn Generator>,
    classifier: Arc<dyn Classifier>,
    recorder: InteractionRecorder,
    config: PipelineConfig,
}

impl SessionPipeline {
    pub fn new(
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn Classifier>,
        recorder: InteractionRecorder,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            classifier,
            recorder,
            config,
        }
    }

    pub fn recorder(&self) -> &InteractionRecorder {
        &self.recorder
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Handle `message` from `user_id` and return the generated reply.
    ///
    /// `None` (or an empty id) means the caller has no session; the adapters
    /// are not called and nothing is recorded.
    pub async fn handle(
        &self,
        user_id: Option<&str>,
        message: &str,
    ) -> Result<String, PipelineError> {
        self.exchange(user_id, message).await.map(|entry| entry.reply)
    }

    /// Like [`SessionPipeline::handle`] but returns the recorded entry, which
    /// also carries the judgment.
    pub async fn exchange(
        &self,
        user_id: Option<&str>,
        message: &str,
    ) -> Result<TranscriptEntry, PipelineError> {
        let user_id = match user_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::debug!("Rejected message from unauthenticated caller");
                return Err(PipelineError::Unauthenticated);
            }
        };

        if message.trim().is_empty() {
            return Err(PipelineError::MalformedRequest(
                "message must not be empty".to_string(),
            ));
        }
        if message.chars().count() > self.config.max_message_chars {
            return Err(PipelineError::MessageTooLong(self.config.max_message_chars));
        }

        let limit = self.config.adapter_timeout;
        let (reply, judgment) = tokio::join!(
            within(limit, self.generator.generate(message)),
            within(limit, self.classifier.classify(message)),
        );

        let reply = reply.map_err(|e| {
            tracing::warn!(user = %user_id, backend = self.generator.name(), error = %e, "Generation failed");
            PipelineError::Generation(e)
        })?;
        let judgment = judgment.map_err(|e| {
            tracing::warn!(user = %user_id, backend = self.classifier.name(), error = %e, "Classification failed");
            PipelineError::Classification(e)
        })?;

        let entry = self.recorder.record(user_id, message, &reply, &judgment);
        tracing::info!(
            user = %user_id,
            seq = entry.seq,
            label = %judgment.label,
            confidence = judgment.confidence,
            "Message handled"
        );
        Ok(entry)
    }
}

/// Run an adapter call with a deadline. Timing out counts as a model error.
async fn within<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ModelError>>,
) -> Result<T, ModelError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ModelError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use solace_core::{Judgment, SentimentLabel};
    use solace_store::InteractionStore;

    // -- Test adapters --

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("reply to {}", prompt))
        }
    }

    /// Returns labels from a fixed script, cycling by call number.
    struct ScriptedClassifier {
        labels: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl ScriptedClassifier {
        fn new(labels: Vec<&'static str>) -> Self {
            Self {
                labels,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn classify(&self, _text: &str) -> Result<Judgment, ModelError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Judgment::new(self.labels[n % self.labels.len()], 0.93))
        }
    }

    /// Labels by message content: anything containing "bad" is negative.
    struct KeywordClassifier;

    #[async_trait]
    impl Classifier for KeywordClassifier {
        fn name(&self) -> &'static str {
            "keyword"
        }

        async fn classify(&self, text: &str) -> Result<Judgment, ModelError> {
            tokio::task::yield_now().await;
            let label = if text.contains("bad") { "NEGATIVE" } else { "POSITIVE" };
            Ok(Judgment::new(label, 0.8))
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl Classifier for FailingClassifier {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn classify(&self, _text: &str) -> Result<Judgment, ModelError> {
            Err(ModelError::Unavailable("classifier offline".to_string()))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl Generator for FailingGenerator {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            Err(ModelError::Unavailable("generator offline".to_string()))
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl Generator for SlowGenerator {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok("too late".to_string())
        }
    }

    fn pipeline_with(
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn Classifier>,
    ) -> (SessionPipeline, Arc<InteractionStore>) {
        let store = Arc::new(InteractionStore::new());
        let pipeline = SessionPipeline::new(
            generator,
            classifier,
            InteractionRecorder::new(Arc::clone(&store)),
            PipelineConfig {
                adapter_timeout: Duration::from_millis(200),
                max_message_chars: 50,
            },
        );
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_handle_returns_reply_and_records() {
        let (pipeline, store) = pipeline_with(
            Arc::new(CountingGenerator::default()),
            Arc::new(ScriptedClassifier::new(vec!["POSITIVE"])),
        );

        let reply = pipeline.handle(Some("admin"), "hello").await.unwrap();
        assert_eq!(reply, "reply to hello");

        let transcript = store.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].user_id, "admin");
        assert_eq!(transcript[0].prompt, "hello");
        assert_eq!(transcript[0].reply, "reply to hello");
        assert_eq!(transcript[0].sentiment_label, SentimentLabel::Positive);
        assert!(store.concerns().is_empty());
    }

    #[tokio::test]
    async fn test_negative_message_raises_concern() {
        let (pipeline, store) = pipeline_with(
            Arc::new(CountingGenerator::default()),
            Arc::new(ScriptedClassifier::new(vec!["NEGATIVE"])),
        );

        let entry = pipeline.exchange(Some("admin"), "I feel bad").await.unwrap();
        assert_eq!(entry.judgment(), Judgment::new("NEGATIVE", 0.93));

        let concerns = store.concerns();
        assert_eq!(concerns.len(), 1);
        assert_eq!(concerns[0].user_id, "admin");
        assert_eq!(concerns[0].text, "I feel bad");
    }

    #[tokio::test]
    async fn test_unauthenticated_never_calls_adapters() {
        let generator = Arc::new(CountingGenerator::default());
        let classifier = Arc::new(ScriptedClassifier::new(vec!["NEGATIVE"]));
        let (pipeline, store) = pipeline_with(generator.clone(), classifier.clone());

        for user in [None, Some("")] {
            let result = pipeline.handle(user, "hello").await;
            assert!(matches!(result, Err(PipelineError::Unauthenticated)));
        }

        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.stats().transcript_len, 0);
        assert_eq!(store.stats().concerns_len, 0);
    }

    #[tokio::test]
    async fn test_failing_classifier_records_nothing() {
        let (pipeline, store) = pipeline_with(
            Arc::new(CountingGenerator::default()),
            Arc::new(FailingClassifier),
        );

        let result = pipeline.handle(Some("admin"), "hello").await;
        assert!(matches!(result, Err(PipelineError::Classification(_))));
        assert_eq!(store.stats().transcript_len, 0);
        assert_eq!(store.stats().concerns_len, 0);
    }

    #[tokio::test]
    async fn test_failing_generator_records_nothing() {
        let (pipeline, store) = pipeline_with(
            Arc::new(FailingGenerator),
            Arc::new(ScriptedClassifier::new(vec!["NEGATIVE"])),
        );

        let result = pipeline.handle(Some("admin"), "this is bad").await;
        assert!(matches!(result, Err(PipelineError::Generation(_))));
        assert_eq!(store.stats().transcript_len, 0);
        assert_eq!(store.stats().concerns_len, 0);
    }

    #[tokio::test]
    async fn test_adapter_timeout_is_a_failure() {
        let (pipeline, store) = pipeline_with(
            Arc::new(SlowGenerator),
            Arc::new(ScriptedClassifier::new(vec!["POSITIVE"])),
        );

        let result = pipeline.handle(Some("admin"), "hello").await;
        match result {
            Err(PipelineError::Generation(ModelError::Timeout(limit))) => {
                assert_eq!(limit, Duration::from_millis(200));
            }
            other => panic!("expected a generation timeout, got {:?}", other),
        }
        assert_eq!(store.stats().transcript_len, 0);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_messages() {
        let generator = Arc::new(CountingGenerator::default());
        let (pipeline, store) = pipeline_with(
            generator.clone(),
            Arc::new(ScriptedClassifier::new(vec!["POSITIVE"])),
        );

        assert!(matches!(
            pipeline.handle(Some("admin"), "   ").await,
            Err(PipelineError::MalformedRequest(_))
        ));
        let long = "x".repeat(51);
        assert!(matches!(
            pipeline.handle(Some("admin"), &long).await,
            Err(PipelineError::MessageTooLong(50))
        ));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.stats().transcript_len, 0);
    }

    #[tokio::test]
    async fn test_tally_after_scripted_labels() {
        let (pipeline, store) = pipeline_with(
            Arc::new(CountingGenerator::default()),
            Arc::new(ScriptedClassifier::new(vec![
                "POSITIVE", "NEGATIVE", "NEUTRAL", "NEGATIVE",
            ])),
        );
        for msg in ["a", "b", "c", "d"] {
            pipeline.handle(Some("admin"), msg).await.unwrap();
        }
        let tally = store.tally();
        assert_eq!((tally.positive, tally.negative, tally.neutral), (1, 2, 1));
        let concern_texts: Vec<String> = store.concerns().into_iter().map(|c| c.text).collect();
        assert_eq!(concern_texts, vec!["b", "d"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sessions() {
        const TASKS: usize = 64;
        let (pipeline, store) = pipeline_with(
            Arc::new(CountingGenerator::default()),
            Arc::new(KeywordClassifier),
        );

        let mut handles = Vec::with_capacity(TASKS);
        for i in 0..TASKS {
            let pipeline = pipeline.clone();
            handles.push(tokio::spawn(async move {
                let user = format!("user-{}", i);
                let message = if i % 4 == 0 {
                    format!("bad day {}", i)
                } else {
                    format!("good day {}", i)
                };
                pipeline.handle(Some(&user), &message).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let transcript = store.transcript();
        let concerns = store.concerns();
        assert_eq!(transcript.len(), TASKS);
        assert_eq!(concerns.len(), TASKS / 4);
        for concern in &concerns {
            let entry = &transcript[concern.transcript_seq as usize];
            assert_eq!(entry.user_id, concern.user_id);
            assert_eq!(entry.prompt, concern.text);
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_disturb_other_requests() {
        let store = Arc::new(InteractionStore::new());
        let recorder = InteractionRecorder::new(Arc::clone(&store));
        let good = SessionPipeline::new(
            Arc::new(CountingGenerator::default()),
            Arc::new(KeywordClassifier),
            recorder.clone(),
            PipelineConfig::default(),
        );
        let broken = SessionPipeline::new(
            Arc::new(CountingGenerator::default()),
            Arc::new(FailingClassifier),
            recorder,
            PipelineConfig::default(),
        );

        let (ok, err) = tokio::join!(
            good.handle(Some("a"), "bad news"),
            broken.handle(Some("b"), "bad news"),
        );
        assert!(ok.is_ok());
        assert!(err.is_err());
        assert_eq!(store.stats().transcript_len, 1);
        assert_eq!(store.stats().concerns_len, 1);
        assert_eq!(store.transcript()[0].user_id, "a");
    }

    #[test]
    fn test_pipeline_config_from_models_config() {
        let config = PipelineConfig::from(&ModelsConfig::default());
        assert_eq!(config.adapter_timeout, Duration::from_secs(30));
        assert_eq!(config.max_message_chars, 2000);
    }
}
