// Per-candidate classification: article text -> prompt -> model -> verdict.
//
// Every failure is a skip. Nothing here aborts a run.

use std::sync::Arc;

use ai_client::{truncate_chars, AiError, ChatModel};
use mediascreen_archive::FetchError;
use mediascreen_common::{ClassifierConfig, Entity, Verdict};
use tracing::{debug, info, warn};

use crate::diagnostics::RawOutputLog;
use crate::pacing::{FixedDelay, NoDelay, Pacer};
use crate::prompt::build_prompt;
use crate::recovery::{recover_verdict, RecoveryError};
use crate::traits::ArticleTextExtractor;

pub const DEFAULT_MAX_ARTICLE_CHARS: usize = 6000;

/// Why a candidate produced no verdict.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("article extraction failed: {0}")]
    Extraction(#[from] FetchError),

    #[error("article text is empty")]
    EmptyArticle,

    #[error("model invocation failed: {0}")]
    Model(#[from] AiError),

    #[error("model output unrecoverable: {0}")]
    Malformed(#[from] RecoveryError),
}

pub struct VerdictClassifier {
    extractor: Arc<dyn ArticleTextExtractor>,
    model: Arc<dyn ChatModel>,
    pacer: Arc<dyn Pacer>,
    max_article_chars: usize,
    diagnostics: Option<RawOutputLog>,
}

impl VerdictClassifier {
    /// No pacing and no diagnostics log until configured.
    pub fn new(extractor: Arc<dyn ArticleTextExtractor>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            extractor,
            model,
            pacer: Arc::new(NoDelay),
            max_article_chars: DEFAULT_MAX_ARTICLE_CHARS,
            diagnostics: None,
        }
    }

    pub fn from_config(
        extractor: Arc<dyn ArticleTextExtractor>,
        model: Arc<dyn ChatModel>,
        config: &ClassifierConfig,
    ) -> Self {
        let mut classifier = Self::new(extractor, model)
            .with_pacer(Arc::new(FixedDelay::from_millis(config.request_delay_ms)))
            .with_max_article_chars(config.max_article_chars);
        if let Some(path) = &config.diagnostics_log {
            classifier = classifier.with_diagnostics(RawOutputLog::new(path));
        }
        classifier
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_max_article_chars(mut self, max: usize) -> Self {
        self.max_article_chars = max;
        self
    }

    pub fn with_diagnostics(mut self, log: RawOutputLog) -> Self {
        self.diagnostics = Some(log);
        self
    }

    /// Classify one (entity, article) pair. The pacer runs after every
    /// attempt, whether or not it produced a verdict.
    pub async fn classify(&self, entity: &Entity, link: &str) -> Result<Verdict, SkipReason> {
        let outcome = self.attempt(entity, link).await;
        self.pacer.pause().await;
        outcome
    }

    async fn attempt(&self, entity: &Entity, link: &str) -> Result<Verdict, SkipReason> {
        let text = self.extractor.extract(link).await?;
        if text.trim().is_empty() {
            return Err(SkipReason::EmptyArticle);
        }

        let article = truncate_chars(&text, self.max_article_chars);
        let prompt = build_prompt(entity, article);
        debug!(
            entity = entity.as_str(),
            link,
            model = self.model.name(),
            article_chars = article.chars().count(),
            "classifier: invoking model"
        );

        let raw = self.model.complete(&prompt).await?;

        let response = match recover_verdict(&raw) {
            Ok(response) => response,
            Err(e) => {
                warn!(link, error = %e, "classifier: unrecoverable model output");
                if let Some(log) = &self.diagnostics {
                    log.record(link, &raw);
                }
                return Err(e.into());
            }
        };

        let verdict = response.into_verdict(entity, link);
        info!(
            entity = entity.as_str(),
            link,
            classification = %verdict.classification,
            "classifier: verdict"
        );
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use mediascreen_common::Classification;

    use crate::testing::{verdict_json, MockArticles, ScriptedModel};

    #[derive(Default)]
    struct CountingPacer(AtomicUsize);

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn acme() -> Entity {
        Entity::parse("Acme Corp").unwrap()
    }

    #[tokio::test]
    async fn produces_verdict_from_clean_output() {
        let articles = MockArticles::new().on_page("https://a/1", "Acme Corp was fined for fraud.");
        let model = ScriptedModel::new()
            .on_prompt_containing("fined for fraud", &verdict_json(true, "Fraud penalty"));
        let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model));

        let verdict = classifier.classify(&acme(), "https://a/1").await.unwrap();
        assert_eq!(verdict.classification, Classification::Negative);
        assert_eq!(verdict.link, "https://a/1");
        assert_eq!(verdict.reason, "Fraud penalty");
        assert_eq!(verdict.summary_text(), "- point one\n- point two");
    }

    #[tokio::test]
    async fn truncates_article_before_prompting() {
        let long = format!("{}TAIL", "x".repeat(50));
        let articles = MockArticles::new().on_page("https://a/1", &long);
        let model = Arc::new(ScriptedModel::new().on_prompt_containing("Acme", &verdict_json(false, "n/a")));
        let classifier = VerdictClassifier::new(Arc::new(articles), model.clone())
            .with_max_article_chars(50);

        classifier.classify(&acme(), "https://a/1").await.unwrap();
        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(&"x".repeat(50)));
        assert!(!prompts[0].contains("TAIL"));
    }

    #[tokio::test]
    async fn each_failure_kind_is_a_skip() {
        let articles = MockArticles::new()
            .on_page("https://a/blank", "   \n ")
            .on_page("https://a/down", "model will fail here")
            .on_page("https://a/prose", "model will ramble here");
        let model = ScriptedModel::new()
            .failing_on("model will fail", 503)
            .on_prompt_containing("model will ramble", "I think this is probably fine.");
        let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model));

        let missing = classifier.classify(&acme(), "https://a/404").await.unwrap_err();
        assert!(matches!(missing, SkipReason::Extraction(_)));

        let blank = classifier.classify(&acme(), "https://a/blank").await.unwrap_err();
        assert!(matches!(blank, SkipReason::EmptyArticle));

        let down = classifier.classify(&acme(), "https://a/down").await.unwrap_err();
        assert!(matches!(down, SkipReason::Model(AiError::Api { status: 503, .. })));

        let prose = classifier.classify(&acme(), "https://a/prose").await.unwrap_err();
        assert!(matches!(prose, SkipReason::Malformed(RecoveryError::NoJsonObject)));
    }

    #[tokio::test]
    async fn pacer_runs_after_success_and_skip() {
        let articles = MockArticles::new().on_page("https://a/1", "Acme text");
        let model = ScriptedModel::new().on_prompt_containing("Acme text", &verdict_json(true, "r"));
        let pacer = Arc::new(CountingPacer::default());
        let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model))
            .with_pacer(pacer.clone());

        assert!(classifier.classify(&acme(), "https://a/1").await.is_ok());
        assert!(classifier.classify(&acme(), "https://a/missing").await.is_err());
        assert_eq!(pacer.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn malformed_output_is_written_to_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let log = RawOutputLog::new(dir.path().join("raw.txt"));
        let articles = MockArticles::new().on_page("https://a/1", "Acme text");
        let model = ScriptedModel::new().on_prompt_containing("Acme text", "no json at all");
        let classifier = VerdictClassifier::new(Arc::new(articles), Arc::new(model))
            .with_diagnostics(log.clone());

        assert!(classifier.classify(&acme(), "https://a/1").await.is_err());
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("=== https://a/1 ===\nno json at all"));
    }

    #[tokio::test]
    async fn config_without_diagnostics_path_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let model = || {
            Arc::new(ScriptedModel::new().on_prompt_containing("Acme text", "no json at all"))
        };
        let articles = || Arc::new(MockArticles::new().on_page("https://a/1", "Acme text"));

        let disabled = ClassifierConfig {
            request_delay_ms: 0,
            diagnostics_log: None,
            ..Default::default()
        };
        let classifier = VerdictClassifier::from_config(articles(), model(), &disabled);
        assert!(classifier.diagnostics.is_none());
        assert!(classifier.classify(&acme(), "https://a/1").await.is_err());

        let path = dir.path().join("raw.txt");
        let enabled = ClassifierConfig {
            request_delay_ms: 0,
            diagnostics_log: Some(path.clone()),
            ..Default::default()
        };
        let classifier = VerdictClassifier::from_config(articles(), model(), &enabled);
        assert!(classifier.classify(&acme(), "https://a/1").await.is_err());
        assert!(std::fs::read_to_string(&path).unwrap().contains("no json at all"));
    }
}
