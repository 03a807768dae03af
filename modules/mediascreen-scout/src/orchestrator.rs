// Drives the two stages over a whole entity list.
//
// Stage 1 screens every entity and flattens the candidate sets in input order.
// Stage 2 classifies every candidate in that order. Both run strictly one call
// at a time.

use std::collections::HashSet;

use mediascreen_common::{Entity, ScreeningReport, SearchResultItem};
use tracing::{info, warn};

use crate::classifier::VerdictClassifier;
use crate::screener::EntityScreener;

/// Receives `(completed, total)` after every classification attempt.
pub trait ProgressObserver {
    fn on_progress(&mut self, completed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: FnMut(usize, usize),
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Reports progress through the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&mut self, completed: usize, total: usize) {
        info!(completed, total, "Classification progress");
    }
}

pub struct ScreeningOrchestrator {
    screener: EntityScreener,
    classifier: VerdictClassifier,
}

impl ScreeningOrchestrator {
    pub fn new(screener: EntityScreener, classifier: VerdictClassifier) -> Self {
        Self {
            screener,
            classifier,
        }
    }

    /// Screen every entity and run every resulting candidate through the
    /// classifier.
    pub async fn run(
        &self,
        entities: &[Entity],
        progress: &mut dyn ProgressObserver,
    ) -> ScreeningReport {
        let candidates = search_stage(&self.screener, entities).await;
        let mut report = classify_stage(&self.classifier, &candidates, progress).await;
        report.entities_processed = entities.len();
        report
    }
}

/// All entities' candidates, entity order preserved.
pub async fn search_stage(screener: &EntityScreener, entities: &[Entity]) -> Vec<SearchResultItem> {
    let mut candidates = Vec::new();
    for entity in entities {
        let set = screener.screen(entity).await;
        candidates.extend(set.into_items());
    }
    info!(
        entities = entities.len(),
        candidates = candidates.len(),
        "Search stage complete"
    );
    candidates
}

/// Classify candidates in order. Skipped candidates contribute no verdict.
///
/// `entities_processed` counts the distinct entities among `candidates`.
pub async fn classify_stage(
    classifier: &VerdictClassifier,
    candidates: &[SearchResultItem],
    progress: &mut dyn ProgressObserver,
) -> ScreeningReport {
    let total = candidates.len();
    let mut verdicts = Vec::new();

    for (i, candidate) in candidates.iter().enumerate() {
        match classifier.classify(&candidate.entity, &candidate.link).await {
            Ok(verdict) => verdicts.push(verdict),
            Err(reason) => {
                warn!(
                    entity = candidate.entity.as_str(),
                    link = candidate.link.as_str(),
                    reason = %reason,
                    "Candidate skipped"
                );
            }
        }
        progress.on_progress(i + 1, total);
    }

    let entities: HashSet<&str> = candidates.iter().map(|c| c.entity.as_str()).collect();
    let report = ScreeningReport {
        verdicts,
        entities_processed: entities.len(),
        articles_retrieved: total,
    };
    info!("{}", report.summary());
    report
}
