// Search aggregation and ranking for one entity.

use std::sync::Arc;

use mediascreen_common::{CandidateSet, Entity, SearchConfig, SearchResultItem};
use tracing::{debug, info, warn};

use crate::traits::SearchClient;

/// Runs every keyword query for an entity and keeps the most recent hits.
pub struct EntityScreener {
    searcher: Arc<dyn SearchClient>,
    keywords: Vec<String>,
    per_keyword_cap: usize,
    window_size: usize,
}

impl EntityScreener {
    pub fn new(
        searcher: Arc<dyn SearchClient>,
        keywords: Vec<String>,
        per_keyword_cap: usize,
        window_size: usize,
    ) -> Self {
        Self {
            searcher,
            keywords,
            per_keyword_cap,
            window_size,
        }
    }

    pub fn from_config(searcher: Arc<dyn SearchClient>, config: &SearchConfig) -> Self {
        Self::new(
            searcher,
            config.keywords.clone(),
            config.per_keyword_cap,
            config.window_size,
        )
    }

    /// Aggregate, rank and window the search hits for `entity`.
    ///
    /// A failed keyword query contributes nothing; the remaining keywords still
    /// run. An entity with no hits at all yields an empty set.
    pub async fn screen(&self, entity: &Entity) -> CandidateSet {
        let mut pool: Vec<SearchResultItem> = Vec::new();

        for keyword in &self.keywords {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                continue;
            }

            match self.searcher.search(entity, keyword).await {
                Ok(results) => {
                    let before = pool.len();
                    pool.extend(
                        results
                            .into_iter()
                            .filter(|r| !r.link.trim().is_empty())
                            .take(self.per_keyword_cap),
                    );
                    debug!(
                        entity = entity.as_str(),
                        keyword,
                        kept = pool.len() - before,
                        "screener: keyword results"
                    );
                }
                Err(e) => {
                    warn!(
                        entity = entity.as_str(),
                        keyword,
                        error = %e,
                        "screener: search failed, skipping keyword"
                    );
                }
            }
        }

        if pool.is_empty() {
            info!(entity = entity.as_str(), "screener: no results");
            return CandidateSet::empty(entity.clone());
        }

        let pooled = pool.len();
        let items = rank_and_window(pool, self.window_size);
        info!(
            entity = entity.as_str(),
            pooled,
            kept = items.len(),
            "screener: candidates ranked"
        );
        CandidateSet::new(entity.clone(), items)
    }
}

/// Dated items newest first, then undated items in pool order, cut to `window`.
///
/// The sort is stable: items sharing a date keep their pool order.
pub fn rank_and_window(pool: Vec<SearchResultItem>, window: usize) -> Vec<SearchResultItem> {
    let (mut dated, undated): (Vec<_>, Vec<_>) =
        pool.into_iter().partition(|r| r.publish_date.is_some());

    dated.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

    dated.into_iter().chain(undated).take(window).collect()
}
