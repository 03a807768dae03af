// Seams between the pipeline and the outside world.
//
// SearchClient: one web search per (entity, keyword).
// ArticleTextExtractor: URL -> plain text.
// The language model seam is ai_client::ChatModel.
//
// Production impls wrap mediascreen-archive; tests use the doubles in
// `crate::testing`.

use async_trait::async_trait;

use mediascreen_archive::{FetchError, GoogleSearchClient, HttpArticleExtractor};
use mediascreen_common::{Entity, SearchResultItem};

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Hits for `"<entity> <keyword>"`, in API rank order.
    async fn search(
        &self,
        entity: &Entity,
        keyword: &str,
    ) -> Result<Vec<SearchResultItem>, FetchError>;
}

#[async_trait]
pub trait ArticleTextExtractor: Send + Sync {
    /// Plain-text content of the page at `url`.
    async fn extract(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl SearchClient for GoogleSearchClient {
    async fn search(
        &self,
        entity: &Entity,
        keyword: &str,
    ) -> Result<Vec<SearchResultItem>, FetchError> {
        GoogleSearchClient::search(self, entity, keyword).await
    }
}

#[async_trait]
impl ArticleTextExtractor for HttpArticleExtractor {
    async fn extract(&self, url: &str) -> Result<String, FetchError> {
        HttpArticleExtractor::extract(self, url).await
    }
}
