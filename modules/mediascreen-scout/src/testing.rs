// Test doubles for the screening pipeline, one per external seam:
// - MockSearcher (SearchClient): (entity, keyword) -> canned hits or failure
// - MockArticles (ArticleTextExtractor): URL -> article text
// - ScriptedModel (ChatModel): prompt substring -> canned completion

use std::collections::HashMap;
use std::sync::Mutex;

use ai_client::{AiError, ChatModel};
use async_trait::async_trait;

use mediascreen_archive::{parse_date_value, FetchError};
use mediascreen_common::{Entity, SearchResultItem};

use crate::traits::{ArticleTextExtractor, SearchClient};

/// Build a search hit. `date` uses any format `parse_date_value` accepts.
pub fn hit(entity: &str, keyword: &str, link: &str, date: Option<&str>) -> SearchResultItem {
    SearchResultItem {
        entity: Entity::parse(entity).expect("non-blank entity"),
        keyword: keyword.to_string(),
        title: format!("Article at {link}"),
        snippet: String::new(),
        link: link.to_string(),
        publish_date: date.map(|d| parse_date_value(d).expect("valid test date")),
    }
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

/// Unregistered queries return no hits. Records every query it receives.
#[derive(Default)]
pub struct MockSearcher {
    results: HashMap<(String, String), Vec<SearchResultItem>>,
    failures: HashMap<(String, String), u16>,
    queries: Mutex<Vec<String>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_search(mut self, entity: &str, keyword: &str, hits: Vec<SearchResultItem>) -> Self {
        self.results
            .insert((entity.to_string(), keyword.to_string()), hits);
        self
    }

    /// Make this query fail with the given HTTP status.
    pub fn failing(mut self, entity: &str, keyword: &str, status: u16) -> Self {
        self.failures
            .insert((entity.to_string(), keyword.to_string()), status);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for MockSearcher {
    async fn search(
        &self,
        entity: &Entity,
        keyword: &str,
    ) -> Result<Vec<SearchResultItem>, FetchError> {
        self.queries
            .lock()
            .unwrap()
            .push(format!("{entity} {keyword}"));

        let key = (entity.to_string(), keyword.to_string());
        if let Some(status) = self.failures.get(&key) {
            return Err(FetchError::Status {
                status: *status,
                url: "mock://search".to_string(),
            });
        }
        Ok(self.results.get(&key).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockArticles
// ---------------------------------------------------------------------------

/// Unregistered URLs fail with a 404.
#[derive(Default)]
pub struct MockArticles {
    pages: HashMap<String, String>,
}

impl MockArticles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl ArticleTextExtractor for MockArticles {
    async fn extract(&self, url: &str) -> Result<String, FetchError> {
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            status: 404,
            url: url.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

/// Replies with the first registered response whose needle appears in the
/// prompt. Prompts matching nothing fail with an API error.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Vec<(String, Reply)>,
    prompts: Mutex<Vec<String>>,
}

enum Reply {
    Text(String),
    Fail(u16),
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_prompt_containing(mut self, needle: &str, response: &str) -> Self {
        self.replies
            .push((needle.to_string(), Reply::Text(response.to_string())));
        self
    }

    pub fn failing_on(mut self, needle: &str, status: u16) -> Self {
        self.replies.push((needle.to_string(), Reply::Fail(status)));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Canned JSON verdict in the shape the classification prompt asks for.
pub fn verdict_json(is_negative: bool, reason: &str) -> String {
    serde_json::json!({
        "Summary": ["- point one", "- point two"],
        "IsNegative": is_negative,
        "Reason": reason,
    })
    .to_string()
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> ai_client::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        for (needle, reply) in &self.replies {
            if prompt.contains(needle.as_str()) {
                return match reply {
                    Reply::Text(text) => Ok(text.clone()),
                    Reply::Fail(status) => Err(AiError::Api {
                        status: *status,
                        message: "scripted failure".to_string(),
                    }),
                };
            }
        }
        Err(AiError::Api {
            status: 500,
            message: "ScriptedModel: no reply registered for prompt".to_string(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
