// Google Custom Search (CSE JSON API) client.
// One GET per (entity, keyword) query; items are mapped to SearchResultItem
// with a best-effort publish date.

use std::collections::HashMap;
use std::time::Duration;

use mediascreen_common::{Entity, SearchResultItem};
use serde::Deserialize;
use tracing::{debug, info};

use crate::dates::resolve_publish_date;
use crate::error::{FetchError, Result};

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<RawSearchItem>,
}

/// A search hit as the API returns it, before any normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub pagemap: Option<PageMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMap {
    #[serde(default)]
    pub metatags: Vec<HashMap<String, serde_json::Value>>,
}

impl RawSearchItem {
    /// String value of a meta tag from the item's first metatag block.
    pub fn metatag(&self, field: &str) -> Option<&str> {
        self.pagemap
            .as_ref()?
            .metatags
            .first()?
            .get(field)?
            .as_str()
    }

    /// Normalize into a result row. Items without a link are dropped.
    pub fn into_result(self, entity: &Entity, keyword: &str) -> Option<SearchResultItem> {
        let publish_date = resolve_publish_date(&self);
        let link = self.link.filter(|l| !l.trim().is_empty())?;
        Some(SearchResultItem {
            entity: entity.clone(),
            keyword: keyword.to_string(),
            title: self.title.unwrap_or_default(),
            snippet: self.snippet.unwrap_or_default(),
            link,
            publish_date,
        })
    }
}

pub struct GoogleSearchClient {
    api_key: String,
    search_engine_id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl GoogleSearchClient {
    pub fn new(
        api_key: &str,
        search_engine_id: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            search_engine_id: search_engine_id.to_string(),
            endpoint: endpoint.to_string(),
            client,
        })
    }

    /// Run `"<entity> <keyword>"` and return the hits in API order.
    pub async fn search(&self, entity: &Entity, keyword: &str) -> Result<Vec<SearchResultItem>> {
        let query = format!("{entity} {keyword}");
        debug!(query = query.as_str(), "search: querying google cse");

        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.search_engine_id.as_str()),
                ("q", query.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let data: CseResponse = resp.json().await?;
        let results: Vec<SearchResultItem> = data
            .items
            .into_iter()
            .filter_map(|item| item.into_result(entity, keyword))
            .collect();

        info!(query = query.as_str(), count = results.len(), "search: complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const CSE_BODY: &str = r#"{
        "kind": "customsearch#search",
        "items": [
            {
                "title": "Acme Corp fined for fraud",
                "link": "https://news.example/acme-fined",
                "snippet": "Regulators fined Acme Corp...",
                "pagemap": {
                    "metatags": [{ "article:published_time": "2024-06-01T09:30:00+02:00" }]
                }
            },
            {
                "title": "No link here",
                "snippet": "Jan 5, 2024 ... orphan"
            },
            {
                "title": "Acme annual report",
                "link": "https://acme.example/report",
                "snippet": "Mar 3, 2023 ... annual report"
            }
        ]
    }"#;

    fn acme() -> Entity {
        Entity::parse("Acme Corp").unwrap()
    }

    #[test]
    fn parses_items_and_drops_linkless_rows() {
        let data: CseResponse = serde_json::from_str(CSE_BODY).unwrap();
        let results: Vec<_> = data
            .items
            .into_iter()
            .filter_map(|i| i.into_result(&acme(), "fraud"))
            .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link, "https://news.example/acme-fined");
        assert_eq!(results[0].keyword, "fraud");
        assert_eq!(
            results[0].publish_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap().and_hms_opt(9, 30, 0)
        );
        assert_eq!(
            results[1].publish_date,
            NaiveDate::from_ymd_opt(2023, 3, 3).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn missing_items_key_is_empty() {
        let data: CseResponse = serde_json::from_str(r#"{"kind":"customsearch#search"}"#).unwrap();
        assert!(data.items.is_empty());
    }

    #[test]
    fn metatag_reads_first_block_only() {
        let item: RawSearchItem = serde_json::from_str(
            r#"{"link":"x","pagemap":{"metatags":[{"pubdate":"2024-01-01"},{"date":"2020-01-01"}]}}"#,
        )
        .unwrap();
        assert_eq!(item.metatag("pubdate"), Some("2024-01-01"));
        assert_eq!(item.metatag("date"), None);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_named_failure() {
        let client = GoogleSearchClient::new(
            "key",
            "cx",
            "http://127.0.0.1:9/customsearch/v1",
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.search(&acme(), "fraud").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rate_limited_search_is_a_status_failure() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 429 Too Many Requests\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await
                .unwrap();
        });

        let endpoint = format!("http://{addr}/customsearch/v1");
        let client = GoogleSearchClient::new("key", "cx", &endpoint, Duration::from_secs(5)).unwrap();
        match client.search(&acme(), "fraud").await {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 429);
                assert_eq!(url, endpoint);
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }
}
