// Article fetch and HTML to article text.
//
// Readability main-content extraction first, so navigation and footers stay
// out of the prompt. Pages where that finds nothing fall back to the whole
// page rendered as plain text.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use spider_transformations::transformation::content::{
    transform_content_input, ReturnFormat, TransformConfig, TransformInput,
};
use tracing::{debug, info};

use crate::error::{FetchError, Result};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const TEXT_WIDTH: usize = 100;

/// Main article content of an HTML document as markdown.
pub fn html_to_article_text(html: &str, url: Option<&str>) -> String {
    let main = readable_content(html, url);
    if !main.trim().is_empty() {
        return main;
    }
    debug!(url, "article: no main content, using whole page");
    html2text::from_read(html.as_bytes(), TEXT_WIDTH).unwrap_or_default()
}

fn readable_content(html: &str, url: Option<&str>) -> String {
    let parsed_url = url.and_then(|u| url::Url::parse(u).ok());
    let config = TransformConfig {
        readability: true,
        main_content: true,
        return_format: ReturnFormat::Markdown,
        filter_images: true,
        filter_svg: true,
        clean_html: true,
    };
    let input = TransformInput {
        url: parsed_url.as_ref(),
        content: html.as_bytes(),
        screenshot_bytes: None,
        encoding: None,
        selector_config: None,
        ignore_tags: None,
    };

    transform_content_input(input, &config)
}

/// Fetches a URL over plain HTTP and returns its text content.
pub struct HttpArticleExtractor {
    client: reqwest::Client,
}

impl HttpArticleExtractor {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch `url` and return non-empty plain text.
    pub async fn extract(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!(
                "Only http/https URLs allowed, got: {}",
                parsed.scheme()
            )));
        }

        debug!(url, "article: fetching");

        let resp = self
            .client
            .get(parsed)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map_or(true, |ct| ct.contains("html"));

        let body = resp.text().await?;
        let text = if is_html {
            html_to_article_text(&body, Some(url))
        } else {
            body
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }

        info!(url, chars = text.chars().count(), "article: extracted");
        Ok(text.to_string())
    }
}
