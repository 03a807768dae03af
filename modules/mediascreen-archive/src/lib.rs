pub mod article;
pub mod dates;
pub mod error;
pub mod search;

pub use article::{html_to_article_text, HttpArticleExtractor};
pub use dates::{parse_date_value, parse_fuzzy_date, resolve_publish_date};
pub use error::{FetchError, Result};
pub use search::{GoogleSearchClient, RawSearchItem};
