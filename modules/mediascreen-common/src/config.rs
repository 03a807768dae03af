use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::{Result, ScreeningError};

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "money laundering",
    "fraud",
    "corruption",
    "bribery",
    "terrorism",
];

const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// TOML-backed tunables. Every section is optional; secrets stay in env vars.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub search: SearchConfig,
    pub classifier: ClassifierConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    /// Results kept per keyword, in API order.
    pub per_keyword_cap: usize,
    /// Candidates kept per entity after ranking.
    pub window_size: usize,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            per_keyword_cap: 3,
            window_size: 10,
            endpoint: GOOGLE_CSE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// "groq" or "openai".
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub max_article_chars: usize,
    pub request_delay_ms: u64,
    /// Unparseable model output is appended here. Set to `""` to disable.
    #[serde(deserialize_with = "empty_path_is_none")]
    pub diagnostics_log: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub model_timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama3-8b-8192".to_string(),
            base_url: None,
            max_article_chars: 6000,
            request_delay_ms: 1500,
            diagnostics_log: Some(PathBuf::from("llm_raw_output.txt")),
            fetch_timeout_secs: 30,
            model_timeout_secs: 60,
        }
    }
}

fn empty_path_is_none<'de, D>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub entity_column: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            entity_column: "EntityName".to_string(),
        }
    }
}

impl FileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.search.window_size == 0 {
            return Err(ScreeningError::Config("search.window_size must be at least 1".into()));
        }
        if self.search.per_keyword_cap == 0 {
            return Err(ScreeningError::Config(
                "search.per_keyword_cap must be at least 1".into(),
            ));
        }
        if self.search.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ScreeningError::Config("search.keywords must not be empty".into()));
        }
        if self.classifier.model_timeout_secs == 0 {
            return Err(ScreeningError::Config(
                "classifier.model_timeout_secs must be at least 1".into(),
            ));
        }
        if self.classifier.max_article_chars == 0 {
            return Err(ScreeningError::Config(
                "classifier.max_article_chars must be at least 1".into(),
            ));
        }
        if self.input.entity_column.trim().is_empty() {
            return Err(ScreeningError::Config("input.entity_column must not be empty".into()));
        }
        Ok(())
    }
}

/// Load and validate a TOML config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ScreeningError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?
    } else {
        tracing::info!(path = %path.display(), "Config file not found, using defaults");
        FileConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// API secrets, read from the environment (and `.env` when present).
#[derive(Clone, Default)]
pub struct Secrets {
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub model_api_key: Option<String>,
    model_key_var: String,
}

impl Secrets {
    /// `model_key_var` names the env var holding the language model key
    /// (e.g. `GROQ_API_KEY`).
    pub fn from_env(model_key_var: &str) -> Self {
        dotenvy::dotenv().ok();

        let secrets = Self {
            google_api_key: non_empty_env("GOOGLE_API_KEY"),
            google_cse_id: non_empty_env("GOOGLE_CSE_ID"),
            model_api_key: non_empty_env(model_key_var),
            model_key_var: model_key_var.to_string(),
        };
        secrets.log_keys();
        secrets
    }

    /// `(api_key, search_engine_id)` for the search stage.
    pub fn search_credentials(&self) -> Result<(&str, &str)> {
        let key = self
            .google_api_key
            .as_deref()
            .ok_or_else(|| missing("GOOGLE_API_KEY"))?;
        let cx = self
            .google_cse_id
            .as_deref()
            .ok_or_else(|| missing("GOOGLE_CSE_ID"))?;
        Ok((key, cx))
    }

    pub fn model_api_key(&self) -> Result<&str> {
        self.model_api_key
            .as_deref()
            .ok_or_else(|| missing(&self.model_key_var))
    }

    fn log_keys(&self) {
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) => {
                    let n = v.char_indices().nth(5).map_or(v.len(), |(i, _)| i);
                    format!("{}...({} chars)", &v[..n], v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!("Secrets loaded:");
        tracing::info!("  GOOGLE_API_KEY: {}", preview_opt(&self.google_api_key));
        tracing::info!("  GOOGLE_CSE_ID: {}", preview_opt(&self.google_cse_id));
        tracing::info!("  {}: {}", self.model_key_var, preview_opt(&self.model_api_key));
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("google_cse_id", &self.google_cse_id.as_ref().map(|_| "<redacted>"))
            .field("model_api_key", &self.model_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn missing(key: &str) -> ScreeningError {
    ScreeningError::Config(format!("{key} environment variable is required"))
}
