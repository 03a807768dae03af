use chrono::NaiveDateTime;
use serde::Serialize;

// --- Entity ---

/// A screened name. Always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Entity(String);

impl Entity {
    /// Returns `None` for blank names; those rows are dropped before screening.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Entity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// --- Search results ---

/// One web search hit for an (entity, keyword) query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResultItem {
    pub entity: Entity,
    pub keyword: String,
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Best-effort publish date, always timezone-naive.
    pub publish_date: Option<NaiveDateTime>,
}

/// Ranked, windowed candidates for one entity.
///
/// Dated items come first, newest to oldest; undated items follow in the order
/// they were found. Never longer than the configured window.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub entity: Entity,
    items: Vec<SearchResultItem>,
}

impl CandidateSet {
    pub fn new(entity: Entity, items: Vec<SearchResultItem>) -> Self {
        Self { entity, items }
    }

    pub fn empty(entity: Entity) -> Self {
        Self {
            entity,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[SearchResultItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<SearchResultItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True when every dated item precedes every undated one and dates never
    /// increase along the sequence.
    pub fn is_recency_ordered(&self) -> bool {
        let mut seen_undated = false;
        let mut previous: Option<NaiveDateTime> = None;
        for item in &self.items {
            match item.publish_date {
                Some(date) => {
                    if seen_undated || previous.is_some_and(|p| date > p) {
                        return false;
                    }
                    previous = Some(date);
                }
                None => seen_undated = true,
            }
        }
        true
    }
}

// --- Verdicts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Negative,
    FalseHit,
}

impl Classification {
    /// `IsNegative == true` is the only path to `Negative`.
    pub fn from_is_negative(is_negative: bool) -> Self {
        if is_negative {
            Classification::Negative
        } else {
            Classification::FalseHit
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Negative => "Negative",
            Classification::FalseHit => "False Hit",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Negative" => Ok(Classification::Negative),
            "False Hit" => Ok(Classification::FalseHit),
            other => Err(format!("Unknown classification: {other}")),
        }
    }
}

/// Structured outcome for one classified candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub entity: Entity,
    pub link: String,
    pub summary: Vec<String>,
    pub classification: Classification,
    pub reason: String,
}

impl Verdict {
    /// Summary bullets as newline-delimited text.
    pub fn summary_text(&self) -> String {
        self.summary.join("\n")
    }

    pub fn is_negative(&self) -> bool {
        self.classification == Classification::Negative
    }
}

// --- Report ---

/// Terminal artifact of a run: verdicts in entity order, then candidate order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreeningReport {
    pub verdicts: Vec<Verdict>,
    pub entities_processed: usize,
    pub articles_retrieved: usize,
}

impl ScreeningReport {
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let negative = self.verdicts.iter().filter(|v| v.is_negative()).count();
        ReportSummary {
            entities_processed: self.entities_processed,
            articles_retrieved: self.articles_retrieved,
            articles_screened: self.verdicts.len(),
            negative,
            false_hits: self.verdicts.len() - negative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub entities_processed: usize,
    pub articles_retrieved: usize,
    pub articles_screened: usize,
    pub negative: usize,
    pub false_hits: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entities processed: {} | Articles retrieved: {} | Articles screened: {} | Negative articles: {} | False hits: {}",
            self.entities_processed,
            self.articles_retrieved,
            self.articles_screened,
            self.negative,
            self.false_hits
        )
    }
}
