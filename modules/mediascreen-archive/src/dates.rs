// Best-effort publish date for a search hit.
//
// Meta tags first (the first present field wins), then dates written into the
// snippet text. Every result is timezone-naive: offsets are dropped and the
// wall-clock time kept, so mixed sources sort against each other.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::search::RawSearchItem;

/// Meta tag names checked for a publish date, in priority order.
pub const DATE_META_FIELDS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "pubdate",
    "date",
];

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

static ISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})\b").expect("valid regex"));
static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\.?\s+([0-9]{{1,2}})(?:st|nd|rd|th)?,?\s+([0-9]{{4}})\b"
    ))
    .expect("valid regex")
});
static DAY_MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b([0-9]{{1,2}})(?:st|nd|rd|th)?\s+{MONTH}\.?,?\s+([0-9]{{4}})\b"
    ))
    .expect("valid regex")
});
static SLASHED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})\b").expect("valid regex"));

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%m/%d/%Y",
];

/// Resolve a publish date for a raw search hit, or `None` when nothing parses.
pub fn resolve_publish_date(item: &RawSearchItem) -> Option<NaiveDateTime> {
    let from_meta = DATE_META_FIELDS
        .iter()
        .find_map(|field| item.metatag(field))
        .and_then(parse_date_value);

    from_meta.or_else(|| item.snippet.as_deref().and_then(parse_fuzzy_date))
}

/// Strict parse of a single date value (a meta tag's content).
pub fn parse_date_value(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }
    // Compact YYYYMMDD
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value[..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..].parse().ok()?;
        return midnight(year, month, day);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Find the earliest date written anywhere in free text, e.g. a snippet that
/// starts "Jun 1, 2024 ... ". Ignores everything around it.
pub fn parse_fuzzy_date(text: &str) -> Option<NaiveDateTime> {
    let mut found: Vec<(usize, NaiveDateTime)> = Vec::new();

    for caps in ISO_RE.captures_iter(text) {
        let (Ok(year), Ok(month), Ok(day)) = (caps[1].parse(), caps[2].parse(), caps[3].parse())
        else {
            continue;
        };
        if let (Some(date), Some(m)) = (midnight(year, month, day), caps.get(0)) {
            found.push((m.start(), date));
        }
    }
    for caps in MONTH_DAY_YEAR_RE.captures_iter(text) {
        let date = month_number(&caps[1])
            .and_then(|month| midnight(caps[3].parse().ok()?, month, caps[2].parse().ok()?));
        if let (Some(date), Some(m)) = (date, caps.get(0)) {
            found.push((m.start(), date));
        }
    }
    for caps in DAY_MONTH_YEAR_RE.captures_iter(text) {
        let date = month_number(&caps[2])
            .and_then(|month| midnight(caps[3].parse().ok()?, month, caps[1].parse().ok()?));
        if let (Some(date), Some(m)) = (date, caps.get(0)) {
            found.push((m.start(), date));
        }
    }
    for caps in SLASHED_RE.captures_iter(text) {
        let (Ok(first), Ok(second), Ok(year)) =
            (caps[1].parse::<u32>(), caps[2].parse::<u32>(), caps[3].parse())
        else {
            continue;
        };
        // Month first unless that cannot be a month.
        let (month, day) = if first > 12 { (second, first) } else { (first, second) };
        if let (Some(date), Some(m)) = (midnight(year, month, day), caps.get(0)) {
            found.push((m.start(), date));
        }
    }

    found.into_iter().min_by_key(|(pos, _)| *pos).map(|(_, d)| d)
}

fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
