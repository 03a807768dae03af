//! Tabular input and output.
//!
//! Inputs may be CSV or a spreadsheet workbook (first sheet, first row as
//! headers). Outputs are always CSV with a fixed header row, written even when
//! there are no data rows.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use mediascreen_archive::parse_date_value;
use mediascreen_common::{
    Classification, Entity, Result, ScreeningError, SearchResultItem, Verdict,
};
use tracing::{debug, info};

pub const CANDIDATE_COLUMNS: [&str; 6] =
    ["Entity", "Keyword", "Title", "Snippet", "Link", "PublishDate"];
pub const REPORT_COLUMNS: [&str; 5] = ["Entity", "Link", "Summary", "Classification", "Reason"];

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const CELL_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// =============================================================================
// Reading
// =============================================================================

/// Headers plus data rows, every cell as a string.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    source: String,
}

impl Table {
    fn read(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let (headers, rows) = match ext.as_str() {
            "csv" | "txt" => read_csv_rows(path)?,
            e if WORKBOOK_EXTENSIONS.contains(&e) => read_workbook_rows(path)?,
            other => {
                return Err(ScreeningError::UnsupportedFormat(format!(
                    "{} (extension '{other}')",
                    path.display()
                )))
            }
        };

        debug!(path = %path.display(), rows = rows.len(), "io: table read");
        Ok(Self {
            headers,
            rows,
            source: path.display().to_string(),
        })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| ScreeningError::MissingColumn {
                column: name.to_string(),
                path: self.source.clone(),
            })
    }

    fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn read_csv_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(File::open(path)?);

    let headers = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok((headers, rows))
}

fn read_workbook_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ScreeningError::Workbook(format!("{}: {e}", path.display())))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScreeningError::Workbook(format!("{}: no sheets", path.display())))?
        .map_err(|e| ScreeningError::Workbook(format!("{}: {e}", path.display())))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    Ok((headers, rows.collect()))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        // Date-formatted cells hold a serial day number.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format(CELL_DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| dt.to_string()),
        other => other.to_string(),
    }
}

/// Entity names from `column`. Blank cells are dropped, names are trimmed.
///
/// A missing column fails the whole run before any external call is made.
pub fn read_entities(path: &Path, column: &str) -> Result<Vec<Entity>> {
    let table = Table::read(path)?;
    let idx = table.column(column)?;

    let entities: Vec<Entity> = table
        .rows
        .iter()
        .filter_map(|row| Entity::parse(cell(row, Some(idx))))
        .collect();

    info!(
        path = %path.display(),
        rows = table.rows.len(),
        entities = entities.len(),
        "io: entities loaded"
    );
    Ok(entities)
}

/// Search-stage output read back for classification. Rows without an entity
/// or link are discarded.
pub fn read_candidates(path: &Path) -> Result<Vec<SearchResultItem>> {
    let table = Table::read(path)?;
    let entity_idx = table.column("Entity")?;
    let link_idx = table.column("Link")?;
    let keyword_idx = table.optional_column("Keyword");
    let title_idx = table.optional_column("Title");
    let snippet_idx = table.optional_column("Snippet");
    let date_idx = table.optional_column("PublishDate");

    let candidates: Vec<SearchResultItem> = table
        .rows
        .iter()
        .filter_map(|row| {
            let entity = Entity::parse(cell(row, Some(entity_idx)))?;
            let link = cell(row, Some(link_idx));
            if link.is_empty() {
                return None;
            }
            Some(SearchResultItem {
                entity,
                keyword: cell(row, keyword_idx).to_string(),
                title: cell(row, title_idx).to_string(),
                snippet: cell(row, snippet_idx).to_string(),
                link: link.to_string(),
                publish_date: parse_date_value(cell(row, date_idx)),
            })
        })
        .collect();

    info!(
        path = %path.display(),
        rows = table.rows.len(),
        candidates = candidates.len(),
        "io: candidates loaded"
    );
    Ok(candidates)
}

/// Verdict rows written by [`write_report`].
pub fn read_report(path: &Path) -> Result<Vec<Verdict>> {
    let table = Table::read(path)?;
    let idx: Vec<usize> = REPORT_COLUMNS
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<_>>()?;

    table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(n, row)| {
            let entity = Entity::parse(cell(row, Some(idx[0])))?;
            Some((n, entity, row))
        })
        .map(|(n, entity, row)| {
            let classification: Classification = cell(row, Some(idx[3]))
                .parse()
                .map_err(|e| ScreeningError::InvalidRow(format!("row {}: {e}", n + 2)))?;
            Ok(Verdict {
                entity,
                link: cell(row, Some(idx[1])).to_string(),
                summary: row
                    .get(idx[2])
                    .map(|s| s.lines().map(String::from).collect())
                    .unwrap_or_default(),
                classification,
                reason: row.get(idx[4]).cloned().unwrap_or_default(),
            })
        })
        .collect()
}

// =============================================================================
// Writing
// =============================================================================

fn csv_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    Ok(writer)
}

pub fn write_candidates(path: &Path, candidates: &[SearchResultItem]) -> Result<()> {
    let mut writer = csv_writer(path, &CANDIDATE_COLUMNS)?;
    for item in candidates {
        writer.serialize(item)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = candidates.len(), "io: candidates written");
    Ok(())
}

pub fn write_report(path: &Path, verdicts: &[Verdict]) -> Result<()> {
    let mut writer = csv_writer(path, &REPORT_COLUMNS)?;
    for v in verdicts {
        writer.write_record([
            v.entity.as_str(),
            v.link.as_str(),
            v.summary_text().as_str(),
            v.classification.as_str(),
            v.reason.as_str(),
        ])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = verdicts.len(), "io: report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::hit;

    #[test]
    fn entities_from_csv_drop_blanks_and_trim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.csv");
        std::fs::write(&path, "Id,EntityName\n1,  Acme Corp \n2,\n3,   \n4,Beta Ltd\n").unwrap();

        let entities = read_entities(&path, "EntityName").unwrap();
        let names: Vec<_> = entities.iter().map(|e| e.as_str()).collect();
        assert_eq!(names, vec!["Acme Corp", "Beta Ltd"]);
    }

    #[test]
    fn missing_entity_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.csv");
        std::fs::write(&path, "Name\nAcme Corp\n").unwrap();

        let err = read_entities(&path, "EntityName").unwrap_err();
        assert!(matches!(err, ScreeningError::MissingColumn { ref column, .. } if column == "EntityName"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.json");
        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            read_entities(&path, "EntityName"),
            Err(ScreeningError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn candidates_survive_a_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        let items = vec![
            hit("Acme Corp", "fraud", "https://a/1", Some("2024-06-01T08:30:00")),
            hit("Acme Corp", "bribery", "https://a/2", None),
        ];

        write_candidates(&path, &items).unwrap();
        let back = read_candidates(&path).unwrap();
        assert_eq!(back, items);
    }

    #[test]
    fn candidate_rows_without_link_or_entity_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");
        std::fs::write(
            &path,
            "Entity,Link\nAcme Corp,https://a/1\n,https://a/2\nAcme Corp,\n",
        )
        .unwrap();

        let back = read_candidates(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].link, "https://a/1");
        assert_eq!(back[0].publish_date, None);
    }

    #[test]
    fn empty_report_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.csv");

        write_report(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Entity,Link,Summary,Classification,Reason\n");
        assert!(read_report(&path).unwrap().is_empty());
    }

    #[test]
    fn unknown_classification_is_an_invalid_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(
            &path,
            "Entity,Link,Summary,Classification,Reason\nAcme Corp,https://a/1,x,Maybe,r\n",
        )
        .unwrap();
        assert!(matches!(read_report(&path), Err(ScreeningError::InvalidRow(_))));
    }
}
