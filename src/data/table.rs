//! Reading and writing the Website/Text/Entities/Relationships interchange table.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Writer};
use tracing::{info, warn};

use crate::{
    data::{literal, Document, EnrichedRecord},
    error::{IngestError, RowError},
};

pub const WEBSITE: &str = "Website";
pub const TEXT: &str = "Text";
pub const ENTITIES: &str = "Entities";
pub const RELATIONSHIPS: &str = "Relationships";
pub const CATEGORY: &str = "Category";

/// Header row plus string cells, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn require(&self, name: &'static str) -> Result<usize, IngestError> {
        self.column(name).ok_or(IngestError::MissingColumn(name))
    }
}

fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("")
}

/// Read a `.csv`, `.xlsx` or `.xls` file. Spreadsheets use their first sheet.
pub fn read_raw(path: &Path) -> Result<RawTable, IngestError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => read_csv(path),
        Some("xlsx" | "xls" | "xlsm") => read_workbook(path),
        _ => Err(IngestError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, IngestError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable { headers, rows })
}

fn read_workbook(path: &Path) -> Result<RawTable, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Excel(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|e| IngestError::Excel(e.to_string()))?;

    let mut rows_iter = range.rows();
    let headers = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => format!("{i}"),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#ERROR: {e:?}"),
        Data::DateTime(dt) => format!("{dt}"),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Website/Text rows as documents; rows with a blank Website or Text are dropped.
pub fn documents(table: &RawTable) -> Result<Vec<Document>, IngestError> {
    let website = table.require(WEBSITE)?;
    let text = table.require(TEXT)?;
    let docs: Vec<Document> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(id, row)| {
            let source = cell(row, Some(website)).trim();
            let raw_text = cell(row, Some(text));
            if source.is_empty() || raw_text.trim().is_empty() {
                return None;
            }
            Some(Document {
                id,
                source: source.to_string(),
                raw_text: raw_text.to_string(),
            })
        })
        .collect();
    let dropped = table.rows.len() - docs.len();
    if dropped > 0 {
        info!(dropped, "dropped rows with blank Website or Text");
    }
    Ok(docs)
}

pub fn read_documents(path: &Path) -> Result<Vec<Document>, IngestError> {
    let table = read_raw(path)?;
    let docs = documents(&table)?;
    info!(path = %path.display(), documents = docs.len(), "read documents");
    Ok(docs)
}

/// Parsed rows of an enriched table plus the rows rejected by the literal parser.
#[derive(Debug, Default)]
pub struct EnrichedBatch {
    pub records: Vec<EnrichedRecord>,
    pub rejected: Vec<RowError>,
}

/// Interpret a table carrying `Entities` and `Relationships` literal columns.
///
/// A cell that fails to parse rejects only its own row.
pub fn enriched(table: &RawTable) -> Result<EnrichedBatch, IngestError> {
    let entities_col = table.require(ENTITIES)?;
    let relationships_col = table.require(RELATIONSHIPS)?;
    let category_col = table.column(CATEGORY);
    let docs = documents(table)?;

    let mut batch = EnrichedBatch::default();
    for document in docs {
        let row = &table.rows[document.id];
        let entities = match literal::parse_entities(cell(row, Some(entities_col))) {
            Ok(entities) => entities,
            Err(source) => {
                batch.rejected.push(RowError {
                    row: document.id,
                    column: ENTITIES,
                    source,
                });
                continue;
            }
        };
        let relationships = match literal::parse_relationships(cell(row, Some(relationships_col))) {
            Ok(relationships) => relationships,
            Err(source) => {
                batch.rejected.push(RowError {
                    row: document.id,
                    column: RELATIONSHIPS,
                    source,
                });
                continue;
            }
        };
        let category = Some(cell(row, category_col).trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        batch.records.push(EnrichedRecord {
            document,
            entities,
            relationships,
            category,
        });
    }

    for rejection in &batch.rejected {
        warn!(error = %rejection, "rejected row");
    }
    Ok(batch)
}

pub fn read_enriched(path: &Path) -> Result<EnrichedBatch, IngestError> {
    let table = read_raw(path)?;
    let batch = enriched(&table)?;
    info!(
        path = %path.display(),
        records = batch.records.len(),
        rejected = batch.rejected.len(),
        "read enriched table"
    );
    Ok(batch)
}

/// Write records as CSV. The `Category` column is emitted when `with_category` is set.
pub fn write_enriched(
    path: &Path,
    records: &[EnrichedRecord],
    with_category: bool,
) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = Writer::from_path(path)?;
    let mut header = vec![WEBSITE, TEXT, ENTITIES, RELATIONSHIPS];
    if with_category {
        header.push(CATEGORY);
    }
    writer.write_record(&header)?;
    for record in records {
        let entities = literal::render_entities(&record.entities);
        let relationships = literal::render_relationships(&record.relationships);
        let mut row = vec![
            record.document.source.as_str(),
            record.document.raw_text.as_str(),
            entities.as_str(),
            relationships.as_str(),
        ];
        if with_category {
            row.push(record.category.as_deref().unwrap_or(""));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "wrote enriched table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn blank_website_or_text_rows_are_dropped() {
        let t = table(
            &["Website", "Text"],
            &[&["a.com", "one"], &["", "two"], &["c.com", "  "], &["d.com", "four"]],
        );
        let docs = documents(&t).unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn short_rows_count_as_blank() {
        let t = table(&["Website", "Text"], &[&["a.com"]]);
        assert!(documents(&t).unwrap().is_empty());
    }

    #[test]
    fn missing_column_is_reported() {
        let t = table(&["Website", "Body"], &[]);
        assert!(matches!(
            documents(&t),
            Err(IngestError::MissingColumn("Text"))
        ));
    }

    #[test]
    fn bad_literal_rejects_only_its_row() {
        let t = table(
            &["Website", "Text", "Entities", "Relationships"],
            &[
                &["a.com", "one", "[('London', 'GPE')]", "[('No Subject', 'No Verb', 'No Object')]"],
                &["b.com", "two", "[('Paris', 'GPE'", "[]"],
                &["c.com", "three", "[]", "[('x', 'y', None)]"],
            ],
        );
        let batch = enriched(&t).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].row, 1);
        assert_eq!(batch.rejected[0].column, ENTITIES);
        assert_eq!(batch.records[1].relationships[0].object, None);
    }

    #[test]
    fn deeply_nested_cell_rejects_only_its_row() {
        let deep = "[".repeat(200_000);
        let t = table(
            &["Website", "Text", "Entities", "Relationships"],
            &[
                &["a.com", "one", "[('London', 'GPE')]", "[]"],
                &["b.com", "two", deep.as_str(), "[]"],
                &["c.com", "three", "[]", "[]"],
            ],
        );
        let batch = enriched(&t).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].row, 1);
        assert!(batch.rejected[0].source.message.contains("nesting too deep"));
    }

    #[test]
    fn unsupported_extension() {
        assert!(matches!(
            read_raw(Path::new("news.parquet")),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }
}
