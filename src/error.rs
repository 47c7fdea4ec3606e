//! Typed failures raised by the ingestion, literal and NLP layers.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read an input table as a whole. The batch is abandoned.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),
    #[error("unsupported table format for {0:?} (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(PathBuf),
    #[error("workbook {path:?} has no readable sheet")]
    EmptyWorkbook { path: PathBuf },
    #[error("excel error: {0}")]
    Excel(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure to parse a quoted literal cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid literal at offset {position}: {message}")]
pub struct LiteralError {
    pub position: usize,
    pub message: String,
}

impl LiteralError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A single rejected row of an enriched table.
#[derive(Debug, Error)]
#[error("row {row}: column `{column}`: {source}")]
pub struct RowError {
    pub row: usize,
    pub column: &'static str,
    #[source]
    pub source: LiteralError,
}

/// Failure reported by an [`crate::nlp::NlpEngine`] for one document.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no parse available for document text ({0} chars)")]
    NoParse(usize),
    #[error("malformed parse payload: {0}")]
    Malformed(String),
    #[error("engine worker failed: {0}")]
    Worker(String),
}

/// Failure loading the category taxonomy file.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("reading taxonomy {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing taxonomy: {0}")]
    Json(#[from] serde_json::Error),
}
