//! Data ingestion and the tabular interchange layer.

pub mod literal;
pub mod table;

use serde::{Deserialize, Serialize};

use crate::nlp::{relations::Relationship, Entity};

/// One news excerpt as ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// 0-based data-row index in the source table.
    pub id: usize,
    /// Website or outlet the excerpt was taken from.
    pub source: String,
    pub raw_text: String,
}

/// A row of an enriched table whose literal cells parsed cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub document: Document,
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub category: Option<String>,
}
