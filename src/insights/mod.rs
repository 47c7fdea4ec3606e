//! Batch-level aggregation: frequency tables, regions and the co-occurrence graph.

pub mod graph;
pub mod regions;

use std::{hash::Hash, path::Path};

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::nlp::{relations::Relationship, Entity};

/// Most common items, ties broken by first appearance.
fn most_common<T, I>(items: I, n: usize) -> Vec<(T, usize)>
where
    T: Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: IndexMap<T, usize> = IndexMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut ranked: Vec<(T, usize)> = counts.into_iter().collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Top `n` (text, label) pairs over all documents.
pub fn top_entities<'a, I>(batch: I, n: usize) -> Vec<(Entity, usize)>
where
    I: IntoIterator<Item = &'a [Entity]>,
{
    most_common(batch.into_iter().flatten().cloned(), n)
}

/// Top `n` triples over all documents; sentinel triples are counted like any other.
pub fn top_relationships<'a, I>(batch: I, n: usize) -> Vec<(Relationship, usize)>
where
    I: IntoIterator<Item = &'a [Relationship]>,
{
    most_common(batch.into_iter().flatten().cloned(), n)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub text: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRelationship {
    pub subject: String,
    pub verb: String,
    pub object: Option<String>,
    pub count: usize,
}

/// Summary written at the end of a `run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub documents: usize,
    pub failed_documents: usize,
    pub top_entities: Vec<RankedEntity>,
    pub top_relationships: Vec<RankedRelationship>,
    pub categories: IndexMap<String, usize>,
    pub regions: usize,
    pub graph_nodes: usize,
    pub graph_edges: usize,
}

impl RunSummary {
    pub fn rank_entities(ranked: Vec<(Entity, usize)>) -> Vec<RankedEntity> {
        ranked
            .into_iter()
            .map(|(entity, count)| RankedEntity {
                text: entity.text,
                label: entity.label,
                count,
            })
            .collect()
    }

    pub fn rank_relationships(ranked: Vec<(Relationship, usize)>) -> Vec<RankedRelationship> {
        ranked
            .into_iter()
            .map(|(rel, count)| RankedRelationship {
                subject: rel.subject,
                verb: rel.verb,
                object: rel.object,
                count,
            })
            .collect()
    }
}

/// Write any serializable artefact as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    info!(path = %path.display(), "wrote json artefact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_first_seen_order() {
        let ranked = most_common(["b", "a", "a", "b", "c"], 3);
        assert_eq!(ranked, vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn sentinel_is_counted() {
        let d1 = vec![Relationship::sentinel()];
        let d2 = vec![Relationship::sentinel()];
        let d3 = vec![Relationship {
            subject: "police".into(),
            verb: "arrested".into(),
            object: Some("man".into()),
        }];
        let ranked = top_relationships([d1.as_slice(), d2.as_slice(), d3.as_slice()], 10);
        assert_eq!(ranked[0], (Relationship::sentinel(), 2));
        assert_eq!(ranked[1].1, 1);
    }

    #[test]
    fn entity_counts_keep_labels_apart() {
        let doc = vec![
            Entity::new("Apple", "ORG"),
            Entity::new("Apple", "PERSON"),
            Entity::new("Apple", "ORG"),
        ];
        let ranked = top_entities([doc.as_slice()], 1);
        assert_eq!(ranked, vec![(Entity::new("Apple", "ORG"), 2)]);
    }
}
