//! Per-region mention counts from `GPE` entities.

use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::nlp::{labels, Entity};

/// Region name → number of mentions, in first-seen order.
pub type RegionCounts = IndexMap<String, u64>;

/// Count every `GPE` mention across the batch. Region identity is exact text:
/// repeated mentions in one document all count, and spellings are not merged.
pub fn aggregate_regions<'a, I>(batch: I) -> RegionCounts
where
    I: IntoIterator<Item = &'a [Entity]>,
{
    let mut counts = RegionCounts::new();
    for entities in batch {
        for entity in entities.iter().filter(|e| e.label == labels::GPE) {
            *counts.entry(entity.text.clone()).or_insert(0) += 1;
        }
    }
    counts
}

#[derive(Debug, Serialize)]
struct RegionRow<'a> {
    #[serde(rename = "Region")]
    region: &'a str,
    #[serde(rename = "Crime Count")]
    count: u64,
}

pub fn write_region_counts(path: &Path, counts: &RegionCounts) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    if counts.is_empty() {
        writer.write_record(["Region", "Crime Count"])?;
    }
    for (region, count) in counts {
        writer.serialize(RegionRow {
            region,
            count: *count,
        })?;
    }
    writer.flush()?;
    info!(path = %path.display(), regions = counts.len(), "wrote region counts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_mentions_all_count() {
        let doc = vec![
            Entity::new("London", "GPE"),
            Entity::new("Acme", "ORG"),
            Entity::new("London", "GPE"),
        ];
        let counts = aggregate_regions([doc.as_slice()]);
        assert_eq!(counts.get("London"), Some(&2));
        assert!(!counts.contains_key("Acme"));
    }

    #[test]
    fn spellings_are_distinct_keys() {
        let a = vec![Entity::new("USA", "GPE")];
        let b = vec![Entity::new("United States", "GPE"), Entity::new("USA", "GPE")];
        let counts = aggregate_regions([a.as_slice(), b.as_slice()]);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("USA".to_string(), 2), ("United States".to_string(), 1)]
        );
    }

    #[test]
    fn writes_region_csv_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.csv");
        let mut counts = RegionCounts::new();
        counts.insert("London".into(), 3);
        write_region_counts(&path, &counts).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Region,Crime Count\nLondon,3\n");
    }
}
