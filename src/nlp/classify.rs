//! Keyword taxonomy and first-match offense classification.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::TaxonomyError;

/// Label given to texts that match no category.
pub const UNCATEGORISED: &str = "Uncategorised";

/// Ordered category → keywords table. Category order is the tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Vec<String>>", into = "IndexMap<String, Vec<String>>")]
pub struct Taxonomy {
    categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Category {
    name: String,
    keywords: Vec<String>,
    /// Lowercased copies of `keywords`, used for matching.
    needles: Vec<String>,
}

impl Category {
    fn matches(&self, lowered: &str) -> bool {
        self.needles.iter().any(|needle| lowered.contains(needle.as_str()))
    }
}

impl From<IndexMap<String, Vec<String>>> for Taxonomy {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        Self {
            categories: map
                .into_iter()
                .map(|(name, keywords)| Category {
                    needles: keywords.iter().map(|k| k.to_lowercase()).collect(),
                    name,
                    keywords,
                })
                .collect(),
        }
    }
}

impl From<Taxonomy> for IndexMap<String, Vec<String>> {
    fn from(taxonomy: Taxonomy) -> Self {
        taxonomy
            .categories
            .into_iter()
            .map(|c| (c.name, c.keywords))
            .collect()
    }
}

impl<N, K> FromIterator<(N, Vec<K>)> for Taxonomy
where
    N: Into<String>,
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, Vec<K>)>>(iter: I) -> Self {
        let map: IndexMap<String, Vec<String>> = iter
            .into_iter()
            .map(|(name, keywords)| (name.into(), keywords.into_iter().map(Into::into).collect()))
            .collect();
        map.into()
    }
}

impl Taxonomy {
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn try_load(path: &Path) -> Result<Self, TaxonomyError> {
        let content = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load a taxonomy file, degrading to an empty taxonomy on any failure.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(taxonomy) => {
                info!(path = %path.display(), categories = taxonomy.len(), "loaded taxonomy");
                taxonomy
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "taxonomy unavailable; every text will be uncategorised");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category names in taxonomy order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    fn first_match(&self, lowered: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.matches(lowered))
            .map(|c| c.name.as_str())
    }

    fn all_matches(&self, lowered: &str) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.matches(lowered))
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// First category (in taxonomy order) with any keyword in `text`, else [`UNCATEGORISED`].
pub fn classify<'a>(text: &str, taxonomy: &'a Taxonomy) -> &'a str {
    let lowered = text.to_lowercase();
    taxonomy.first_match(&lowered).unwrap_or(UNCATEGORISED)
}

/// Every category with any keyword in `text`, in taxonomy order.
pub fn classify_all<'a>(text: &str, taxonomy: &'a Taxonomy) -> Vec<&'a str> {
    let lowered = text.to_lowercase();
    taxonomy.all_matches(&lowered)
}

/// How the batch distribution counts documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributionMode {
    /// One count per document, for its first-match label.
    #[default]
    FirstMatch,
    /// One count per document for every matching category.
    MultiLabel,
}

/// Labels for a batch plus the per-category distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchClassification {
    /// First-match label per input text, in input order.
    pub labels: Vec<String>,
    /// Counts per category in taxonomy order; categories never seen and
    /// [`UNCATEGORISED`] are left out.
    pub distribution: IndexMap<String, usize>,
}

pub fn classify_batch<'t, I>(texts: I, taxonomy: &Taxonomy, mode: DistributionMode) -> BatchClassification
where
    I: IntoIterator<Item = &'t str>,
{
    let mut counts: IndexMap<String, usize> =
        taxonomy.names().map(|name| (name.to_string(), 0)).collect();
    let mut labels = Vec::new();

    for text in texts {
        let lowered = text.to_lowercase();
        let counted: Vec<&str> = match mode {
            DistributionMode::FirstMatch => taxonomy.first_match(&lowered).into_iter().collect(),
            DistributionMode::MultiLabel => taxonomy.all_matches(&lowered),
        };
        labels.push(counted.first().copied().unwrap_or(UNCATEGORISED).to_string());

        for name in counted {
            if let Some(count) = counts.get_mut(name) {
                *count += 1;
            }
        }
    }

    counts.retain(|name, count| *count > 0 && name != UNCATEGORISED);
    BatchClassification {
        labels,
        distribution: counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_json_str(
            r#"{"Fraud": ["fraud", "scam"], "Corruption": ["bribery", "Kickback"], "Theft": ["theft"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn first_match_wins_in_taxonomy_order() {
        let t = taxonomy();
        assert_eq!(
            classify("The company was accused of fraud and bribery in London.", &t),
            "Fraud"
        );
        assert_eq!(classify("A KICKBACK scheme", &t), "Corruption");
        assert_eq!(classify("nothing to see", &t), UNCATEGORISED);
    }

    #[test]
    fn substring_match_has_no_word_boundaries() {
        assert_eq!(classify("Anti-theftwear brand", &taxonomy()), "Theft");
    }

    #[test]
    fn json_order_is_preserved() {
        let t = Taxonomy::from_json_str(r#"{"Z": ["a"], "A": ["a"]}"#).unwrap();
        assert_eq!(t.names().collect::<Vec<_>>(), vec!["Z", "A"]);
        assert_eq!(classify("a", &t), "Z");
    }

    #[test]
    fn empty_taxonomy_never_matches() {
        assert_eq!(classify("fraud", &Taxonomy::default()), UNCATEGORISED);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let t = Taxonomy::load_or_empty(Path::new("/definitely/not/here.json"));
        assert!(t.is_empty());
    }

    #[test]
    fn batch_distribution_excludes_uncategorised() {
        let t = taxonomy();
        let texts = ["fraud and bribery", "a bribery case", "weather report", "scam"];
        let batch = classify_batch(texts, &t, DistributionMode::FirstMatch);
        assert_eq!(
            batch.labels,
            vec!["Fraud", "Corruption", UNCATEGORISED, "Fraud"]
        );
        assert_eq!(batch.distribution.get("Fraud"), Some(&2));
        assert_eq!(batch.distribution.get("Corruption"), Some(&1));
        assert!(!batch.distribution.contains_key(UNCATEGORISED));
        assert!(!batch.distribution.contains_key("Theft"));
    }

    #[test]
    fn multi_label_counts_every_match_once() {
        let t = taxonomy();
        let batch = classify_batch(
            ["fraud and bribery and fraud", "theft"],
            &t,
            DistributionMode::MultiLabel,
        );
        assert_eq!(batch.labels, vec!["Fraud", "Theft"]);
        assert_eq!(
            batch.distribution.into_iter().collect::<Vec<_>>(),
            vec![
                ("Fraud".to_string(), 1),
                ("Corruption".to_string(), 1),
                ("Theft".to_string(), 1)
            ]
        );
    }
}
