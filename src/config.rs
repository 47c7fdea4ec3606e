//! Runtime configuration utilities for news-insights.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;

use crate::insights::graph::{EdgePolicy, GraphBuilder};

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for input tables and parse files.
    pub data_dir: PathBuf,
    /// Root folder for analytic outputs.
    pub outputs_dir: PathBuf,
    /// JSON category → keywords table.
    pub taxonomy_path: PathBuf,
    /// Documents considered when building the co-occurrence graph.
    pub graph_sample_size: usize,
    /// Entity labels that become graph nodes.
    pub graph_labels: Vec<String>,
    pub graph_edge_policy: EdgePolicy,
    /// Documents parsed concurrently.
    pub concurrency: usize,
    /// Length of the most-common entity and relationship tables.
    pub top_n: usize,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Self::from_lookup(|key| env::var(key).ok())?;
        std::fs::create_dir_all(&settings.data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&settings.outputs_dir).context("creating outputs dir")?;
        Ok(settings)
    }

    /// Resolve settings from an arbitrary variable source without touching the filesystem.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));
        let outputs_dir = lookup("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outputs"));
        let taxonomy_path = lookup("TAXONOMY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./config/crimes.json"));
        let graph_sample_size = lookup("GRAPH_SAMPLE_SIZE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let graph_labels = lookup("GRAPH_LABELS")
            .map(|v| parse_labels(&v))
            .unwrap_or_else(|| vec!["GPE".into(), "PERSON".into(), "ORG".into()]);
        let graph_edge_policy = match lookup("GRAPH_EDGE_POLICY") {
            Some(raw) => raw
                .parse::<EdgePolicy>()
                .map_err(anyhow::Error::msg)
                .context("parsing GRAPH_EDGE_POLICY")?,
            None => EdgePolicy::default(),
        };
        let concurrency = lookup("PIPELINE_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(4);
        let top_n = lookup("TOP_N").and_then(|v| v.parse().ok()).unwrap_or(10);

        Ok(Self {
            data_dir,
            outputs_dir,
            taxonomy_path,
            graph_sample_size,
            graph_labels,
            graph_edge_policy,
            concurrency,
            top_n,
        })
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }

    /// Graph builder seeded from the configured labels, sample size and policy.
    pub fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::default()
            .with_labels(self.graph_labels.iter().cloned())
            .with_sample_size(self.graph_sample_size)
            .with_policy(self.graph_edge_policy)
    }
}

/// Split a comma separated label list, dropping blanks.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
