//! Entity co-occurrence graph over a sample of documents.

use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use anyhow::Result;
use indexmap::IndexSet;
use petgraph::{
    dot::{Config, Dot},
    graph::{NodeIndex, UnGraph},
    visit::EdgeRef,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::nlp::{labels, Entity};

/// What to do when two entities co-occur again in a later document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgePolicy {
    /// Keep a single edge of weight 1.
    #[default]
    Collapse,
    /// Add 1 to the edge weight for each document the pair shares.
    Accumulate,
}

impl FromStr for EdgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collapse" => Ok(Self::Collapse),
            "accumulate" => Ok(Self::Accumulate),
            other => Err(format!("unknown edge policy {other:?} (expected collapse or accumulate)")),
        }
    }
}

impl fmt::Display for EdgePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collapse => "collapse",
            Self::Accumulate => "accumulate",
        })
    }
}

/// Builder parameters for [`CoOccurrenceGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphBuilder {
    pub node_labels: IndexSet<String>,
    pub sample_size: usize,
    pub policy: EdgePolicy,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            node_labels: [labels::GPE, labels::PERSON, labels::ORG]
                .into_iter()
                .map(str::to_string)
                .collect(),
            sample_size: 10,
            policy: EdgePolicy::Collapse,
        }
    }
}

impl GraphBuilder {
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_policy(mut self, policy: EdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Entities of one document kept for the graph: label filter, then first-seen
    /// de-duplication by (text, label).
    pub fn retained<'a>(&self, entities: &'a [Entity]) -> Vec<&'a Entity> {
        let mut seen = IndexSet::new();
        for entity in entities {
            if self.node_labels.contains(&entity.label) {
                seen.insert(entity);
            }
        }
        seen.into_iter().collect()
    }

    /// Build the graph from per-document entity lists, in input order.
    pub fn build<'a, I>(&self, batch: I) -> CoOccurrenceGraph
    where
        I: IntoIterator<Item = &'a [Entity]>,
    {
        let mut graph = CoOccurrenceGraph::new(self.policy);
        for (doc_idx, entities) in batch.into_iter().take(self.sample_size).enumerate() {
            let retained = self.retained(entities);
            for (i, left) in retained.iter().enumerate() {
                for right in &retained[i + 1..] {
                    graph.link(&left.text, &right.text);
                }
            }
            debug!(doc_idx, retained = retained.len(), "linked document entities");
        }
        graph
    }
}

/// Undirected graph keyed by entity text. Edge weights count shared documents under
/// [`EdgePolicy::Accumulate`] and stay at 1 under [`EdgePolicy::Collapse`].
#[derive(Debug, Clone)]
pub struct CoOccurrenceGraph {
    graph: UnGraph<String, u32>,
    index: HashMap<String, NodeIndex>,
    policy: EdgePolicy,
}

impl CoOccurrenceGraph {
    pub fn new(policy: EdgePolicy) -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            index: HashMap::new(),
            policy,
        }
    }

    fn node(&mut self, text: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(text) {
            return *idx;
        }
        let idx = self.graph.add_node(text.to_string());
        self.index.insert(text.to_string(), idx);
        idx
    }

    /// Connect two entity texts. Equal texts are never linked.
    fn link(&mut self, left: &str, right: &str) {
        if left == right {
            return;
        }
        let a = self.node(left);
        let b = self.node(right);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                if self.policy == EdgePolicy::Accumulate {
                    self.graph[edge] += 1;
                }
            }
            None => {
                self.graph.add_edge(a, b, 1);
            }
        }
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, text: &str) -> bool {
        self.index.contains_key(text)
    }

    /// Weight of the edge between two texts, if any.
    pub fn weight(&self, left: &str, right: &str) -> Option<u32> {
        let a = *self.index.get(left)?;
        let b = *self.index.get(right)?;
        self.graph.find_edge(a, b).map(|e| self.graph[e])
    }

    pub fn degree(&self, text: &str) -> usize {
        self.index
            .get(text)
            .map(|idx| self.graph.neighbors(*idx).count())
            .unwrap_or(0)
    }

    /// Node texts in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn export(&self) -> GraphExport {
        let nodes = self
            .graph
            .node_indices()
            .map(|idx| NodeRecord {
                id: self.graph[idx].clone(),
                degree: self.graph.neighbors(idx).count(),
            })
            .collect();
        let edges = self
            .graph
            .edge_references()
            .map(|edge| EdgeRecord {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                weight: *edge.weight(),
            })
            .collect();
        GraphExport {
            policy: self.policy,
            nodes,
            edges,
        }
    }

    /// Graphviz rendering; weights are shown only when accumulated.
    pub fn to_dot(&self) -> String {
        match self.policy {
            EdgePolicy::Collapse => {
                format!("{:?}", Dot::with_config(&self.graph, &[Config::EdgeNoLabel]))
            }
            EdgePolicy::Accumulate => format!("{:?}", Dot::new(&self.graph)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// Serializable node/edge lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub policy: EdgePolicy,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// Output encodings for the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GraphFormat {
    #[default]
    Json,
    Dot,
}

pub fn write_graph(path: &Path, graph: &CoOccurrenceGraph, format: GraphFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let body = match format {
        GraphFormat::Json => serde_json::to_string_pretty(&graph.export())?,
        GraphFormat::Dot => graph.to_dot(),
    };
    std::fs::write(path, body)?;
    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "wrote co-occurrence graph"
    );
    Ok(())
}
