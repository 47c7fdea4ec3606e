//! CLI entry-point for the entity co-occurrence graph.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli::{self, EdgePolicyArg, GraphFormatArg},
    config::{self, Settings},
    insights::graph::{self, GraphFormat},
};

/// Args for the `graph` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Enriched table produced by `extract`.
    #[arg(long)]
    pub input: PathBuf,
    /// Number of leading documents to include (defaults to GRAPH_SAMPLE_SIZE).
    #[arg(long)]
    pub sample_size: Option<usize>,
    /// Comma separated entity labels kept as nodes (defaults to GRAPH_LABELS).
    #[arg(long)]
    pub labels: Option<String>,
    /// Repeated co-occurrence handling (defaults to GRAPH_EDGE_POLICY).
    #[arg(long, value_enum)]
    pub edge_policy: Option<EdgePolicyArg>,
    #[arg(long, default_value = "json", value_enum)]
    pub format: GraphFormatArg,
    /// Output file (defaults to `<outputs>/graph.json` or `graph.dot`).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let mut builder = settings.graph_builder();
    if let Some(sample_size) = args.sample_size {
        builder = builder.with_sample_size(sample_size);
    }
    if let Some(labels) = args.labels.as_deref() {
        builder = builder.with_labels(config::parse_labels(labels));
    }
    if let Some(policy) = args.edge_policy {
        builder = builder.with_policy(policy.into());
    }

    let batch = cli::enriched_or_empty(&args.input);
    let built = builder.build(batch.records.iter().map(|r| r.entities.as_slice()));
    println!(
        "Co-occurrence graph: {} nodes, {} edges (first {} documents, {} edges)",
        built.node_count(),
        built.edge_count(),
        builder.sample_size,
        built.policy()
    );

    let format: GraphFormat = args.format.into();
    let default = match format {
        GraphFormat::Json => "graph.json",
        GraphFormat::Dot => "graph.dot",
    };
    let output = cli::output_or(args.output, &settings, default);
    graph::write_graph(&output, &built, format)
}
