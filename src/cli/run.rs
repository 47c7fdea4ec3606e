//! CLI entry-point running the whole batch pipeline.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{self, DistributionArg, EdgePolicyArg, EngineKind},
    config::{self, Settings},
    data::table,
    insights::{self, graph, regions, RunSummary},
    nlp::classify::{classify_batch, Taxonomy},
};

/// Args for the `run` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Input table with `Website` and `Text` columns (.csv or .xlsx).
    #[arg(long)]
    pub input: PathBuf,
    #[arg(long, default_value = "precomputed", value_enum)]
    pub engine: EngineKind,
    /// JSON-lines parse file for the precomputed engine.
    #[arg(long)]
    pub parses: Option<PathBuf>,
    /// Category → keywords JSON (defaults to TAXONOMY_PATH).
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,
    #[arg(long, default_value = "first-match", value_enum)]
    pub distribution: DistributionArg,
    /// Number of leading documents in the graph (defaults to GRAPH_SAMPLE_SIZE).
    #[arg(long)]
    pub sample_size: Option<usize>,
    /// Comma separated entity labels kept as graph nodes (defaults to GRAPH_LABELS).
    #[arg(long)]
    pub labels: Option<String>,
    /// Repeated co-occurrence handling (defaults to GRAPH_EDGE_POLICY).
    #[arg(long, value_enum)]
    pub edge_policy: Option<EdgePolicyArg>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let engine = cli::load_engine(args.engine, args.parses.as_deref(), &settings)?;
    let taxonomy_path = args.taxonomy.unwrap_or_else(|| settings.taxonomy_path.clone());
    let taxonomy = Taxonomy::load_or_empty(&taxonomy_path);

    let documents = cli::documents_or_empty(&args.input);
    let total = documents.len();
    let (mut records, failed) =
        cli::annotate_records(engine, documents, settings.concurrency).await;

    let classification = classify_batch(
        records.iter().map(|r| r.document.raw_text.as_str()),
        &taxonomy,
        args.distribution.into(),
    );
    for (record, label) in records.iter_mut().zip(classification.labels) {
        record.category = Some(label);
    }

    let entity_lists = || records.iter().map(|r| r.entities.as_slice());
    let region_counts = regions::aggregate_regions(entity_lists());
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
    let co_graph = builder.build(entity_lists());

    table::write_enriched(&settings.join_output("insights_results.csv"), &records, true)?;
    insights::write_json(&settings.join_output("categories.json"), &classification.distribution)?;
    regions::write_region_counts(&settings.join_output("region_counts.csv"), &region_counts)?;
    insights::write_json(&settings.join_output("regions.json"), &region_counts)?;
    graph::write_graph(
        &settings.join_output("graph.json"),
        &co_graph,
        graph::GraphFormat::Json,
    )?;

    let summary = RunSummary {
        generated_at: Utc::now(),
        documents: total,
        failed_documents: failed,
        top_entities: RunSummary::rank_entities(insights::top_entities(
            entity_lists(),
            settings.top_n,
        )),
        top_relationships: RunSummary::rank_relationships(insights::top_relationships(
            records.iter().map(|r| r.relationships.as_slice()),
            settings.top_n,
        )),
        categories: classification.distribution,
        regions: region_counts.len(),
        graph_nodes: co_graph.node_count(),
        graph_edges: co_graph.edge_count(),
    };
    insights::write_json(&settings.join_output("summary.json"), &summary)?;
    cli::print_top_tables(&records, settings.top_n);
    info!(
        documents = summary.documents,
        failed = summary.failed_documents,
        regions = summary.regions,
        "run finished"
    );
    Ok(())
}
