//! Command-line interface wiring for news-insights.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, warn};

use crate::{
    config::Settings,
    data::{
        table::{self, EnrichedBatch},
        Document, EnrichedRecord,
    },
    insights::graph::{EdgePolicy, GraphFormat},
    nlp::{self, classify::DistributionMode, ner::GazetteerEngine, parses::PrecomputedEngine, NlpEngine},
};

pub mod classify;
pub mod extract;
pub mod graph;
pub mod regions;
pub mod run;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "News excerpt insight pipeline", long_about = None)]
pub struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Extract(args) => extract::run(args, settings).await,
            Commands::Classify(args) => classify::run(args, settings).await,
            Commands::Regions(args) => regions::run(args, settings).await,
            Commands::Graph(args) => graph::run(args, settings).await,
            Commands::Run(args) => run::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract entities and subject-verb-object triples into an enriched table.
    Extract(extract::Args),
    /// Label each excerpt with an offense category and report the distribution.
    Classify(classify::Args),
    /// Count GPE mentions per region.
    Regions(regions::Args),
    /// Build the entity co-occurrence graph.
    Graph(graph::Args),
    /// Extract, classify, count regions and build the graph in one pass.
    Run(run::Args),
    /// Serve the artefacts of the last run as JSON.
    Serve(serve::Args),
}

/// Source of linguistic annotations.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EngineKind {
    /// JSON-lines parses exported by an external NLP toolkit.
    Precomputed,
    /// Built-in place-name dictionary; no dependency parse.
    Gazetteer,
}

/// Distribution counting mode on the command line.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum DistributionArg {
    #[default]
    FirstMatch,
    MultiLabel,
}

impl From<DistributionArg> for DistributionMode {
    fn from(value: DistributionArg) -> Self {
        match value {
            DistributionArg::FirstMatch => Self::FirstMatch,
            DistributionArg::MultiLabel => Self::MultiLabel,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EdgePolicyArg {
    Collapse,
    Accumulate,
}

impl From<EdgePolicyArg> for EdgePolicy {
    fn from(value: EdgePolicyArg) -> Self {
        match value {
            EdgePolicyArg::Collapse => Self::Collapse,
            EdgePolicyArg::Accumulate => Self::Accumulate,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum GraphFormatArg {
    #[default]
    Json,
    Dot,
}

impl From<GraphFormatArg> for GraphFormat {
    fn from(value: GraphFormatArg) -> Self {
        match value {
            GraphFormatArg::Json => Self::Json,
            GraphFormatArg::Dot => Self::Dot,
        }
    }
}

/// Build the requested engine; precomputed parses default to `<data>/parses.jsonl`.
pub fn load_engine(
    kind: EngineKind,
    parses: Option<&Path>,
    settings: &Settings,
) -> Result<Arc<dyn NlpEngine>> {
    match kind {
        EngineKind::Precomputed => {
            let path = parses
                .map(Path::to_path_buf)
                .unwrap_or_else(|| settings.join_data("parses.jsonl"));
            Ok(Arc::new(PrecomputedEngine::from_path(&path)?) as Arc<dyn NlpEngine>)
        }
        EngineKind::Gazetteer => Ok(Arc::new(GazetteerEngine) as Arc<dyn NlpEngine>),
    }
}

/// Read the input documents; an unreadable table yields an empty batch.
pub fn documents_or_empty(path: &Path) -> Vec<Document> {
    table::read_documents(path).unwrap_or_else(|err| {
        error!(path = %path.display(), error = %err, "input table rejected; batch halted");
        Vec::new()
    })
}

/// Read an enriched table; an unreadable table yields an empty batch.
pub fn enriched_or_empty(path: &Path) -> EnrichedBatch {
    table::read_enriched(path).unwrap_or_else(|err| {
        error!(path = %path.display(), error = %err, "enriched table rejected; batch halted");
        EnrichedBatch::default()
    })
}

/// Annotate documents and keep the successes in input order.
pub async fn annotate_records(
    engine: Arc<dyn NlpEngine>,
    documents: Vec<Document>,
    concurrency: usize,
) -> (Vec<EnrichedRecord>, usize) {
    let results = nlp::annotate(engine, documents, concurrency).await;
    let mut records = Vec::with_capacity(results.len());
    let mut failed = 0;
    for result in results {
        match result {
            Ok(annotated) => records.push(EnrichedRecord {
                document: annotated.document,
                entities: annotated.entities,
                relationships: annotated.relationships,
                category: None,
            }),
            Err(failure) => {
                failed += 1;
                warn!(document = failure.id, error = %failure.error, "skipping document");
            }
        }
    }
    (records, failed)
}

/// Print the most-common entity and relationship tables.
pub fn print_top_tables(records: &[EnrichedRecord], n: usize) {
    let entities = crate::insights::top_entities(records.iter().map(|r| r.entities.as_slice()), n);
    println!("\nTop {n} entities:");
    for (entity, count) in &entities {
        println!("{} ({}): {count} occurrences", entity.text, entity.label);
    }

    let relationships =
        crate::insights::top_relationships(records.iter().map(|r| r.relationships.as_slice()), n);
    println!("\nTop {n} subject-verb-object relationships:");
    for (relationship, count) in &relationships {
        println!("{relationship} ({count} occurrences)");
    }
}

pub(crate) fn output_or(path: Option<PathBuf>, settings: &Settings, default: &str) -> PathBuf {
    path.unwrap_or_else(|| settings.join_output(default))
}
