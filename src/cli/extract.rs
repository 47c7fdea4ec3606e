//! CLI entry-point for entity and relationship extraction.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{self, EngineKind},
    config::Settings,
    data::table,
};

/// Args for the `extract` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Input table with `Website` and `Text` columns (.csv or .xlsx).
    #[arg(long)]
    pub input: PathBuf,
    /// Annotation source.
    #[arg(long, default_value = "precomputed", value_enum)]
    pub engine: EngineKind,
    /// JSON-lines parse file for the precomputed engine.
    #[arg(long)]
    pub parses: Option<PathBuf>,
    /// Enriched output table (defaults to `<outputs>/insights_results.csv`).
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Length of the most-common tables printed at the end.
    #[arg(long)]
    pub top: Option<usize>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let engine = cli::load_engine(args.engine, args.parses.as_deref(), &settings)?;
    let documents = cli::documents_or_empty(&args.input);
    let (records, failed) =
        cli::annotate_records(engine, documents, settings.concurrency).await;
    info!(records = records.len(), failed, "extraction finished");

    cli::print_top_tables(&records, args.top.unwrap_or(settings.top_n));

    let output = cli::output_or(args.output, &settings, "insights_results.csv");
    table::write_enriched(&output, &records, false)?;
    println!("\nInsights saved to '{}'", output.display());
    Ok(())
}
