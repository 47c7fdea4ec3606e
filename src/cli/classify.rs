//! CLI entry-point for offense classification.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{self, DistributionArg},
    config::Settings,
    data::table,
    insights,
    nlp::classify::{classify_batch, Taxonomy},
};

/// Args for the `classify` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Enriched table produced by `extract`.
    #[arg(long)]
    pub input: PathBuf,
    /// Category → keywords JSON (defaults to TAXONOMY_PATH).
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,
    /// How the distribution counts documents matching several categories.
    #[arg(long, default_value = "first-match", value_enum)]
    pub distribution: DistributionArg,
    /// Labelled output table (defaults to `<outputs>/categorised.csv`).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let taxonomy_path = args.taxonomy.unwrap_or_else(|| settings.taxonomy_path.clone());
    let taxonomy = Taxonomy::load_or_empty(&taxonomy_path);
    let mut records = cli::enriched_or_empty(&args.input).records;

    let batch = classify_batch(
        records.iter().map(|r| r.document.raw_text.as_str()),
        &taxonomy,
        args.distribution.into(),
    );
    for (record, label) in records.iter_mut().zip(batch.labels) {
        record.category = Some(label);
    }
    info!(
        records = records.len(),
        categories = batch.distribution.len(),
        "classification finished"
    );

    println!("\nCrime category distribution:");
    for (category, count) in &batch.distribution {
        println!("{category}: {count}");
    }

    let output = cli::output_or(args.output, &settings, "categorised.csv");
    table::write_enriched(&output, &records, true)?;
    insights::write_json(&settings.join_output("categories.json"), &batch.distribution)?;
    Ok(())
}
