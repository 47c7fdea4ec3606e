//! CLI entry-point for per-region mention counts.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    cli,
    config::Settings,
    insights::{self, regions},
};

/// Args for the `regions` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Enriched table produced by `extract`.
    #[arg(long)]
    pub input: PathBuf,
    /// Output CSV (defaults to `<outputs>/region_counts.csv`).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let batch = cli::enriched_or_empty(&args.input);
    let counts = regions::aggregate_regions(batch.records.iter().map(|r| r.entities.as_slice()));

    for (region, count) in &counts {
        println!("{region}: {count}");
    }

    let output = cli::output_or(args.output, &settings, "region_counts.csv");
    regions::write_region_counts(&output, &counts)?;
    insights::write_json(&settings.join_output("regions.json"), &counts)?;
    Ok(())
}
