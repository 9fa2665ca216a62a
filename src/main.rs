use anyhow::{Context, Result};
use clap::Parser;
use refscan::cli::Cli;
use refscan::config;
use refscan::report::{report_entries, write_report};
use refscan::scan::{ScanSummary, list_artifacts, scan_corpus};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Serialize)]
struct RunSummary {
    artifacts_found: usize,
    distinct_symbols: usize,
    reported_symbols: usize,
    duration_ms: u64,
    #[serde(flatten)]
    scan: ScanSummary,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::resolve(&cli)?;

    if let Some(jobs) = config.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("failed to configure worker pool")?;
    }

    let start = Instant::now();
    let artifacts = list_artifacts(&config.input_dir)?;
    let outcome = scan_corpus(&artifacts);
    let entries = report_entries(&outcome.tally, &config.filter);
    write_report(&config.output_path, &entries)?;

    let summary = RunSummary {
        artifacts_found: artifacts.len(),
        distinct_symbols: outcome.tally.len(),
        reported_symbols: entries.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        scan: outcome.summary,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
