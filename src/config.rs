use anyhow::{Result, ensure};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::report::OwnerFilter;

/// Validated runtime configuration. Bad paths or patterns abort here, before
/// any scanning starts.
#[derive(Debug)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub filter: OwnerFilter,
    pub jobs: Option<usize>,
}

pub fn resolve(cli: &Cli) -> Result<Config> {
    ensure!(
        cli.input.is_dir(),
        "input directory does not exist or is not a directory: {}",
        cli.input.display()
    );
    if let Some(jobs) = cli.jobs {
        ensure!(jobs > 0, "--jobs must be at least 1");
    }

    let filter = OwnerFilter::new(&cli.include, cli.exclude.as_deref())?;

    Ok(Config {
        input_dir: cli.input.clone(),
        output_path: cli.output.clone(),
        filter,
        jobs: cli.jobs,
    })
}
