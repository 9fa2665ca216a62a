use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "refscan")]
#[command(about = "Tally external class member references across a corpus of JAR artifacts")]
pub struct Cli {
    /// Directory whose direct children are the artifacts to scan.
    #[arg(long, value_name = "DIR", default_value = "dump")]
    pub input: PathBuf,

    /// Report file, one `<count> <owner.member:signature>` line per symbol.
    #[arg(short = 'o', long, value_name = "FILE", default_value = "references.log")]
    pub output: PathBuf,

    /// Anchored regex an owner's internal name must match to be reported.
    #[arg(long, value_name = "PATTERN", default_value = ".*")]
    pub include: String,

    /// Anchored regex that removes matching owners from the report.
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Option<String>,

    /// Worker pool size; defaults to the number of available cores.
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,
}
