mod config;
mod logger;
mod merge;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::merge::Merge;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Merge multi-part episode recordings into single files with ffmpeg")]
pub(crate) struct MergeArgs {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Identifier regex with named "season", "episode" and "part" groups
    #[arg(short = 'x', long, name = "REGEX")]
    regex: Option<String>,

    /// Sample output identifier such as "S01E10"
    #[arg(short, long, name = "SAMPLE")]
    sample: Option<String>,

    /// Merge only the episode matching this identifier
    #[arg(short, long, name = "IDENTIFIER")]
    identifier: Option<String>,

    /// Overwrite existing output files
    #[arg(short, long)]
    force: bool,

    /// Print groups without merging
    #[arg(short, long)]
    print: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = MergeArgs::parse();
    if let Some(ref shell) = args.completion {
        episode_tools::generate_shell_completion(*shell, MergeArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        Merge::new(args)?.run()
    }
}
