mod config;
mod renamer;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::renamer::Renamer;

#[derive(Parser)]
#[command(author, version, name = env!("CARGO_BIN_NAME"), about = "Batch rename episode files from a name template")]
pub(crate) struct RenameArgs {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Identifier regex with named "season", "episode" and "part" groups
    #[arg(short = 'x', long, name = "REGEX")]
    regex: Option<String>,

    /// Name template with {season}, {episode}, {part}, {index} and {ext} placeholders
    #[arg(short, long, name = "TEMPLATE")]
    template: Option<String>,

    /// Number files sequentially instead of using parsed identifiers
    #[arg(short, long)]
    manual: bool,

    /// Season number for manual numbering
    #[arg(short, long, name = "SEASON", default_value_t = 1)]
    season: u32,

    /// First episode number for manual numbering
    #[arg(short, long, name = "EPISODE", default_value_t = 1)]
    episode: u32,

    /// Print the rename plan without applying it
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
    let args = RenameArgs::parse();
    if let Some(ref shell) = args.completion {
        episode_tools::generate_shell_completion(*shell, RenameArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        Renamer::new(args)?.run()
    }
}
