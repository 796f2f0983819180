//! Template-based batch renaming.

use anyhow::Result;
use colored::Colorize;
use episode_tools::identifier::IdPattern;
use episode_tools::rename::{self, RenameEntry};
use episode_tools::{print_error, print_warning, show_diff};

use crate::RenameArgs;
use crate::config::{Config, EpRenameConfig};

/// Plans and applies template-based renames for one directory.
pub struct Renamer {
    config: Config,
}

impl Renamer {
    pub fn new(args: RenameArgs) -> Result<Self> {
        let user_config = EpRenameConfig::get_user_config();
        let config = Config::try_from_args(args, user_config)?;
        Ok(Self { config })
    }

    pub fn run(&self) -> Result<()> {
        let pattern = IdPattern::compile(&self.config.pattern_text)?;
        if pattern.substituted_default() {
            print_warning!("Pattern is missing the required \"season\" and \"episode\" groups, using the default pattern");
        }

        if self.config.verbose {
            println!("{}", format!("Renaming files in {}", self.config.path.display()).bold());
        }

        let files = episode_tools::grouping::scan_files(&self.config.path)?;
        let plan = rename::compute_plan(&files, &pattern, &self.config.template, self.config.numbering);
        if plan.is_empty() {
            println!("Nothing to rename");
            return Ok(());
        }

        if self.config.dryrun {
            print_plan(&plan);
            return Ok(());
        }

        let conflicts = rename::check_conflicts(&self.config.path, &plan);
        if !conflicts.is_empty() {
            print_error!("Cannot rename, the plan has {} conflict(s):", conflicts.len());
            for conflict in &conflicts {
                eprintln!("{}", format!("  {conflict}").red());
            }
            anyhow::bail!("Rename aborted");
        }

        let renames: Vec<&RenameEntry> = plan.iter().filter(|entry| entry.source != entry.target).collect();
        rename::apply_plan(&self.config.path, &plan)?;

        let total = renames.len();
        for (index, entry) in renames.iter().enumerate() {
            println!("{}", format!("Rename {}/{total}:", index + 1).bold());
            show_diff(&entry.source, &entry.target);
        }
        println!("{}", format!("Renamed {total} file(s)").green());
        Ok(())
    }
}

/// Print the plan as aligned `source  ->  target` lines.
fn print_plan(plan: &[RenameEntry]) {
    let width = plan.iter().map(|entry| entry.source.chars().count()).max().unwrap_or(0);
    for entry in plan {
        println!("{:<width$}  ->  {}", entry.source, entry.target);
    }
    println!("{} file(s) in plan", plan.len());
}
