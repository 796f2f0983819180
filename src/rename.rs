//! Template-based rename planning and cycle-safe plan application.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;

use crate::identifier::{IdPattern, Identifier};

const TEMP_SUFFIX: &str = ".renametmp";

/// How plan entries are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numbering {
    /// Each file keeps its own parsed season and episode.
    Parsed,
    /// Files are numbered in sort order from a fixed starting point.
    /// Only the episode counter advances, the season stays fixed.
    Sequential { start_season: u32, start_episode: u32 },
}

/// One planned rename, both names relative to the plan's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub source: String,
    pub target: String,
}

/// Compute a rename plan for the given file names.
///
/// Files the pattern cannot parse are silently left out. The remaining files
/// are sorted by `(season, episode, part rank, lowercased name)` and each is
/// rendered through the template with `{season}`, `{episode}`, `{part}`,
/// `{index}` (1-based) and `{ext}` placeholders. The original extension is
/// appended unless the template already handles it. An entry whose rendered
/// target comes out empty is dropped, a plan never contains an empty name.
#[must_use]
pub fn compute_plan(files: &[String], pattern: &IdPattern, template: &str, numbering: Numbering) -> Vec<RenameEntry> {
    let mut parsed: Vec<(String, Identifier)> = files
        .iter()
        .filter_map(|name| pattern.parse(name).map(|id| (name.clone(), id)))
        .collect();

    parsed.sort_by_key(|(name, id)| (id.season, id.episode, id.part_rank(), name.to_lowercase()));

    parsed
        .iter()
        .enumerate()
        .map(|(i, (name, id))| {
            let (season, episode) = match numbering {
                Numbering::Parsed => (id.season, id.episode),
                Numbering::Sequential {
                    start_season,
                    start_episode,
                } => (start_season, start_episode + i as u32),
            };
            let extension = Path::new(name)
                .extension()
                .map(|e| crate::os_str_to_string(e))
                .unwrap_or_default();
            let target = render_target(template, season, episode, id.part, i + 1, &extension);
            RenameEntry {
                source: name.clone(),
                target,
            }
        })
        .filter(|entry| !entry.target.is_empty())
        .collect()
}

fn render_target(template: &str, season: u32, episode: u32, part: Option<char>, index: usize, extension: &str) -> String {
    let rendered = template
        .replace("{season}", &season.to_string())
        .replace("{episode}", &episode.to_string())
        .replace("{part}", &part.map(String::from).unwrap_or_default())
        .replace("{index}", &index.to_string())
        .replace("{ext}", extension);

    let dotted = format!(".{extension}");
    if template.contains("{ext") || extension.is_empty() || rendered.ends_with(&dotted) {
        rendered
    } else {
        format!("{rendered}{dotted}")
    }
}

/// Check a plan for conflicts before applying it.
///
/// Returns every conflict found: duplicate targets within the plan, and
/// targets that already exist on disk without being renamed away by the plan
/// itself. An empty result means the plan is safe to apply.
#[must_use]
pub fn check_conflicts(directory: &Path, plan: &[RenameEntry]) -> Vec<String> {
    let mut conflicts: Vec<String> = Vec::new();

    let mut seen: HashSet<&str> = HashSet::new();
    let duplicates: Vec<&str> = plan
        .iter()
        .filter(|entry| !seen.insert(entry.target.as_str()))
        .map(|entry| entry.target.as_str())
        .collect();
    if !duplicates.is_empty() {
        let listing = duplicates.into_iter().unique().sorted().join(", ");
        conflicts.push(format!("Duplicate targets in plan: {listing}"));
    }

    let sources: HashSet<&str> = plan.iter().map(|entry| entry.source.as_str()).collect();
    for entry in plan {
        if entry.target != entry.source
            && !sources.contains(entry.target.as_str())
            && directory.join(&entry.target).exists()
        {
            conflicts.push(format!("Target exists already: {}", entry.target));
        }
    }

    conflicts
}

/// Apply a rename plan, tolerating overlaps and full cycles.
///
/// Any file whose name is both a plan target and a still-pending plan source
/// is first parked under a temporary name, then the remaining direct renames
/// run, and finally each parked file is moved to its own final target. Every
/// name points at no more than one file at each intermediate step, so a plan
/// that swaps two names applies cleanly.
///
/// If the process dies mid-apply the directory can be left with
/// `.renametmp`-suffixed names; there is no automatic recovery.
pub fn apply_plan(directory: &Path, plan: &[RenameEntry]) -> Result<()> {
    let final_targets: HashMap<&str, &str> = plan
        .iter()
        .map(|entry| (entry.source.as_str(), entry.target.as_str()))
        .collect();

    // Park every file that is about to be overwritten but still needs to be
    // renamed itself, remembering where it should finally end up.
    let mut parked: Vec<(String, &str)> = Vec::new();
    let mut parked_sources: HashSet<&str> = HashSet::new();
    for entry in plan {
        if entry.target == entry.source {
            continue;
        }
        if let Some(&final_target) = final_targets.get(entry.target.as_str()) {
            if final_target == entry.target {
                continue;
            }
            let temp = unique_temp_name(directory, &entry.target);
            std::fs::rename(directory.join(&entry.target), directory.join(&temp))
                .with_context(|| format!("Failed to move '{}' aside", entry.target))?;
            parked.push((temp, final_target));
            parked_sources.insert(entry.target.as_str());
        }
    }

    for entry in plan {
        if entry.target == entry.source || parked_sources.contains(entry.source.as_str()) {
            continue;
        }
        std::fs::rename(directory.join(&entry.source), directory.join(&entry.target))
            .with_context(|| format!("Failed to rename '{}' to '{}'", entry.source, entry.target))?;
    }

    for (temp, final_target) in parked {
        std::fs::rename(directory.join(&temp), directory.join(final_target))
            .with_context(|| format!("Failed to rename '{temp}' to '{final_target}'"))?;
    }

    Ok(())
}

fn unique_temp_name(directory: &Path, name: &str) -> String {
    let mut temp = format!("{name}{TEMP_SUFFIX}");
    while directory.join(&temp).exists() {
        temp.push_str("_x");
    }
    temp
}
