//! Directory scanning and episode-part grouping.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::identifier::{IdPattern, part_rank};
use crate::normalized_file_name;

/// Video file extensions the merge flow considers, lowercase without the dot.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "m4v", "avi", "webm"];

/// One part file of an episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodePart {
    pub path: PathBuf,
    pub part: char,
}

impl EpisodePart {
    /// The NFC-normalized file name of this part.
    #[must_use]
    pub fn file_name(&self) -> String {
        normalized_file_name(&self.path)
    }
}

/// All parts found for one `(season, episode)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeGroup {
    pub season: u32,
    pub episode: u32,
    pub parts: Vec<EpisodePart>,
}

/// List the regular files directly inside a directory, sorted by name.
///
/// The listing is non-recursive. A missing or non-directory path is an error.
pub fn list_regular_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        anyhow::bail!("Directory does not exist: '{}'", directory.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort();
    Ok(files)
}

/// NFC-normalized names of every regular file in a directory, sorted.
pub fn scan_files(directory: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = list_regular_files(directory)?
        .iter()
        .map(|path| normalized_file_name(path))
        .collect();

    names.sort();
    Ok(names)
}

/// Scan a directory for video files and bucket them into episode groups.
///
/// Files without a part letter are skipped since there is nothing to merge.
/// Within each group, parts are sorted by part rank and then lowercased name,
/// and duplicate part letters are dropped with the first in sort order
/// winning. Groups come back ascending by `(season, episode)`.
pub fn scan_all_groups(directory: &Path, pattern: &IdPattern) -> Result<Vec<EpisodeGroup>> {
    let mut buckets: BTreeMap<(u32, u32), Vec<EpisodePart>> = BTreeMap::new();

    for path in video_files(directory)? {
        let name = normalized_file_name(&path);
        if let Some(id) = pattern.parse(&name) {
            if let Some(part) = id.part {
                buckets
                    .entry((id.season, id.episode))
                    .or_default()
                    .push(EpisodePart { path, part });
            }
        }
    }

    let groups = buckets
        .into_iter()
        .map(|((season, episode), mut parts)| {
            sort_and_dedup_parts(&mut parts);
            EpisodeGroup { season, episode, parts }
        })
        .collect();

    Ok(groups)
}

/// Scan a directory for the part files of one specific episode.
///
/// Unlike [`scan_all_groups`] this keeps duplicate part letters,
/// sorted by part rank and then lowercased name.
pub fn scan_matching_files(directory: &Path, pattern: &IdPattern, season: u32, episode: u32) -> Result<Vec<EpisodePart>> {
    let mut parts: Vec<EpisodePart> = Vec::new();

    for path in video_files(directory)? {
        let name = normalized_file_name(&path);
        if let Some(id) = pattern.parse(&name) {
            if id.season == season && id.episode == episode {
                if let Some(part) = id.part {
                    parts.push(EpisodePart { path, part });
                }
            }
        }
    }

    parts.sort_by_key(|p| (part_rank(Some(p.part)), p.file_name().to_lowercase()));
    Ok(parts)
}

fn video_files(directory: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_regular_files(directory)?
        .into_iter()
        .filter(|path| VIDEO_EXTENSIONS.contains(&crate::path_to_file_extension_string(path).as_str()))
        .collect())
}

fn sort_and_dedup_parts(parts: &mut Vec<EpisodePart>) {
    parts.sort_by_key(|p| (part_rank(Some(p.part)), p.file_name().to_lowercase()));
    let mut seen: HashSet<char> = HashSet::new();
    parts.retain(|p| seen.insert(p.part));
}
