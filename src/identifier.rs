//! Season/episode/part identifier parsing.

use std::fmt;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// Default identifier pattern, matching names like `S01E05b`.
pub const DEFAULT_PATTERN: &str = r"S(?P<season>\d{1,2})E(?P<episode>\d{2})(?P<part>[A-Z])?";

/// Fallback for names that carry a bare two-digit episode number like `07a`.
static FALLBACK_EPISODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"(?P<episode>\d{2})(?P<part>[A-Za-z])?")
        .case_insensitive(true)
        .build()
        .expect("Invalid fallback episode regex")
});

/// Rank of a part letter for sort ordering: A-Z map to 1-26,
/// no part or a non-letter part is 0.
#[must_use]
pub fn part_rank(part: Option<char>) -> u32 {
    part.filter(char::is_ascii_alphabetic)
        .map_or(0, |letter| u32::from(letter.to_ascii_uppercase()) - u32::from('A') + 1)
}

/// One parsed episode identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    pub season: u32,
    pub episode: u32,
    pub part: Option<char>,
}

impl Identifier {
    #[must_use]
    pub const fn new(season: u32, episode: u32, part: Option<char>) -> Self {
        Self { season, episode, part }
    }

    /// Sort rank of this identifier's part letter.
    #[must_use]
    pub fn part_rank(&self) -> u32 {
        part_rank(self.part)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)?;
        if let Some(part) = self.part {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// A compiled identifier pattern with named `season` and `episode` groups.
#[derive(Debug, Clone)]
pub struct IdPattern {
    regex: Regex,
    used_default: bool,
}

impl IdPattern {
    /// Compile a user-supplied pattern, case-insensitively.
    ///
    /// An invalid regex is an error. A valid regex that is missing the
    /// required `season` or `episode` named groups falls back to the default
    /// pattern with `used_default` set, so callers can warn about it.
    pub fn compile(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid identifier regex: '{pattern}'"))?;

        if has_required_groups(&regex) {
            Ok(Self {
                regex,
                used_default: false,
            })
        } else {
            Ok(Self {
                regex: default_regex(),
                used_default: true,
            })
        }
    }

    /// Compile a user-supplied pattern, silently falling back to the default
    /// pattern when it does not compile or lacks the required groups.
    #[must_use]
    pub fn compile_or_default(pattern: &str) -> Self {
        Self::compile(pattern).unwrap_or_else(|_| Self::default_pattern())
    }

    /// The built-in default pattern.
    #[must_use]
    pub fn default_pattern() -> Self {
        Self {
            regex: default_regex(),
            used_default: false,
        }
    }

    /// True when the user's pattern was replaced by the default one.
    #[must_use]
    pub const fn substituted_default(&self) -> bool {
        self.used_default
    }

    /// Parse an identifier out of a file name.
    ///
    /// The primary pattern is searched first. When it matches, its captures
    /// are authoritative: unparseable numbers yield `None` without trying the
    /// fallback. Only when the primary pattern does not match at all is the
    /// bare-episode fallback tried, with the season fixed to 1.
    #[must_use]
    pub fn parse(&self, name: &str) -> Option<Identifier> {
        if let Some(captures) = self.regex.captures(name) {
            let season = captures.name("season")?.as_str().parse::<u32>().ok()?;
            let episode = captures.name("episode")?.as_str().parse::<u32>().ok()?;
            let part = captures
                .name("part")
                .and_then(|m| m.as_str().chars().next())
                .map(|c| c.to_ascii_uppercase());
            return Some(Identifier::new(season, episode, part));
        }

        let captures = FALLBACK_EPISODE_PATTERN.captures(name)?;
        let episode = captures.name("episode")?.as_str().parse::<u32>().ok()?;
        let part = captures
            .name("part")
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase());
        Some(Identifier::new(1, episode, part))
    }
}

fn default_regex() -> Regex {
    RegexBuilder::new(DEFAULT_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("Invalid default identifier regex")
}

fn has_required_groups(regex: &Regex) -> bool {
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    names.contains(&"season") && names.contains(&"episode")
}
