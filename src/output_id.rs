//! Output identifier shape inference and formatting.
//!
//! Merged outputs are named after their episode identifier. The shape of that
//! name, meaning the separator between the season and episode numbers and the
//! zero-padding widths, is inferred from a user-supplied sample like `S01E10`.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

static SAMPLE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^s(?P<body>.+)$")
        .case_insensitive(true)
        .build()
        .expect("Invalid sample body regex")
});

static DIGITS_SEP_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<season>\d+)(?P<sep>\D+)(?P<episode>\d+)$").expect("Invalid sample split regex")
});

/// Separator and zero-padding widths of an output identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputIdShape {
    pub separator: String,
    pub season_width: usize,
    pub episode_width: usize,
}

impl Default for OutputIdShape {
    fn default() -> Self {
        Self {
            separator: "E".to_string(),
            season_width: 2,
            episode_width: 2,
        }
    }
}

impl OutputIdShape {
    /// Infer the shape from a sample identifier.
    ///
    /// The sample must start with a literal `S`. Its remainder is either
    /// `digits + separator + digits`, or a bare digit run that is split into
    /// season and episode widths by length. Anything else falls back to the
    /// default `S01E10` shape.
    #[must_use]
    pub fn from_sample(sample: &str) -> Self {
        let Some(captures) = SAMPLE_BODY.captures(sample.trim()) else {
            return Self::default();
        };
        let body = &captures["body"];

        if let Some(m) = DIGITS_SEP_DIGITS.captures(body) {
            return Self {
                separator: m["sep"].to_string(),
                season_width: m["season"].len(),
                episode_width: m["episode"].len(),
            };
        }

        if body.chars().all(|c| c.is_ascii_digit()) {
            let n = body.len();
            if n >= 4 {
                let episode_width = if n % 2 == 0 { n / 2 } else { 2 };
                return Self {
                    separator: String::new(),
                    season_width: n - episode_width,
                    episode_width,
                };
            } else if n == 3 {
                return Self {
                    separator: String::new(),
                    season_width: 1,
                    episode_width: 2,
                };
            } else if n == 2 {
                return Self {
                    separator: String::new(),
                    season_width: 1,
                    episode_width: 1,
                };
            }
        }

        Self::default()
    }

    /// Render an output identifier in this shape.
    #[must_use]
    pub fn format(&self, season: u32, episode: u32) -> String {
        format!(
            "S{season:0sw$}{}{episode:0ew$}",
            self.separator,
            sw = self.season_width,
            ew = self.episode_width
        )
    }
}

#[cfg(test)]
mod output_id_tests {
    use super::*;

    fn shape(separator: &str, season_width: usize, episode_width: usize) -> OutputIdShape {
        OutputIdShape {
            separator: separator.to_string(),
            season_width,
            episode_width,
        }
    }

    #[test]
    fn infers_shape_from_standard_sample() {
        assert_eq!(OutputIdShape::from_sample("S01E10"), shape("E", 2, 2));
    }

    #[test]
    fn infers_shape_with_custom_separator() {
        assert_eq!(OutputIdShape::from_sample("S1-E02"), shape("-E", 1, 2));
        assert_eq!(OutputIdShape::from_sample("s02x05"), shape("x", 2, 2));
    }

    #[test]
    fn splits_even_digit_run_in_half() {
        assert_eq!(OutputIdShape::from_sample("S0110"), shape("", 2, 2));
        assert_eq!(OutputIdShape::from_sample("S001010"), shape("", 3, 3));
    }

    #[test]
    fn odd_digit_run_keeps_last_two_as_episode() {
        assert_eq!(OutputIdShape::from_sample("S00110"), shape("", 3, 2));
    }

    #[test]
    fn short_digit_runs() {
        assert_eq!(OutputIdShape::from_sample("S110"), shape("", 1, 2));
        assert_eq!(OutputIdShape::from_sample("S11"), shape("", 1, 1));
    }

    #[test]
    fn unparseable_samples_use_default_shape() {
        assert_eq!(OutputIdShape::from_sample(""), OutputIdShape::default());
        assert_eq!(OutputIdShape::from_sample("E01"), OutputIdShape::default());
        assert_eq!(OutputIdShape::from_sample("S1"), OutputIdShape::default());
        assert_eq!(OutputIdShape::from_sample("Sabc"), OutputIdShape::default());
    }

    #[test]
    fn formats_with_padding_and_separator() {
        assert_eq!(OutputIdShape::default().format(1, 10), "S01E10");
        assert_eq!(OutputIdShape::from_sample("S1-E02").format(1, 5), "S1-E05");
        assert_eq!(OutputIdShape::from_sample("S0110").format(12, 3), "S1203");
    }

    #[test]
    fn format_does_not_truncate_wide_numbers() {
        assert_eq!(OutputIdShape::from_sample("S11").format(10, 12), "S1012");
    }
}
