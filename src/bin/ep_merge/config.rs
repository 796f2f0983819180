use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use episode_tools::identifier::DEFAULT_PATTERN;
use episode_tools::print_error;
use serde::Deserialize;

use crate::MergeArgs;

/// Default sample used to infer the output identifier shape.
const DEFAULT_SAMPLE: &str = "S01E10";

/// User configuration from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct EpMergeConfig {
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    sample: Option<String>,
    #[serde(default)]
    overwrite: bool,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    target_width: Option<u32>,
    #[serde(default)]
    target_height: Option<u32>,
    #[serde(default)]
    target_fps: Option<String>,
    #[serde(default)]
    sample_rate: Option<u32>,
    #[serde(default)]
    channel_layout: Option<String>,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    ep_merge: EpMergeConfig,
}

/// Encoding target for merged outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeTarget {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) fps: String,
    pub(crate) sample_rate: u32,
    pub(crate) channel_layout: String,
}

impl Default for EncodeTarget {
    fn default() -> Self {
        Self {
            width: 512,
            height: 384,
            fps: "24000/1001".to_string(),
            sample_rate: 48000,
            channel_layout: "stereo".to_string(),
        }
    }
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) path: PathBuf,
    pub(crate) pattern_text: String,
    pub(crate) sample: String,
    pub(crate) identifier: Option<String>,
    pub(crate) overwrite: bool,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
    pub(crate) target: EncodeTarget,
}

impl EpMergeConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    pub fn get_user_config() -> Self {
        episode_tools::config::CONFIG_PATH
            .as_deref()
            .filter(|path| path.exists())
            .and_then(|path| {
                fs::read_to_string(path)
                    .map_err(|e| {
                        print_error!("Error reading config file {}: {e}", path.display());
                    })
                    .ok()
            })
            .and_then(|config_string| {
                toml::from_str::<UserConfig>(&config_string)
                    .map_err(|e| {
                        print_error!("Error reading config file: {e}");
                    })
                    .ok()
            })
            .map(|config| config.ep_merge)
            .unwrap_or_default()
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub(crate) fn try_from_args(args: MergeArgs, user_config: EpMergeConfig) -> Result<Self> {
        let path = episode_tools::resolve_input_path(args.path.as_deref())?;

        let pattern_text = args
            .regex
            .or(user_config.regex)
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());

        let sample = args
            .sample
            .or(user_config.sample)
            .unwrap_or_else(|| DEFAULT_SAMPLE.to_string());

        let default_target = EncodeTarget::default();
        let target = EncodeTarget {
            width: user_config.target_width.unwrap_or(default_target.width),
            height: user_config.target_height.unwrap_or(default_target.height),
            fps: user_config.target_fps.unwrap_or(default_target.fps),
            sample_rate: user_config.sample_rate.unwrap_or(default_target.sample_rate),
            channel_layout: user_config.channel_layout.unwrap_or(default_target.channel_layout),
        };

        Ok(Self {
            path,
            pattern_text,
            sample,
            identifier: args.identifier,
            overwrite: args.force || user_config.overwrite,
            dryrun: args.print,
            verbose: args.verbose || user_config.verbose,
            target,
        })
    }
}
