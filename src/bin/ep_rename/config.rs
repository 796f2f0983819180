use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use episode_tools::identifier::DEFAULT_PATTERN;
use episode_tools::print_error;
use episode_tools::rename::Numbering;
use serde::Deserialize;

use crate::RenameArgs;

/// Default name template.
const DEFAULT_TEMPLATE: &str = "Episode {episode} Staffel {season}";

/// User configuration from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct EpRenameConfig {
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    ep_rename: EpRenameConfig,
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) path: PathBuf,
    pub(crate) pattern_text: String,
    pub(crate) template: String,
    pub(crate) numbering: Numbering,
    pub(crate) dryrun: bool,
    pub(crate) verbose: bool,
}

impl EpRenameConfig {
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
            .map(|config| config.ep_rename)
            .unwrap_or_default()
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub(crate) fn try_from_args(args: RenameArgs, user_config: EpRenameConfig) -> Result<Self> {
        let path = episode_tools::resolve_input_path(args.path.as_deref())?;

        let pattern_text = args
            .regex
            .or(user_config.regex)
            .unwrap_or_else(|| DEFAULT_PATTERN.to_string());

        let template = args
            .template
            .or(user_config.template)
            .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string());

        let numbering = if args.manual {
            Numbering::Sequential {
                start_season: args.season,
                start_episode: args.episode,
            }
        } else {
            Numbering::Parsed
        };

        Ok(Self {
            path,
            pattern_text,
            template,
            numbering,
            dryrun: args.print,
            verbose: args.verbose || user_config.verbose,
        })
    }
}
