use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use subber::matching::{DEFAULT_DATE_BOOST, DEFAULT_MIN_SIMILARITY, MatchOptions};

use crate::SubberArgs;

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) absolute_paths: bool,
    pub(crate) auto: bool,
    pub(crate) convert: bool,
    pub(crate) dryrun: bool,
    pub(crate) move_unmatched: Option<String>,
    pub(crate) no_table: bool,
    pub(crate) options: MatchOptions,
    pub(crate) output: Option<PathBuf>,
    pub(crate) overwrite: bool,
    pub(crate) rename: bool,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
pub struct SubberConfig {
    #[serde(default)]
    absolute_paths: bool,
    #[serde(default)]
    date_boost: Option<f64>,
    #[serde(default)]
    min_similarity: Option<f64>,
    #[serde(default)]
    move_unmatched: Option<String>,
    #[serde(default)]
    no_table: bool,
    #[serde(default)]
    overwrite: bool,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    subber: SubberConfig,
}

impl SubberConfig {
    /// Read user config from the file if it exists.
    ///
    /// A missing config file gives the default config.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        let Some(path) = subber::config::CONFIG_PATH.as_deref() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_string =
            fs::read_to_string(path).with_context(|| format!("Error reading config file {}", path.display()))?;
        Self::from_toml_str(&config_string).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.subber)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the similarity values are outside the range 0..=1.
    pub fn try_from_args(args: SubberArgs, user_config: SubberConfig) -> Result<Self> {
        let options = MatchOptions::new(
            args.similarity
                .or(user_config.min_similarity)
                .unwrap_or(DEFAULT_MIN_SIMILARITY),
            args.boost.or(user_config.date_boost).unwrap_or(DEFAULT_DATE_BOOST),
        );
        options.validate()?;

        let move_unmatched = args
            .move_unmatched
            .or(user_config.move_unmatched)
            .map(|folder| folder.trim().to_string());

        Ok(Self {
            absolute_paths: args.absolute || user_config.absolute_paths,
            auto: args.yes,
            convert: args.convert,
            dryrun: args.print,
            move_unmatched,
            no_table: args.no_table || user_config.no_table,
            options,
            output: args.output,
            overwrite: args.force || user_config.overwrite,
            rename: args.rename,
            verbose: args.verbose || user_config.verbose,
        })
    }
}
