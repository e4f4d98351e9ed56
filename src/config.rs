use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::store::sqlite;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    /// Default reconciliation window, e.g. "7d"
    pub window: Option<String>,
    pub verbose: Option<bool>,
}

impl FileConfig {
    /// Path of the config file (~/.config/stocktake/config.toml or platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stocktake")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Read the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        Self::parse(&raw, path)
    }

    pub fn parse(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database: PathBuf,
    pub window: Option<Duration>,
    pub verbose: bool,
}

impl Config {
    /// Defaults, overlaid by the config file, overlaid by command line flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, crate::error::Error> {
        let file = match FileConfig::default_path() {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, cli.database.clone(), cli.verbose)
    }

    pub fn resolve(
        file: FileConfig,
        database: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self, crate::error::Error> {
        let database = match database.or(file.database) {
            Some(path) => path,
            None => sqlite::default_db_path()?,
        };

        let window = file.window.as_deref().map(parse_window).transpose()?;

        Ok(Config {
            database,
            window,
            verbose: verbose || file.verbose.unwrap_or(false),
        })
    }
}

/// Parse a humantime duration such as "7d" or "36h".
pub fn parse_window(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|source| ConfigError::Duration {
        value: value.to_string(),
        source,
    })
}
