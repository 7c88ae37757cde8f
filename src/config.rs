use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::IsaTabError;

pub const DEFAULT_CONFIG_FILE: &str = "kira-isa.json";
pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    /// Investigation JSON to encode.
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub overwrite: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub input: Option<Utf8PathBuf>,
    pub output_dir: Utf8PathBuf,
    pub overwrite: bool,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `kira-isa.json` from the current directory.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, IsaTabError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Err(IsaTabError::MissingConfig);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| IsaTabError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| IsaTabError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    /// Same as [`Self::resolve`], but a missing default file means defaults.
    pub fn resolve_or_default(path: Option<&str>) -> Result<ResolvedConfig, IsaTabError> {
        match Self::resolve(path) {
            Err(IsaTabError::MissingConfig) => Self::resolve_config(Config::default()),
            other => other,
        }
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, IsaTabError> {
        let schema_version = config.schema_version.unwrap_or(SUPPORTED_SCHEMA_VERSION);
        if schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(IsaTabError::ConfigParse(format!(
                "unsupported schema_version {schema_version}"
            )));
        }

        Ok(ResolvedConfig {
            schema_version,
            input: config.input.map(Utf8PathBuf::from),
            output_dir: config
                .output_dir
                .map(Utf8PathBuf::from)
                .unwrap_or_else(default_output_dir),
            overwrite: config.overwrite.unwrap_or(false),
        })
    }
}

pub fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(".")
}
