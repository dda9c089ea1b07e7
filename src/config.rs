use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::clock::parse_timestamp;
use crate::error::{Error, Result};
use crate::work_set::{DEFAULT_MAX_GROUPS, DEFAULT_MAX_ISSUES_PER_GROUP, WorkPolicy};

pub const DEFAULT_CONFIG_PATH: &str = ".triageplan/config.toml";
pub const DEFAULT_ISSUES_PATH: &str = "issues.json";
pub const DEFAULT_OUT_DIR: &str = "out";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub issues: Option<String>,
    pub out_dir: Option<String>,
    pub cycle_id: Option<String>,
    pub max_groups: Option<usize>,
    pub max_issues_per_group: Option<usize>,
    pub allow_file_overlap: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub issues: PathBuf,
    pub out_dir: PathBuf,
    pub cycle_id: Option<String>,
    pub generated_at: Option<String>,
    pub policy: WorkPolicy,
}

impl Config {
    /// Load the config file (explicit `--config` must exist; the default path
    /// is optional), merge CLI overrides on top, then validate.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config {
            Some(ref explicit) => {
                let path = Path::new(explicit);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };

        let config = merge(file_config, cli);
        validate(&config)?;
        Ok(config)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if let Some(ref cycle_id) = config.cycle_id
        && cycle_id.trim().is_empty()
    {
        return Err(Error::ConfigValidation(
            "cycle_id must not be empty".to_string(),
        ));
    }
    if let Some(ref generated_at) = config.generated_at {
        parse_timestamp(generated_at)?;
    }
    Ok(())
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    let allow_file_overlap = cli.allow_file_overlap || file.allow_file_overlap.unwrap_or(false);
    Config {
        issues: PathBuf::from(
            cli.issues
                .clone()
                .or(file.issues)
                .unwrap_or_else(|| DEFAULT_ISSUES_PATH.to_string()),
        ),
        out_dir: PathBuf::from(
            cli.out_dir
                .clone()
                .or(file.out_dir)
                .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string()),
        ),
        cycle_id: cli.cycle_id.clone().or(file.cycle_id),
        generated_at: cli.generated_at.clone(),
        policy: WorkPolicy {
            max_groups: cli
                .max_groups
                .or(file.max_groups)
                .unwrap_or(DEFAULT_MAX_GROUPS),
            max_issues_per_group: cli
                .max_issues_per_group
                .or(file.max_issues_per_group)
                .unwrap_or(DEFAULT_MAX_ISSUES_PER_GROUP),
            avoid_file_overlap_between_groups: !allow_file_overlap,
        },
    }
}
