use crate::cli::{Cli, DEFAULT_CONFIG};
use crate::error::AppError;
use crate::exec::DEFAULT_TIMEOUT;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    working_directory: Option<String>,
    commit_count_action: Option<String>,
    commit_count_offset: Option<i32>,
    skip_prefix: Option<String>,
    #[serde(alias = "executablePath")]
    executable: Option<String>,
    branch: Option<String>,
    auto_increment: Option<String>,
    timeout_seconds: Option<u64>,
}

/// Labeller options after merging CLI flags, environment and config file.
///
/// `commit_count_action` and `auto_increment` are kept verbatim; they are
/// only interpreted when a label is generated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub working_directory: PathBuf,
    pub commit_count_action: String,
    pub commit_count_offset: i32,
    pub skip_prefix: String,
    pub executable: String,
    pub branch: String,
    pub auto_increment: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(working_directory: impl Into<PathBuf>, commit_count_action: &str) -> Self {
        Self {
            working_directory: working_directory.into(),
            commit_count_action: commit_count_action.to_string(),
            commit_count_offset: 0,
            skip_prefix: String::new(),
            executable: "git".to_string(),
            branch: String::new(),
            auto_increment: "none".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn load_config_file(cli: &Cli) -> Result<Option<ConfigFile>, AppError> {
    let config_path = Path::new(&cli.config);

    if !config_path.exists() {
        // Only an explicitly chosen config file has to exist
        if cli.config != DEFAULT_CONFIG {
            return Err(AppError::ConfigError(format!(
                "Config file not found: {}",
                cli.config
            )));
        }
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).map_err(AppError::Io)?;
    let ext = config_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "toml" => Ok(Some(toml::from_str(&content).map_err(AppError::Toml)?)),
        "json" => Ok(Some(
            serde_json::from_str(&content).map_err(AppError::Serialization)?,
        )),
        "yaml" | "yml" => Ok(Some(serde_yaml::from_str(&content).map_err(AppError::Yaml)?)),
        _ => Err(AppError::ConfigError(format!(
            "Unsupported config format: .{}",
            ext
        ))),
    }
}

pub fn merge_configuration(cli: &Cli) -> Result<Settings, AppError> {
    let file_config = load_config_file(cli)?.unwrap_or_default();
    let opts = &cli.labeller;

    let working_directory = opts
        .working_directory
        .clone()
        .or(file_config.working_directory)
        .ok_or_else(|| {
            AppError::ConfigError(
                "workingDirectory is missing! Use --working-directory or the config file"
                    .to_string(),
            )
        })?;

    let commit_count_action = opts
        .commit_count_action
        .clone()
        .or(file_config.commit_count_action)
        .ok_or_else(|| {
            AppError::ConfigError(
                "commitCountAction is missing! Use --commit-count-action or the config file"
                    .to_string(),
            )
        })?;

    let timeout = opts
        .timeout_seconds
        .or(file_config.timeout_seconds)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    Ok(Settings {
        working_directory: PathBuf::from(working_directory),
        commit_count_action,
        commit_count_offset: opts
            .commit_count_offset
            .or(file_config.commit_count_offset)
            .unwrap_or(0),
        skip_prefix: opts
            .skip_prefix
            .clone()
            .or(file_config.skip_prefix)
            .unwrap_or_default(),
        executable: opts
            .executable
            .clone()
            .or(file_config.executable)
            .unwrap_or_else(|| "git".to_string()),
        branch: opts
            .branch
            .clone()
            .or(file_config.branch)
            .unwrap_or_default(),
        auto_increment: opts
            .auto_increment
            .clone()
            .or(file_config.auto_increment)
            .unwrap_or_else(|| "none".to_string()),
        timeout,
    })
}
