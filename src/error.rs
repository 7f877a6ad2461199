use std::io;
use thiserror::Error as ThisError;

/// Failure reported by the command execution layer.
#[derive(ThisError, Debug)]
pub enum CommandError {
    #[error("Failed to start '{executable}': {source}")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("'{executable} {args}' exited with {code}: {stderr}")]
    Failed {
        executable: String,
        args: String,
        code: String,
        stderr: String,
    },

    #[error("'{executable} {args}' timed out after {seconds}s")]
    TimedOut {
        executable: String,
        args: String,
        seconds: u64,
    },

    #[error("'{executable}' produced output that is not valid UTF-8")]
    Utf8 { executable: String },
}

#[derive(ThisError, Debug)]
pub enum LabelError {
    #[error("No tag found")]
    NoTagFound,

    #[error("Invalid return from git describe: '{output}'")]
    InvalidDescribeOutput { output: String },

    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Label(#[from] LabelError),

    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML Error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML Error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AppError {
    /// Process exit code for this error. Anything that stops a label from
    /// being produced exits with 1; bad configuration exits with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ConfigError(_)
            | AppError::Toml(_)
            | AppError::Yaml(_)
            | AppError::Serialization(_) => 2,
            AppError::Label(_) | AppError::Io(_) => 1,
        }
    }

    /// The line printed on stderr before exiting. Logging may be filtered
    /// out entirely, so this is never routed through `tracing`.
    pub fn report(&self) -> String {
        format!("Error: {}", self)
    }
}
