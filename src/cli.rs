use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;

pub const DEFAULT_CONFIG: &str = "labeller.toml";

#[derive(Parser, Debug, Clone)]
#[command(author, version = env!("PROJECT_VERSION"), about)]
pub struct Cli {
    /// Path to config file (supports .toml, .yaml, .json)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Output the label and its parts as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Base directory a relative working directory is resolved against [default: current directory]
    #[arg(long, global = true, env = "GIT_LABELLER_BASE_DIR")]
    pub base_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(flatten)]
    pub labeller: LabellerArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Labeller options; each one falls back to the config file when omitted.
#[derive(Args, Clone, Debug, Default)]
pub struct LabellerArgs {
    /// Git working directory
    #[arg(long, global = true, env = "GIT_LABELLER_WORKING_DIRECTORY")]
    pub working_directory: Option<String>,

    /// How to combine the commit count with the tag: concatenate, replace or ignore
    #[arg(long, global = true, env = "GIT_LABELLER_COMMIT_COUNT_ACTION")]
    pub commit_count_action: Option<String>,

    /// Offset added to the commit count
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub commit_count_offset: Option<i32>,

    /// Prefix removed from the tag name, e.g. "v"
    #[arg(long, global = true)]
    pub skip_prefix: Option<String>,

    /// Path to the git executable
    #[arg(long, global = true, env = "GIT_LABELLER_EXECUTABLE")]
    pub executable: Option<String>,

    /// Branch to check out (forced) before describing
    #[arg(long, global = true, env = "GIT_LABELLER_BRANCH")]
    pub branch: Option<String>,

    /// With --commit-count-action ignore: none, build or revision
    #[arg(long, global = true)]
    pub auto_increment: Option<String>,

    /// Seconds to wait for each git invocation
    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Describe the repository and print its label (default)
    Label,
    /// Format a describe string without running git
    Format(FormatArgs),
    /// Generate shell completions or man pages
    Generate(GenerateArgs),
}

#[derive(Args, Clone, Debug)]
pub struct FormatArgs {
    /// Output of `git describe`, e.g. v1.2.3-5-gabc123
    pub describe: String,
}

#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Type of shell completion to generate
    #[arg(short, long)]
    pub shell: Option<Shell>,

    /// Generate man pages to the specified directory
    #[arg(short, long)]
    pub man: Option<String>,
}
