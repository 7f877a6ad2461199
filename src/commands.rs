use crate::cli::{Cli, Commands};
use crate::config::merge_configuration;
use crate::error::AppError;
use crate::exec::ProcessExecutor;
use crate::fmt::print_output;
use crate::integration::IntegrationResult;
use crate::labeller::{format_label, GitTagLabeller, Label, Labeller};
use clap::CommandFactory;
use clap_complete::generate;
use clap_mangen::Man;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub async fn handle_command(cli: &Cli) -> Result<(), AppError> {
    match cli.command.clone().unwrap_or(Commands::Label) {
        Commands::Label => {
            let base_dir = match &cli.base_dir {
                Some(dir) => PathBuf::from(dir),
                None => std::env::current_dir().map_err(AppError::Io)?,
            };
            let mut integration = IntegrationResult::new(base_dir);
            let label = label_repository(cli, &mut integration).await?;
            print_output(&label, cli.json)
        }
        Commands::Format(args) => {
            let label = format_describe(cli, &args.describe)?;
            print_output(&label, cli.json)
        }
        Commands::Generate(args) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();

            if let Some(shell) = args.shell {
                generate(shell, &mut cmd, bin_name, &mut io::stdout());
            }

            if let Some(ref man_dir) = args.man {
                let out_dir = Path::new(man_dir);
                if !out_dir.exists() {
                    fs::create_dir_all(out_dir).map_err(AppError::Io)?;
                }
                Man::new(cmd)
                    .render(
                        &mut fs::File::create(out_dir.join("git-tag-labeller.1"))
                            .map_err(AppError::Io)?,
                    )
                    .map_err(AppError::Io)?;
                info!("Man page generated in {}", man_dir);
            }

            if args.shell.is_none() && args.man.is_none() {
                warn!("Please specify --shell <SHELL> or --man <DIR>");
            }
            Ok(())
        }
    }
}

/// Runs the git labeller for one integration and records the label on it.
pub async fn label_repository(
    cli: &Cli,
    integration: &mut IntegrationResult,
) -> Result<Label, AppError> {
    let settings = merge_configuration(cli)?;
    debug!("Labeller settings: {:?}", settings);

    let executor = ProcessExecutor::new(settings.timeout);
    let labeller = GitTagLabeller::new(settings, executor);

    Ok(labeller.run(integration).await?)
}

/// Formats a describe string with the configured policy, without running git.
pub fn format_describe(cli: &Cli, describe: &str) -> Result<Label, AppError> {
    // Formatting never touches the repository, so any directory will do
    let mut cli_args = cli.labeller.clone();
    cli_args
        .working_directory
        .get_or_insert_with(|| ".".to_string());
    let settings = merge_configuration(&Cli {
        labeller: cli_args,
        command: None,
        ..cli.clone()
    })?;
    Ok(format_label(&settings, Some(describe))?)
}
