use clap::Parser;
use git_tag_labeller::cli::Cli;
use git_tag_labeller::commands::handle_command;
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &Cli) {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for the label
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = handle_command(&cli).await {
        eprintln!("{}", e.report());
        std::process::exit(e.exit_code());
    }
}
