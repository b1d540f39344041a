use clap::{CommandFactory, Parser};
use repo_settings_cli::cli::{execute, Cli};
use repo_settings_cli::report::format_summary;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty())
        .with(EnvFilter::from_env("REPO_SETTINGS_LOG"))
        .init();

    let cli = Cli::parse();

    // Print help if no config file is passed
    let Some(config_path) = cli.config.clone() else {
        let _ = Cli::command().print_help();
        std::process::exit(0);
    };

    match execute(&cli, &config_path).await {
        Ok(summary) => {
            print!("{}", format_summary(&summary));
            std::process::exit(0);
        }
        Err(e) => {
            error!("Error: {e}");
            println!("{e}");
            std::process::exit(1);
        }
    }
}
