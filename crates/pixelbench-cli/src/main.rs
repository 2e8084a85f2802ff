//! pixelbench - compare interpreted and compiled image routines from the command line

mod cli;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use pixelbench::Config;
use std::process;

use cli::{Cli, Commands};
use commands::run::RunArgs;
use output::OutputFormatter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let formatter = OutputFormatter::new(cli.format, !cli.quiet && atty::is(atty::Stream::Stdout));

    match cli.command {
        Commands::Run {
            scenario,
            width,
            height,
            pattern,
            color,
            trials,
            colors,
        } => {
            let args = RunArgs {
                scenario,
                width,
                height,
                pattern,
                color,
                trials,
                colors,
            };
            commands::run::run(config, &formatter, args).await
        }
        Commands::History { scenario } => commands::history::run(config, &formatter, scenario).await,
        Commands::Clear { scenario } => {
            commands::clear::run(config, &formatter, cli.format, cli.quiet, scenario).await
        }
        Commands::Sizes { scenario } => commands::sizes::run(config, &formatter, scenario).await,
        Commands::Config => commands::config::run(&config, &formatter),
    }
}

/// `--config` wins over `--home`; without either the default home is used
fn load_config(cli: &Cli) -> Result<Config> {
    let config = match (&cli.config, &cli.home) {
        (Some(path), _) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        (None, Some(home)) => Config::from_home_dir(home.clone()),
        (None, None) => Config::default(),
    };
    tracing::debug!("Using home directory {}", config.home_dir.display());
    Ok(config)
}
