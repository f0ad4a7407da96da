//! Wikismith CLI - run research pipelines from the command line

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_command_async(cli))
}

async fn run_command_async(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            topic,
            config,
            output,
        } => commands::run::run(&topic, &config, output.as_deref()).await,

        Commands::GenerateConfig { output } => commands::generate::run(&output),
    }
}
