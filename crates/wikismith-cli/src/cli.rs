//! Command-line interface definition

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wikismith",
    about = "Research a topic through expert interviews and write a grounded article",
    version
)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the research pipeline for a topic
    Run {
        /// Topic to research
        #[arg(short, long)]
        topic: String,

        /// Path to the app configuration file (YAML, TOML or JSON)
        #[arg(short, long, default_value = "wikismith.yaml")]
        config: String,

        /// Where to write the article (defaults to a dated markdown file)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a sample configuration file
    GenerateConfig {
        /// Output path
        #[arg(short, long, default_value = "wikismith.yaml")]
        output: String,
    },
}
