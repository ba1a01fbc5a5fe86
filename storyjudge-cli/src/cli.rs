use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "storyjudge",
    version,
    about = "Judge generated stories with LLMs and aggregate the scores"
)]
pub struct Cli {
    /// Configuration file (defaults to config/storyjudge.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Evaluate a single story against every criterion
    Evaluate {
        /// The story id to evaluate
        #[arg(long)]
        story_id: String,
        /// The trial id to save results under
        #[arg(long)]
        trial_id: String,
        /// The judge model to use (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },
    /// Evaluate every story listed in a newline-delimited file
    Batch {
        /// Text file with one story id per line
        #[arg(long)]
        story_ids_file: PathBuf,
        /// The trial id to save results under
        #[arg(long)]
        trial_id: String,
        /// The judge model to use (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },
    /// Report mean and standard deviation per criterion for a story
    Analyze {
        /// The story id to analyze
        #[arg(long)]
        story_id: String,
        /// The trial id to analyze
        #[arg(long)]
        trial_id: String,
    },
}
