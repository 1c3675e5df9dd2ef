use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gymcard",
    version,
    about = "Play guided gym training sessions and log your sets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a training session (default)
    Session {
        /// Comma-separated exercise ids, overriding the saved selection
        #[arg(long)]
        ids: Option<String>,
    },
    /// Save the exercise selection for future sessions
    Select {
        /// Comma-separated exercise ids in session order
        ids: String,
    },
    /// List the exercises available in the catalog
    List,
}
