use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Translate an SRT file
    Translate {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language code
        #[arg(short, long, default_value = "en")]
        source: String,

        /// Target language code
        #[arg(short, long)]
        target: String,
    },

    /// Run the HTTP translation service
    Serve {
        /// Address to bind, overrides the configuration
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Check that the configured translation backends are reachable
    Check,

    /// Write the default configuration to a file
    Init {
        /// Output configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}
