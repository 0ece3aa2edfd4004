use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anidex")]
#[command(author, version, about = "Anime catalog and request-intake website")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Start {
        /// Host to bind to (overrides config and ANIDEX_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and ANIDEX_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load the configuration and report warnings and resolved paths
    Validate,

    /// Display version information
    Version,

    /// Generate a random secret for SECRET_KEY or ALTCHA_HMAC_KEY
    GenerateSecret,
}
