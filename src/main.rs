mod cli;

use anidex_core::Config;
use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use rand::RngCore;

/// Bytes of entropy in a generated secret.
const SECRET_BYTES: usize = 32;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = Config::load(config_path);

    // CLI flags win over file and environment.
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting anidex");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    tracing::info!("Data directory: {}", config.server.data_dir.display());
    tracing::info!("Static directory: {}", config.server.static_dir.display());

    anidex_server::start(config)
        .await
        .context("server terminated with an error")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "anidex=trace,anidex_core=trace,anidex_server=trace,tower_http=debug".to_string()
        } else {
            "anidex=debug,anidex_core=debug,anidex_server=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate => validate_config(cli.config.as_deref()),
        Commands::Version => {
            println!("anidex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::GenerateSecret => {
            println!("{}", generate_secret());
            Ok(())
        }
    }
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    if let Some(p) = path {
        println!("Validating config: {}", p.display());
        let contents = std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?;
        Config::from_json(&contents)?;
    } else {
        println!("No config file specified, using defaults and environment");
    }

    let config = Config::load(path);
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Catalog: {}", config.catalog_path().display());
    println!("  Requests: {}", config.requests_path().display());
    println!("  Feedbacks: {}", config.feedbacks_path().display());
    println!("  Covers: {}", config.covers_dir().display());
    println!(
        "  Limits: {} per hour, {} per day",
        config.limits.per_hour, config.limits.per_day
    );

    let warnings = config.validate();
    for warning in &warnings {
        println!("  warning: {warning}");
    }

    match config.require_secrets() {
        Ok(()) => println!("Configuration is valid"),
        Err(e) => anyhow::bail!("configuration is not startable: {e}"),
    }
    Ok(())
}

fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
