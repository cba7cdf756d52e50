mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use vs_core::config::Config;
use vs_player::PosterTable;

fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::load_or_default(path);
    config.apply_port_override(std::env::var("PORT").ok().as_deref());
    config
}

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config_path);
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(
        "Starting vidstream on {}:{}",
        config.server.host,
        config.server.port
    );
    vs_server::start(config).await.context("Server failed")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let (app, lib) = if cli.verbose {
            ("trace", "debug")
        } else {
            ("info", "info")
        };
        format!("vidstream={app},vs_player={app},vs_server={lib},vs_db={lib},tower_http={lib}")
    });

    tracing_subscriber::fmt().with_env_filter(&env_filter).init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Poster { url } => {
            let config = load_config(cli.config.as_deref());
            println!("{}", PosterTable::from_config(&config.player).resolve(&url));
            Ok(())
        }
        Commands::HashPassword { password } => {
            let config = load_config(cli.config.as_deref());
            hash_password(&password, config.auth.bcrypt_cost)
        }
        Commands::Version => {
            println!("vidstream {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Config::from_json(&contents)?
        }
        None => Config::default(),
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    println!("  server: {}:{}", config.server.host, config.server.port);
    println!("  database: {}", config.server.db_path.display());
    println!("  posters: {}", config.player.posters.len());
    Ok(())
}

fn hash_password(password: &str, cost: u32) -> Result<()> {
    let hash = bcrypt::hash(password, cost).context("Failed to hash password")?;
    println!("{hash}");
    Ok(())
}
