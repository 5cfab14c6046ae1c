use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subtitle_enhancer::cli::{Cli, Commands};
use subtitle_enhancer::output::{self, SpinnerObserver};
use subtitle_enhancer::{web, Config, Language, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "subtitle_enhancer=debug,tower_http=debug"
    } else {
        "subtitle_enhancer=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr: SocketAddr = config
                .socket_addr()
                .parse()
                .with_context(|| format!("Invalid listen address: {}", config.socket_addr()))?;

            println!("Open http://{} in your browser", addr);
            web::serve(&config, addr).await?;
        }
        Commands::Process {
            url,
            language,
            format,
            output,
        } => {
            // Validate the URL before building any service clients
            subtitle_enhancer::pipeline::parse_url(&url)?;

            let language = language.unwrap_or_else(|| config.ui.default_language.clone());
            if Language::from_name(&language).is_none() {
                tracing::warn!("Unknown language '{}', translating to English", language);
            }

            let pipeline = Pipeline::from_config(&config).await?;
            let spinner = SpinnerObserver::new(cli.quiet);
            let started = std::time::Instant::now();
            let report = pipeline.run_with_observer(&url, &language, &spinner).await;
            spinner.finish();

            if !cli.quiet {
                eprintln!(
                    "Finished in {}",
                    subtitle_enhancer::utils::format_duration(started.elapsed().as_secs_f64())
                );
            }

            output::deliver(&report, output.as_deref(), &format).await?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                let path = match &cli.config {
                    Some(path) => path.clone(),
                    None => Config::config_path()?,
                };
                println!("Configuration file: {}", path.display());
                println!("Edit it to change endpoints, models and the translation provider.");
            }
        }
        Commands::Languages => {
            println!("Supported target languages:");
            for lang in Language::ALL {
                println!("  • {} ({})", lang.name(), lang.code());
            }
        }
    }

    Ok(())
}
