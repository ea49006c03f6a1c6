//! SheetChat - chat client for a spreadsheet data assistant
//!
#![doc = "Main entry point for the SheetChat command-line client."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sheetchat::cli::{Cli, Commands};
use sheetchat::commands;
use sheetchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            upload,
            export_charts,
        } => {
            tracing::info!("Starting interactive chat mode");
            if !upload.is_empty() {
                tracing::debug!("Preloading {} file(s)", upload.len());
            }
            commands::chat::run_chat(config, upload, export_charts).await?;
            Ok(())
        }
        Commands::Ask { files, question } => {
            tracing::info!("Starting one-shot question");
            commands::ask::run_ask(config, files, question).await?;
            Ok(())
        }
        Commands::Session => {
            tracing::info!("Creating backend session");
            commands::session::run_session(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so stdout stays clean for answers. `RUST_LOG` wins over
/// the default filter.
fn init_tracing(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "sheetchat=debug"
    } else {
        "sheetchat=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
