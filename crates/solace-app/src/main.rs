//! Solace server binary.
//!
//! Loads configuration, builds the model adapters, wires the store and
//! pipeline into the API state, and serves HTTP until Ctrl-C.

mod cli;

use clap::Parser;

use solace_api::{start_server, AppState};
use solace_core::SolaceConfig;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply.
    let config_file = args.resolve_config_path();
    let config_found = config_file.exists();
    let mut config = if config_found {
        SolaceConfig::load(&config_file)?
    } else {
        SolaceConfig::default()
    };
    config.server.host = args.resolve_host(&config.server.host);
    config.server.port = args.resolve_port(config.server.port);
    config.general.log_level = args.resolve_log_level(&config.general.log_level);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Solace v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "No configuration file, using defaults");
    }
    if config.auth.password == "password" {
        tracing::warn!("Operator account uses the default password; set [auth] password");
    }

    // Model adapters.
    let generator = solace_models::build_generator(&config.models)?;
    let classifier = solace_models::build_classifier(&config.models)?;

    match (
        config.retention.max_transcript_entries,
        config.retention.max_concern_entries,
    ) {
        (None, None) => tracing::info!("Interaction logs are unbounded"),
        (transcript, concerns) => tracing::info!(
            max_transcript = ?transcript,
            max_concerns = ?concerns,
            "Interaction log retention enabled"
        ),
    }

    let state = AppState::new(config, generator, classifier);
    tracing::info!(
        "Dashboard at http://{}:{}/dashboard",
        state.config.server.host,
        state.config.server.port
    );

    start_server(state).await?;

    Ok(())
}
