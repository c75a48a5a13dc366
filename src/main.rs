use clap::Parser;
use transliteration_gateway::utils::logger;
use transliteration_gateway::{serve, AppState, CliArgs, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();

    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!(
        "Starting transliteration-gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = match ServiceConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Service config: {:?}", config);

    let state = AppState::from_config(&config)?;
    serve(&config, state).await?;

    tracing::info!("✅ Server stopped");
    Ok(())
}
