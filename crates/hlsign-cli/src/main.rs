//! hlsign - sign exchange actions and print the payload.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Sign an exchange action with a local key
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via HLSIGN_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Print Prometheus counters to stderr after signing
    #[arg(long)]
    print_metrics: bool,

    #[command(subcommand)]
    command: hlsign_cli::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    hlsign_telemetry::init_logging()?;

    info!("Starting hlsign v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > HLSIGN_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("HLSIGN_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = hlsign_cli::AppConfig::from_file(&config_path)?;

    let app = hlsign_cli::Application::new(config)?;
    let result = app.run(&args.command).await;

    if args.print_metrics {
        eprintln!("{}", hlsign_telemetry::Metrics::render()?);
    }

    let payload = result?;
    println!("{}", payload.to_json()?);

    Ok(())
}
