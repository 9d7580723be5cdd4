use clap::Parser;
use trade_lifecycle::cli::{Cli, Commands};
use trade_lifecycle::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    trade_lifecycle::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Size(args) => {
            tracing::debug!("Sizing position");
            args.execute(&config).await?;
        }
        Commands::Evaluate(args) => {
            tracing::debug!("Evaluating position");
            args.execute(&config).await?;
        }
        Commands::Report(args) => {
            tracing::info!("Building performance report");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
