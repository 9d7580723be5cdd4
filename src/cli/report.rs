//! Report command implementation

use anyhow::Context;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::analytics::{PerformanceMetrics, TradeRecord};
use crate::config::Config;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// JSON file containing an array of closed trades
    #[arg(long)]
    pub trades: PathBuf,

    /// Initial capital (defaults to config)
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl ReportArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let content = tokio::fs::read_to_string(&self.trades)
            .await
            .with_context(|| format!("Failed to read trades from {}", self.trades.display()))?;
        let trades: Vec<TradeRecord> =
            serde_json::from_str(&content).context("Failed to parse trades")?;

        let metrics = build_metrics(config, self.capital, trades)?;
        let summary = metrics.summary();

        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }
}

/// Replay trades in timestamp order into fresh metrics
pub fn build_metrics(
    config: &Config,
    capital: Option<Decimal>,
    mut trades: Vec<TradeRecord>,
) -> anyhow::Result<PerformanceMetrics> {
    let mut metrics_config = config.metrics.clone();
    if let Some(capital) = capital {
        metrics_config.initial_capital = capital;
    }
    let mut metrics = PerformanceMetrics::from_config(&metrics_config)?;

    trades.sort_by_key(|t| t.timestamp);
    tracing::info!(count = trades.len(), "Replaying trades");
    for trade in trades {
        metrics.record_trade(trade);
    }
    Ok(metrics)
}
