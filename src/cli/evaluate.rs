//! Evaluate command implementation

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::config::Config;
use crate::exits::ExitStrategyManager;
use crate::health::PositionHealthScorer;
use crate::risk::TradePosition;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Position symbol
    #[arg(long, default_value = "POSITION")]
    pub symbol: String,

    /// Entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Stop-loss price
    #[arg(long)]
    pub stop: Decimal,

    /// Take-profit price
    #[arg(long)]
    pub target: Decimal,

    /// Current price
    #[arg(long)]
    pub price: Decimal,

    /// Position quantity
    #[arg(long, default_value = "1")]
    pub quantity: Decimal,

    /// Highest partial-exit milestone already fired
    #[arg(long, default_value = "0")]
    pub partial_level: u32,

    /// Highest price seen since entry
    #[arg(long)]
    pub high_water_mark: Option<Decimal>,

    /// Hours since entry
    #[arg(long, default_value = "0")]
    pub hours_held: i64,

    /// Momentum in percent
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub momentum: Decimal,

    /// Current volatility
    #[arg(long, default_value = "0")]
    pub volatility: Decimal,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl EvaluateArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let now = Utc::now();
        let mut position = TradePosition::new(
            self.symbol.as_str(),
            self.entry,
            self.quantity,
            self.stop,
            self.target,
            entry_time(now, self.hours_held)?,
        )?
        .mark_partial_exit(self.partial_level);
        if let Some(high_water_mark) = self.high_water_mark {
            position = position.observe_price(high_water_mark);
        }

        let manager = ExitStrategyManager::new(config.exits.clone());
        let decision = manager.evaluate(&position, self.price, self.volatility, &HashMap::new())?;

        let scorer = PositionHealthScorer::new(config.health.clone());
        let health = scorer.score_at(&position, self.price, self.momentum, now)?;
        let unhealthy = scorer.should_close_unhealthy(health);

        if self.json {
            let output = serde_json::json!({
                "decision": decision,
                "health": health,
                "unhealthy": unhealthy,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Exit decision: {}", decision.exit_type());
        println!("  Quantity: {}", decision.quantity());
        if let Some(price) = decision.expected_price() {
            println!("  Price:    {}", price);
        }
        println!("  Reason:   {}", decision.reason());
        println!(
            "Health score: {}{}",
            health,
            if unhealthy { " (unhealthy)" } else { "" }
        );
        Ok(())
    }
}

/// Entry timestamp `hours_held` hours before `now`
fn entry_time(now: DateTime<Utc>, hours_held: i64) -> anyhow::Result<DateTime<Utc>> {
    Duration::try_hours(hours_held)
        .and_then(|held| now.checked_sub_signed(held))
        .with_context(|| format!("--hours-held {hours_held} is out of range"))
}
