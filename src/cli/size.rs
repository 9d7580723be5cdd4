//! Size command implementation

use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use crate::config::{Config, SizingMethod};
use crate::risk::{MarketRegime, PositionSizer};

#[derive(Args, Debug)]
pub struct SizeArgs {
    /// Account equity
    #[arg(long)]
    pub equity: Decimal,

    /// Entry price, to report a share count
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Sizing method: kelly, volatility or fixed (defaults to config)
    #[arg(long)]
    pub method: Option<String>,

    /// Estimated win rate (defaults to config)
    #[arg(long)]
    pub win_rate: Option<Decimal>,

    /// Estimated risk/reward ratio (defaults to config)
    #[arg(long)]
    pub risk_reward: Option<Decimal>,

    /// Current market regime
    #[arg(long, default_value = "RANGE_BOUND")]
    pub regime: String,
}

impl SizeArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let mut sizing = config.sizing.clone();
        if let Some(method) = &self.method {
            sizing.method = SizingMethod::parse_lenient(method);
        }
        if let Some(win_rate) = self.win_rate {
            sizing.default_win_rate = win_rate;
        }
        if let Some(risk_reward) = self.risk_reward {
            sizing.default_risk_reward = risk_reward;
        }

        let regime = MarketRegime::parse_lenient(&self.regime);
        let sizer = PositionSizer::new(sizing, Arc::new(regime));

        let pct = sizer.default_size_percent()?;
        let amount = sizer.position_amount(self.equity)?;

        println!("Position size");
        println!("  Method:  {}", sizer.config().method.as_str());
        println!("  Regime:  {}", regime);
        println!("  Percent: {:.2}%", pct * dec!(100));
        println!("  Amount:  {:.2}", amount);
        if let Some(price) = self.price {
            let shares = sizer.shares(self.equity, price)?;
            println!("  Shares:  {:.4}", shares);
        }
        Ok(())
    }
}
