//! Position sizing
//!
//! Turns a sizing method, a win-rate/risk-reward estimate and the current
//! market regime into a capital fraction, then into dollars and shares.
//! Kelly sizing is clamped to the configured band; volatility sizing follows
//! the regime table and goes to zero in the two riskiest regimes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use super::kelly::KellyCalculator;
use super::regime::{MarketRegime, RegimeSource};
use super::types::{ensure_positive_price, saturating_div, RiskError};
use crate::config::{SizingConfig, SizingMethod};

/// Capital fraction allotted to a new position in each regime
pub fn regime_allocation(regime: MarketRegime) -> Decimal {
    match regime {
        MarketRegime::HighVolatility => dec!(0.0),
        MarketRegime::StrongBear => dec!(0.0),
        MarketRegime::WeakBear => dec!(0.02),
        MarketRegime::RangeBound => dec!(0.05),
        MarketRegime::WeakBull => dec!(0.08),
        MarketRegime::StrongBull => dec!(0.15),
    }
}

/// Regime- and Kelly-aware position sizer
pub struct PositionSizer {
    config: SizingConfig,
    kelly: KellyCalculator,
    regime: Arc<dyn RegimeSource>,
}

impl PositionSizer {
    /// Create a sizer reading the regime from `regime`
    pub fn new(config: SizingConfig, regime: Arc<dyn RegimeSource>) -> Self {
        let kelly = KellyCalculator::new(config.kelly_fraction, config.min_pct, config.max_pct);
        Self {
            config,
            kelly,
            regime,
        }
    }

    /// Sizing configuration in effect
    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Capital fraction for the given method and trade estimate
    ///
    /// `risk_reward` must be positive when `method` is Kelly.
    pub fn size_percent(
        &self,
        method: SizingMethod,
        win_rate: Decimal,
        risk_reward: Decimal,
    ) -> Result<Decimal, RiskError> {
        let pct = match method {
            SizingMethod::Kelly => self.kelly.calculate(win_rate, risk_reward)?,
            SizingMethod::Volatility => {
                let regime = self.regime.current_regime();
                let pct = regime_allocation(regime);
                tracing::debug!(%regime, %pct, "Volatility sizing");
                pct
            }
            SizingMethod::Fixed => self.config.fixed_pct,
        };
        Ok(pct)
    }

    /// Capital fraction using the configured method and default estimate
    pub fn default_size_percent(&self) -> Result<Decimal, RiskError> {
        self.size_percent(
            self.config.method,
            self.config.default_win_rate,
            self.config.default_risk_reward,
        )
    }

    /// Dollar amount to commit out of `equity`
    pub fn position_amount(&self, equity: Decimal) -> Result<Decimal, RiskError> {
        if equity <= Decimal::ZERO {
            tracing::warn!(%equity, "No equity available, sizing to zero");
            return Ok(Decimal::ZERO);
        }
        let pct = self.default_size_percent()?;
        Ok(equity.saturating_mul(pct))
    }

    /// Share count for a position at `price`, fractional shares allowed
    pub fn shares(&self, equity: Decimal, price: Decimal) -> Result<Decimal, RiskError> {
        ensure_positive_price(price)?;
        let amount = self.position_amount(equity)?;
        let shares = saturating_div(amount, price);
        tracing::debug!(
            method = self.config.method.as_str(),
            %equity,
            %price,
            %amount,
            %shares,
            "Position sized"
        );
        Ok(shares)
    }
}
