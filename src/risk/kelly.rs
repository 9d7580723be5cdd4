//! Kelly criterion position sizing

use super::types::{saturating_div, RiskError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fractional Kelly calculator clamped to a position band
#[derive(Debug, Clone, PartialEq)]
pub struct KellyCalculator {
    /// Kelly fraction (e.g., 0.25 for quarter Kelly)
    pub fraction: Decimal,
    /// Smallest allocation as a share of equity
    pub min_pct: Decimal,
    /// Largest allocation as a share of equity
    pub max_pct: Decimal,
}

impl KellyCalculator {
    /// Create a new Kelly calculator
    pub fn new(fraction: Decimal, min_pct: Decimal, max_pct: Decimal) -> Self {
        Self {
            fraction,
            min_pct,
            max_pct,
        }
    }

    /// Full Kelly fraction for a win rate and payoff ratio
    ///
    /// f* = (p*b - q) / b with q = 1 - p. Negative when the edge is negative.
    ///
    /// Computed as p - q/b so no intermediate exceeds the Decimal range.
    pub fn full_kelly(win_rate: Decimal, risk_reward: Decimal) -> Result<Decimal, RiskError> {
        if win_rate < Decimal::ZERO || win_rate > Decimal::ONE {
            return Err(RiskError::WinRateOutOfRange(win_rate));
        }
        if risk_reward <= dec!(0) {
            return Err(RiskError::NonPositiveRiskReward(risk_reward));
        }
        let p = win_rate;
        let q = Decimal::ONE - p;
        let b = risk_reward;
        Ok(p - saturating_div(q, b))
    }

    /// Allocation fraction after the safety multiplier and band clamp
    pub fn calculate(&self, win_rate: Decimal, risk_reward: Decimal) -> Result<Decimal, RiskError> {
        let full = Self::full_kelly(win_rate, risk_reward)?;
        let fractional = full.saturating_mul(self.fraction);
        let result = fractional.min(self.max_pct).max(self.min_pct);

        tracing::debug!(
            %win_rate,
            %risk_reward,
            kelly = %full,
            %fractional,
            %result,
            "Kelly sizing"
        );

        Ok(result)
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(dec!(0.25), dec!(0.02), dec!(0.20))
    }
}
