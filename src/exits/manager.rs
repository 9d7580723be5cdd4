//! Priority-ordered exit evaluation
//!
//! Rules are checked in a fixed order and the first match wins:
//!
//! 1. Stop loss (full exit)
//! 2. Take profit (full exit)
//! 3. Partial profit at the next unfired milestone
//! 4. Trailing stop once the position has run past entry
//!
//! Each rule is its own short-circuiting step so the order reads directly
//! off `evaluate_rules`. The only state carried between calls is the
//! position's partial level and high-water mark.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::types::{ExitDecision, ExitOrder};
use crate::config::ExitConfig;
use crate::risk::{ensure_positive_price, RiskError, TradePosition};
use crate::telemetry;

/// Evaluates open positions against the exit rules
#[derive(Debug, Clone)]
pub struct ExitStrategyManager {
    config: ExitConfig,
}

impl ExitStrategyManager {
    pub fn new(config: ExitConfig) -> Self {
        tracing::info!(
            levels = ?config.partial_levels,
            sizes = ?config.partial_sizes,
            trailing_enabled = config.trailing_enabled,
            trailing_stop_pct = %config.trailing_stop_pct,
            "Exit strategy manager initialized"
        );
        Self { config }
    }

    pub fn config(&self) -> &ExitConfig {
        &self.config
    }

    /// Evaluate every rule for `position` at `current_price`
    ///
    /// `volatility` and `portfolio` (symbol to position value) describe the
    /// surrounding market. They are recorded with the evaluation but no rule
    /// reads them, so they never change the decision.
    pub fn evaluate(
        &self,
        position: &TradePosition,
        current_price: Decimal,
        volatility: Decimal,
        portfolio: &HashMap<String, Decimal>,
    ) -> Result<ExitDecision, RiskError> {
        ensure_positive_price(current_price)?;

        let decision = self.evaluate_rules(position, current_price);

        tracing::debug!(
            symbol = position.symbol(),
            price = %current_price,
            %volatility,
            open_positions = portfolio.len(),
            partial_level = position.partial_level(),
            decision = %decision.exit_type(),
            "Exit evaluated"
        );
        if decision.is_exit() {
            tracing::info!(
                symbol = position.symbol(),
                exit = %decision.exit_type(),
                quantity = %decision.quantity(),
                reason = decision.reason(),
                "Exit signal"
            );
            telemetry::record_exit(decision.exit_type());
        }

        Ok(decision)
    }

    fn evaluate_rules(&self, position: &TradePosition, current_price: Decimal) -> ExitDecision {
        if position.is_stop_loss_hit(current_price) {
            return ExitDecision::StopLoss(ExitOrder::full(
                current_price,
                format!(
                    "Stop loss hit at {} (stop {})",
                    current_price,
                    position.stop_loss()
                ),
            ));
        }

        if position.is_take_profit_hit(current_price) {
            return ExitDecision::TakeProfit(ExitOrder::full(
                current_price,
                format!(
                    "Take profit target hit at {} (target {})",
                    current_price,
                    position.take_profit()
                ),
            ));
        }

        if let Some(decision) = self.evaluate_partial_exit(position, current_price) {
            return decision;
        }

        if let Some(decision) = self.evaluate_trailing_stop(position, current_price) {
            return decision;
        }

        ExitDecision::NoExit
    }

    /// Next unfired milestone, if price has reached it
    ///
    /// Milestones below the position's level count as fired, so only one
    /// level can fire per call even after a gap up.
    fn evaluate_partial_exit(
        &self,
        position: &TradePosition,
        current_price: Decimal,
    ) -> Option<ExitDecision> {
        let level = position.partial_level().checked_add(1)?;
        let index = usize::try_from(position.partial_level()).ok()?;
        let milestone = *self.config.partial_levels.get(index)?;
        let size = *self.config.partial_sizes.get(index)?;

        let target_distance = position.take_profit() - position.entry_price();
        if target_distance <= Decimal::ZERO {
            return None;
        }

        let threshold = position.entry_price() + target_distance * milestone;
        if current_price < threshold {
            return None;
        }

        let profit_pct = position
            .profit_percent(current_price)
            .saturating_mul(Decimal::ONE_HUNDRED);
        let reason = format!(
            "Partial exit {} at {}% of profit target ({:.2}% profit)",
            level,
            (milestone * Decimal::ONE_HUNDRED).normalize(),
            profit_pct
        );

        Some(ExitDecision::PartialProfit {
            level,
            order: ExitOrder::fraction(size, current_price, reason),
        })
    }

    /// Trailing stop off the high-water mark, armed once price is past entry
    fn evaluate_trailing_stop(
        &self,
        position: &TradePosition,
        current_price: Decimal,
    ) -> Option<ExitDecision> {
        if !self.config.trailing_enabled {
            return None;
        }

        let high_water_mark = position.high_water_mark().max(current_price);
        if high_water_mark <= position.entry_price() {
            return None;
        }

        let retrace = (high_water_mark - current_price) / high_water_mark;
        if retrace <= self.config.trailing_stop_pct {
            return None;
        }

        let reason = format!(
            "Trailing stop: {:.2}% retrace from high {}",
            retrace * Decimal::ONE_HUNDRED,
            high_water_mark
        );

        Some(ExitDecision::TrailingStop {
            high_water_mark,
            order: ExitOrder::fraction(self.config.trailing_exit_fraction, current_price, reason),
        })
    }
}

impl Default for ExitStrategyManager {
    fn default() -> Self {
        Self::new(ExitConfig::default())
    }
}
