//! Position health scoring
//!
//! Advisory 0-100 score built from a neutral 50 plus three independent
//! adjustments: unrealized P&L, time held, and momentum. It does not feed
//! the exit chain; the caller decides how to combine the two.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::HealthConfig;
use crate::risk::{ensure_positive_price, RiskError, TradePosition};
use crate::telemetry::{self, GaugeMetric};

const NEUTRAL: i32 = 50;

/// Health score in `[0, 100]`, higher is healthier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealthScore(u8);

impl HealthScore {
    pub const MIN: HealthScore = HealthScore(0);
    pub const MAX: HealthScore = HealthScore(100);

    /// Clamp a raw point total into range
    pub fn from_points(points: i32) -> Self {
        // Clamped to 0..=100, always fits in u8
        Self(points.clamp(0, 100) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for HealthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scores open positions
#[derive(Debug, Clone, Default)]
pub struct PositionHealthScorer {
    config: HealthConfig,
}

impl PositionHealthScorer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Score using the wall clock for time held
    pub fn score(
        &self,
        position: &TradePosition,
        current_price: Decimal,
        momentum: Decimal,
    ) -> Result<HealthScore, RiskError> {
        self.score_at(position, current_price, momentum, Utc::now())
    }

    /// Score as of `now`
    ///
    /// `momentum` is in percentage points (2.0 = 2%).
    pub fn score_at(
        &self,
        position: &TradePosition,
        current_price: Decimal,
        momentum: Decimal,
        now: DateTime<Utc>,
    ) -> Result<HealthScore, RiskError> {
        ensure_positive_price(current_price)?;

        // Saturates on extreme moves, which still lands in the outer tier
        let pnl_pct = position
            .profit_percent(current_price)
            .saturating_mul(Decimal::ONE_HUNDRED);
        let hours_held = position.hours_held(now);

        let points =
            NEUTRAL + pnl_points(pnl_pct) + holding_points(hours_held) + momentum_points(momentum);
        let score = HealthScore::from_points(points);

        tracing::debug!(
            symbol = position.symbol(),
            score = score.value(),
            pnl_pct = %pnl_pct.round_dp(2),
            hours_held,
            %momentum,
            "Position health"
        );
        telemetry::set_symbol_gauge(
            GaugeMetric::PositionHealth,
            position.symbol(),
            Decimal::from(score.value()),
        );

        Ok(score)
    }

    /// Whether a score is low enough to close the position
    pub fn should_close_unhealthy(&self, score: HealthScore) -> bool {
        score.value() < self.config.unhealthy_threshold
    }
}

fn pnl_points(pnl_pct: Decimal) -> i32 {
    if pnl_pct > dec!(2) {
        30
    } else if pnl_pct > dec!(1) {
        20
    } else if pnl_pct > dec!(0) {
        10
    } else if pnl_pct < dec!(-2) {
        -30
    } else if pnl_pct < dec!(-1) {
        -20
    } else if pnl_pct < dec!(0) {
        -10
    } else {
        0
    }
}

/// Stale positions lose points; fresh ones gain a little
fn holding_points(hours_held: i64) -> i32 {
    if hours_held > 48 {
        -15
    } else if hours_held > 24 {
        -10
    } else if hours_held < 2 {
        5
    } else {
        0
    }
}

fn momentum_points(momentum: Decimal) -> i32 {
    if momentum > dec!(2) {
        20
    } else if momentum > dec!(1) {
        10
    } else if momentum < dec!(-2) {
        -20
    } else if momentum < dec!(-1) {
        -10
    } else {
        0
    }
}
