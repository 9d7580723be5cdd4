//! Performance summary, ratings and the overall assessment

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative rating attached to a single metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    HighRisk,
    NeedsImprovement,
    Acceptable,
    Good,
    Excellent,
}

impl Rating {
    /// Higher-is-better rating; within 70% of `good` is still acceptable
    pub fn from_thresholds(value: Decimal, good: Decimal, excellent: Decimal) -> Self {
        if value >= excellent {
            Rating::Excellent
        } else if value >= good {
            Rating::Good
        } else if value >= good * dec!(0.7) {
            Rating::Acceptable
        } else {
            Rating::NeedsImprovement
        }
    }

    pub fn for_sharpe(sharpe: Decimal) -> Self {
        Self::from_thresholds(sharpe, dec!(1.0), dec!(2.0))
    }

    pub fn for_win_rate(win_rate: Decimal) -> Self {
        Self::from_thresholds(win_rate, dec!(0.5), dec!(0.6))
    }

    pub fn for_profit_factor(profit_factor: Decimal) -> Self {
        Self::from_thresholds(profit_factor, dec!(1.5), dec!(2.0))
    }

    /// Lower-is-better rating for maximum drawdown
    pub fn for_drawdown(drawdown: Decimal) -> Self {
        if drawdown < dec!(0.10) {
            Rating::Excellent
        } else if drawdown < dec!(0.20) {
            Rating::Good
        } else if drawdown < dec!(0.30) {
            Rating::Acceptable
        } else {
            Rating::HighRisk
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Excellent => "EXCELLENT",
            Rating::Good => "GOOD",
            Rating::Acceptable => "ACCEPTABLE",
            Rating::NeedsImprovement => "NEEDS IMPROVEMENT",
            Rating::HighRisk => "HIGH RISK",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall verdict from a 0-10 point rubric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Weak,
    Moderate,
    Good,
    Strong,
    Exceptional,
}

impl Assessment {
    /// Score Sharpe, drawdown, profit factor and win rate
    ///
    /// Sharpe and drawdown are worth up to 3 points each, profit factor and
    /// win rate up to 2.
    pub fn points(
        sharpe: Decimal,
        max_drawdown: Decimal,
        profit_factor: Decimal,
        win_rate: Decimal,
    ) -> u8 {
        let sharpe_points = if sharpe >= dec!(2.0) {
            3
        } else if sharpe >= dec!(1.0) {
            2
        } else if sharpe >= dec!(0.5) {
            1
        } else {
            0
        };

        let drawdown_points = if max_drawdown < dec!(0.10) {
            3
        } else if max_drawdown < dec!(0.20) {
            2
        } else if max_drawdown < dec!(0.30) {
            1
        } else {
            0
        };

        let profit_factor_points = if profit_factor >= dec!(2.0) {
            2
        } else if profit_factor >= dec!(1.5) {
            1
        } else {
            0
        };

        let win_rate_points = if win_rate >= dec!(0.6) {
            2
        } else if win_rate >= dec!(0.5) {
            1
        } else {
            0
        };

        sharpe_points + drawdown_points + profit_factor_points + win_rate_points
    }

    pub fn from_points(points: u8) -> Self {
        match points {
            9.. => Assessment::Exceptional,
            7..=8 => Assessment::Strong,
            5..=6 => Assessment::Good,
            3..=4 => Assessment::Moderate,
            _ => Assessment::Weak,
        }
    }

    pub fn from_metrics(
        sharpe: Decimal,
        max_drawdown: Decimal,
        profit_factor: Decimal,
        win_rate: Decimal,
    ) -> Self {
        Self::from_points(Self::points(sharpe, max_drawdown, profit_factor, win_rate))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Assessment::Exceptional => "EXCEPTIONAL",
            Assessment::Strong => "STRONG",
            Assessment::Good => "GOOD",
            Assessment::Moderate => "MODERATE",
            Assessment::Weak => "WEAK",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Assessment::Exceptional => "Institutional-grade performance",
            Assessment::Strong => "Professional-level strategy",
            Assessment::Good => "Solid performance, room for improvement",
            Assessment::Moderate => "Needs optimization",
            Assessment::Weak => "Strategy requires major revision",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label(), self.description())
    }
}

/// Derived statistics at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub initial_capital: Decimal,
    pub current_equity: Decimal,
    pub total_return: Decimal,
    pub annualized_return: Decimal,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Decimal,
    pub current_drawdown: Decimal,
    pub calmar_ratio: Decimal,
    pub total_trades: usize,
    pub win_rate: Decimal,
    pub profit_factor: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,
    pub win_loss_ratio: Decimal,
    pub assessment: Assessment,
}

impl PerformanceSummary {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               PERFORMANCE DASHBOARD
══════════════════════════════════════════════════════

RETURNS
───────────────────────────────────────────────────────
Initial Capital:  {:.2}
Final Equity:     {:.2}
Total Return:     {:+.2}%
Annualized:       {:+.2}%

RISK
───────────────────────────────────────────────────────
Sharpe Ratio:     {:.2} {}
Max Drawdown:     {:.2}% {}
Cur Drawdown:     {:.2}%
Calmar Ratio:     {:.2}

TRADING
───────────────────────────────────────────────────────
Total Trades:     {}
Win Rate:         {:.1}% {}
Profit Factor:    {:.2} {}
Average Win:      {:.2}
Average Loss:     {:.2}
Win/Loss Ratio:   {:.2}

ASSESSMENT
───────────────────────────────────────────────────────
{}
══════════════════════════════════════════════════════
"#,
            self.initial_capital,
            self.current_equity,
            percent(self.total_return),
            percent(self.annualized_return),
            self.sharpe_ratio,
            Rating::for_sharpe(self.sharpe_ratio),
            percent(self.max_drawdown),
            Rating::for_drawdown(self.max_drawdown),
            percent(self.current_drawdown),
            self.calmar_ratio,
            self.total_trades,
            percent(self.win_rate),
            Rating::for_win_rate(self.win_rate),
            self.profit_factor,
            Rating::for_profit_factor(self.profit_factor),
            self.average_win,
            self.average_loss,
            self.win_loss_ratio,
            self.assessment,
        )
    }
}

/// Fraction to percentage points, saturating at the Decimal range
fn percent(fraction: Decimal) -> Decimal {
    fraction.saturating_mul(Decimal::ONE_HUNDRED)
}
