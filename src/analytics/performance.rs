//! Performance tracking over closed trades
//!
//! Keeps an equity curve, peak and drawdown up to date as trades are
//! recorded. Everything else (Sharpe, Calmar, profit factor, ...) is derived
//! on demand from the stored history. Empty histories yield zero, never NaN.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::report::{Assessment, PerformanceSummary};
use super::trade::TradeRecord;
use crate::config::MetricsConfig;
use crate::risk::{saturating_div, RiskError};
use crate::telemetry::{self, GaugeMetric};

/// Trading days per year used for annualization
pub const TRADING_DAYS: u32 = 252;

/// Equity and return history for one strategy profile
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    initial_capital: Decimal,
    risk_free_rate: Decimal,
    current_equity: Decimal,
    peak_equity: Decimal,
    max_drawdown: Decimal,
    current_drawdown: Decimal,
    trades: Vec<TradeRecord>,
    equity_curve: Vec<Decimal>,
    daily_returns: Vec<Decimal>,
}

impl PerformanceMetrics {
    /// Start tracking from `initial_capital` with a 4% risk-free rate
    pub fn new(initial_capital: Decimal) -> Result<Self, RiskError> {
        if initial_capital <= Decimal::ZERO {
            return Err(RiskError::NonPositiveCapital(initial_capital));
        }
        Ok(Self {
            initial_capital,
            risk_free_rate: MetricsConfig::default().risk_free_rate,
            current_equity: initial_capital,
            peak_equity: initial_capital,
            max_drawdown: Decimal::ZERO,
            current_drawdown: Decimal::ZERO,
            trades: Vec::new(),
            equity_curve: vec![initial_capital],
            daily_returns: Vec::new(),
        })
    }

    /// Build from the metrics section of the configuration
    pub fn from_config(config: &MetricsConfig) -> Result<Self, RiskError> {
        Ok(Self::new(config.initial_capital)?.with_risk_free_rate(config.risk_free_rate))
    }

    /// Annual risk-free rate used by the Sharpe ratio
    pub fn with_risk_free_rate(mut self, rate: Decimal) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Append a closed trade and roll equity, peak and drawdown forward
    pub fn record_trade(&mut self, trade: TradeRecord) {
        let previous = self.current_equity;
        self.current_equity = self.current_equity.saturating_add(trade.profit_loss);
        self.equity_curve.push(self.current_equity);

        if self.current_equity > self.peak_equity {
            self.peak_equity = self.current_equity;
            self.current_drawdown = Decimal::ZERO;
        } else if self.current_equity < self.peak_equity {
            let drawdown = saturating_div(
                self.peak_equity.saturating_sub(self.current_equity),
                self.peak_equity,
            );
            // Equity below zero would push past 100%
            self.current_drawdown = drawdown.clamp(Decimal::ZERO, Decimal::ONE);
            self.max_drawdown = self.max_drawdown.max(self.current_drawdown);
        } else {
            self.current_drawdown = Decimal::ZERO;
        }

        let daily_return = if previous > Decimal::ZERO {
            saturating_div(self.current_equity.saturating_sub(previous), previous)
        } else {
            Decimal::ZERO
        };
        self.daily_returns.push(daily_return);

        tracing::info!(
            symbol = %trade.symbol,
            action = ?trade.action,
            pnl = %trade.profit_loss,
            equity = %self.current_equity,
            drawdown_pct = %(self.current_drawdown * dec!(100)).round_dp(2),
            "Trade recorded"
        );
        telemetry::set_gauge(GaugeMetric::Equity, self.current_equity);
        telemetry::set_gauge(GaugeMetric::DrawdownPct, self.current_drawdown);
        telemetry::set_gauge(GaugeMetric::MaxDrawdownPct, self.max_drawdown);

        self.trades.push(trade);
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    pub fn risk_free_rate(&self) -> Decimal {
        self.risk_free_rate
    }

    pub fn current_equity(&self) -> Decimal {
        self.current_equity
    }

    pub fn peak_equity(&self) -> Decimal {
        self.peak_equity
    }

    pub fn max_drawdown(&self) -> Decimal {
        self.max_drawdown
    }

    pub fn current_drawdown(&self) -> Decimal {
        self.current_drawdown
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Equity after each update, starting with the initial capital
    pub fn equity_curve(&self) -> &[Decimal] {
        &self.equity_curve
    }

    pub fn daily_returns(&self) -> &[Decimal] {
        &self.daily_returns
    }

    pub fn total_trades(&self) -> usize {
        self.trades.len()
    }

    pub fn total_return(&self) -> Decimal {
        saturating_div(
            self.current_equity.saturating_sub(self.initial_capital),
            self.initial_capital,
        )
    }

    /// (1 + mean daily return)^252 - 1
    pub fn annualized_return(&self) -> Decimal {
        let Some(mean) = mean(&self.daily_returns) else {
            return Decimal::ZERO;
        };
        let growth = (1.0 + to_f64(mean)).powi(TRADING_DAYS as i32) - 1.0;
        to_decimal(growth)
    }

    /// Annualized Sharpe ratio over daily returns, population std dev
    pub fn sharpe_ratio(&self) -> Decimal {
        if self.daily_returns.len() < 2 {
            return Decimal::ZERO;
        }
        let returns: Vec<f64> = self.daily_returns.iter().copied().map(to_f64).collect();
        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if std_dev == 0.0 || !std_dev.is_finite() {
            return Decimal::ZERO;
        }

        let daily_rf = to_f64(self.risk_free_rate) / f64::from(TRADING_DAYS);
        let sharpe = (mean - daily_rf) / std_dev * f64::from(TRADING_DAYS).sqrt();
        to_decimal(sharpe)
    }

    /// Share of trades with positive P&L
    pub fn win_rate(&self) -> Decimal {
        if self.trades.is_empty() {
            return Decimal::ZERO;
        }
        let wins = self.trades.iter().filter(|t| t.is_win()).count();
        Decimal::from(wins) / Decimal::from(self.trades.len())
    }

    /// Gross profit over absolute gross loss
    pub fn profit_factor(&self) -> Decimal {
        let gross_profit = saturating_sum(self.wins());
        let gross_loss = saturating_sum(self.losses()).abs();
        if gross_loss.is_zero() {
            return Decimal::ZERO;
        }
        saturating_div(gross_profit, gross_loss)
    }

    pub fn average_win(&self) -> Decimal {
        average(self.wins())
    }

    /// Mean losing P&L, negative or zero
    pub fn average_loss(&self) -> Decimal {
        average(self.losses())
    }

    /// Average win over absolute average loss
    pub fn win_loss_ratio(&self) -> Decimal {
        let avg_loss = self.average_loss();
        if avg_loss.is_zero() {
            return Decimal::ZERO;
        }
        saturating_div(self.average_win(), avg_loss.abs())
    }

    /// Annualized return over max drawdown, saturating when returns explode
    pub fn calmar_ratio(&self) -> Decimal {
        if self.max_drawdown.is_zero() {
            return Decimal::ZERO;
        }
        saturating_div(self.annualized_return(), self.max_drawdown)
    }

    pub fn assessment(&self) -> Assessment {
        Assessment::from_metrics(
            self.sharpe_ratio(),
            self.max_drawdown,
            self.profit_factor(),
            self.win_rate(),
        )
    }

    /// Point-in-time view of every derived statistic
    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            initial_capital: self.initial_capital,
            current_equity: self.current_equity,
            total_return: self.total_return(),
            annualized_return: self.annualized_return(),
            sharpe_ratio: self.sharpe_ratio(),
            max_drawdown: self.max_drawdown,
            current_drawdown: self.current_drawdown,
            calmar_ratio: self.calmar_ratio(),
            total_trades: self.total_trades(),
            win_rate: self.win_rate(),
            profit_factor: self.profit_factor(),
            average_win: self.average_win(),
            average_loss: self.average_loss(),
            win_loss_ratio: self.win_loss_ratio(),
            assessment: self.assessment(),
        }
    }

    fn wins(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.trades
            .iter()
            .filter(|t| t.is_win())
            .map(|t| t.profit_loss)
    }

    fn losses(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.trades
            .iter()
            .filter(|t| t.is_loss())
            .map(|t| t.profit_loss)
    }
}

fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    Some(saturating_sum(values.iter().copied()) / Decimal::from(values.len()))
}

fn average(values: impl Iterator<Item = Decimal>) -> Decimal {
    let (sum, count) = values.fold((Decimal::ZERO, 0u64), |(sum, n), v| {
        (sum.saturating_add(v), n + 1)
    });
    if count == 0 {
        return Decimal::ZERO;
    }
    sum / Decimal::from(count)
}

fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, Decimal::saturating_add)
}

fn to_f64(value: Decimal) -> f64 {
    f64::try_from(value).unwrap_or(0.0)
}

/// f64 back to Decimal, saturating at the Decimal range
fn to_decimal(value: f64) -> Decimal {
    if value.is_nan() || value.abs() < 1e-20 {
        return Decimal::ZERO;
    }
    Decimal::try_from(value)
        .unwrap_or(if value > 0.0 { Decimal::MAX } else { Decimal::MIN })
        .round_dp(10)
}
