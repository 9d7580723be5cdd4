//! Engine gauges and counters
//!
//! Published through the `metrics` facade; nothing is recorded until the
//! host process installs a recorder.

use rust_decimal::Decimal;

use crate::exits::ExitType;

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Current equity
    Equity,
    /// Current drawdown from peak
    DrawdownPct,
    /// Largest drawdown seen
    MaxDrawdownPct,
    /// Latest health score for a position
    PositionHealth,
}

impl GaugeMetric {
    /// Exported metric name
    pub fn name(&self) -> &'static str {
        match self {
            GaugeMetric::Equity => "lifecycle_equity",
            GaugeMetric::DrawdownPct => "lifecycle_drawdown_pct",
            GaugeMetric::MaxDrawdownPct => "lifecycle_max_drawdown_pct",
            GaugeMetric::PositionHealth => "lifecycle_position_health",
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    let value = f64::try_from(value).unwrap_or(0.0);
    ::metrics::gauge!(metric.name()).set(value);
    tracing::trace!(metric = metric.name(), value, "Setting gauge");
}

/// Set a per-symbol gauge value
pub fn set_symbol_gauge(metric: GaugeMetric, symbol: &str, value: Decimal) {
    let value = f64::try_from(value).unwrap_or(0.0);
    ::metrics::gauge!(metric.name(), "symbol" => symbol.to_string()).set(value);
}

/// Count a fired exit
pub fn record_exit(exit_type: ExitType) {
    ::metrics::counter!("lifecycle_exits_total", "type" => exit_type.as_str()).increment(1);
}
