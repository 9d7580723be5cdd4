//! Performance analytics
//!
//! Equity curve, drawdown and risk/return statistics over closed trades

mod performance;
mod report;
mod shared;
mod trade;

pub use performance::{PerformanceMetrics, TRADING_DAYS};
pub use report::{Assessment, PerformanceSummary, Rating};
pub use shared::SharedPerformance;
pub use trade::{TradeAction, TradeRecord};
