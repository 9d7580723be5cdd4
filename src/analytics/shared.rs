//! Shared performance handle
//!
//! One writer (the strategy loop) records trades while reporting paths read
//! summaries. Reads take the lock for the whole computation so a summary
//! never mixes state from before and after a `record_trade`.

use std::sync::Arc;
use tokio::sync::RwLock;

use super::performance::PerformanceMetrics;
use super::report::PerformanceSummary;
use super::trade::TradeRecord;

/// Cloneable handle to a profile's performance metrics
#[derive(Debug, Clone)]
pub struct SharedPerformance {
    inner: Arc<RwLock<PerformanceMetrics>>,
}

impl SharedPerformance {
    pub fn new(metrics: PerformanceMetrics) -> Self {
        Self {
            inner: Arc::new(RwLock::new(metrics)),
        }
    }

    pub async fn record_trade(&self, trade: TradeRecord) {
        self.inner.write().await.record_trade(trade);
    }

    /// Consistent summary of the current state
    pub async fn summary(&self) -> PerformanceSummary {
        self.inner.read().await.summary()
    }

    /// Owned copy of the full state
    pub async fn snapshot(&self) -> PerformanceMetrics {
        self.inner.read().await.clone()
    }
}
