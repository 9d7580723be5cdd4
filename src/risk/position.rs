//! Position snapshots and the per-symbol book that holds them
//!
//! A `TradePosition` is never edited in place. Every state change builds a
//! new value, and the `PositionBook` swaps the stored `Arc` for a symbol in
//! one step, so concurrent readers always see a complete snapshot.

use super::types::{ensure_positive_price, saturating_div, RiskError};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An open long position with its risk parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePosition {
    symbol: String,
    entry_price: Decimal,
    quantity: Decimal,
    stop_loss: Decimal,
    take_profit: Decimal,
    entry_time: DateTime<Utc>,
    /// Highest price observed since entry
    high_water_mark: Decimal,
    /// Highest partial-exit milestone already fired (0 = none)
    partial_level: u32,
}

impl TradePosition {
    /// Open a position snapshot
    ///
    /// The stop is expected below entry and the target above it; that
    /// relationship is trusted, not checked.
    pub fn new(
        symbol: impl Into<String>,
        entry_price: Decimal,
        quantity: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
        entry_time: DateTime<Utc>,
    ) -> Result<Self, RiskError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(RiskError::EmptySymbol);
        }
        ensure_positive_price(entry_price)?;
        if quantity <= Decimal::ZERO {
            return Err(RiskError::NonPositiveQuantity(quantity));
        }

        Ok(Self {
            symbol,
            entry_price,
            quantity,
            stop_loss,
            take_profit,
            entry_time,
            high_water_mark: entry_price,
            partial_level: 0,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn entry_price(&self) -> Decimal {
        self.entry_price
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn stop_loss(&self) -> Decimal {
        self.stop_loss
    }

    pub fn take_profit(&self) -> Decimal {
        self.take_profit
    }

    pub fn entry_time(&self) -> DateTime<Utc> {
        self.entry_time
    }

    pub fn high_water_mark(&self) -> Decimal {
        self.high_water_mark
    }

    /// Highest partial-exit milestone already fired
    pub fn partial_level(&self) -> u32 {
        self.partial_level
    }

    /// Whether milestone `level` (1-indexed) has already fired
    pub fn has_partial_exit(&self, level: u32) -> bool {
        level <= self.partial_level
    }

    /// Fractional gain relative to entry (0.01 = 1%)
    pub fn profit_percent(&self, current_price: Decimal) -> Decimal {
        saturating_div(current_price - self.entry_price, self.entry_price)
    }

    /// Unrealized P&L at the given price
    pub fn unrealized_pnl(&self, current_price: Decimal) -> Decimal {
        (current_price - self.entry_price).saturating_mul(self.quantity)
    }

    /// Whole hours held as of `now`, truncated toward zero
    pub fn hours_held(&self, now: DateTime<Utc>) -> i64 {
        (now - self.entry_time).num_hours()
    }

    pub fn is_stop_loss_hit(&self, current_price: Decimal) -> bool {
        current_price <= self.stop_loss
    }

    pub fn is_take_profit_hit(&self, current_price: Decimal) -> bool {
        current_price >= self.take_profit
    }

    /// Record that milestone `level` fired
    ///
    /// The counter only moves up; marking an older level is a no-op.
    pub fn mark_partial_exit(&self, level: u32) -> Self {
        Self {
            partial_level: self.partial_level.max(level),
            ..self.clone()
        }
    }

    /// Fold a new price observation into the high-water mark
    pub fn observe_price(&self, price: Decimal) -> Self {
        Self {
            high_water_mark: self.high_water_mark.max(price),
            ..self.clone()
        }
    }

    /// Ratchet the stop up to `trail_pct` below the high-water mark
    ///
    /// The stop never moves down.
    pub fn update_trailing_stop(&self, current_price: Decimal, trail_pct: Decimal) -> Self {
        let high_water_mark = self.high_water_mark.max(current_price);
        let candidate = high_water_mark.saturating_mul(Decimal::ONE - trail_pct);
        Self {
            high_water_mark,
            stop_loss: self.stop_loss.max(candidate),
            ..self.clone()
        }
    }

    /// Replace the remaining quantity, e.g. after a partial fill
    pub fn with_quantity(&self, quantity: Decimal) -> Result<Self, RiskError> {
        if quantity <= Decimal::ZERO {
            return Err(RiskError::NonPositiveQuantity(quantity));
        }
        Ok(Self {
            quantity,
            ..self.clone()
        })
    }
}

/// Latest position snapshot per symbol
///
/// Each write replaces the whole `Arc` under the entry's shard lock, so a
/// reader holding an older `Arc` keeps a consistent view.
#[derive(Debug, Default)]
pub struct PositionBook {
    positions: DashMap<String, Arc<TradePosition>>,
}

impl PositionBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self {
            positions: DashMap::new(),
        }
    }

    /// Track a newly opened position, returning any snapshot it displaced
    pub fn open(&self, position: TradePosition) -> Option<Arc<TradePosition>> {
        let symbol = position.symbol().to_string();
        tracing::info!(
            symbol = %symbol,
            entry = %position.entry_price(),
            quantity = %position.quantity(),
            "Position opened"
        );
        self.positions.insert(symbol, Arc::new(position))
    }

    /// Latest snapshot for a symbol
    pub fn get(&self, symbol: &str) -> Option<Arc<TradePosition>> {
        self.positions.get(symbol).map(|entry| Arc::clone(entry.value()))
    }

    /// Swap in a new snapshot for an already tracked symbol
    pub fn replace(&self, position: TradePosition) -> Result<Arc<TradePosition>, RiskError> {
        let mut entry = self
            .positions
            .get_mut(position.symbol())
            .ok_or_else(|| RiskError::UnknownSymbol(position.symbol().to_string()))?;
        let previous = std::mem::replace(entry.value_mut(), Arc::new(position));
        Ok(previous)
    }

    /// Derive and store a new snapshot while holding the symbol's lock
    pub fn update<F>(&self, symbol: &str, f: F) -> Result<Arc<TradePosition>, RiskError>
    where
        F: FnOnce(&TradePosition) -> TradePosition,
    {
        let mut entry = self
            .positions
            .get_mut(symbol)
            .ok_or_else(|| RiskError::UnknownSymbol(symbol.to_string()))?;
        let next = Arc::new(f(entry.value()));
        *entry.value_mut() = Arc::clone(&next);
        Ok(next)
    }

    /// Record a fired partial-exit milestone
    pub fn mark_partial_exit(
        &self,
        symbol: &str,
        level: u32,
    ) -> Result<Arc<TradePosition>, RiskError> {
        let updated = self.update(symbol, |p| p.mark_partial_exit(level))?;
        tracing::debug!(symbol, level = updated.partial_level(), "Partial exit recorded");
        Ok(updated)
    }

    /// Fold a price tick into the symbol's high-water mark
    pub fn observe_price(
        &self,
        symbol: &str,
        price: Decimal,
    ) -> Result<Arc<TradePosition>, RiskError> {
        ensure_positive_price(price)?;
        self.update(symbol, |p| p.observe_price(price))
    }

    /// Stop tracking a symbol
    pub fn close(&self, symbol: &str) -> Option<Arc<TradePosition>> {
        let removed = self.positions.remove(symbol).map(|(_, p)| p);
        if removed.is_some() {
            tracing::info!(symbol, "Position closed");
        }
        removed
    }

    /// Symbols with an open position
    pub fn symbols(&self) -> Vec<String> {
        self.positions.iter().map(|e| e.key().clone()).collect()
    }

    /// Total cost basis of all open positions
    pub fn total_exposure(&self) -> Decimal {
        self.positions
            .iter()
            .map(|e| e.value().entry_price().saturating_mul(e.value().quantity()))
            .fold(dec!(0), |acc, v| acc.saturating_add(v))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
