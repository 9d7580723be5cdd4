//! Closed-trade records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side of a recorded fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

/// A closed (fully or partially) trade and its realized P&L
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: TradeAction,
    pub quantity: Decimal,
    pub price: Decimal,
    pub profit_loss: Decimal,
}

impl TradeRecord {
    /// Create a record stamped now with a fresh id
    pub fn new(
        symbol: impl Into<String>,
        action: TradeAction,
        quantity: Decimal,
        price: Decimal,
        profit_loss: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: symbol.into(),
            action,
            quantity,
            price,
            profit_loss,
        }
    }

    /// Override the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_win(&self) -> bool {
        self.profit_loss > Decimal::ZERO
    }

    pub fn is_loss(&self) -> bool {
        self.profit_loss < Decimal::ZERO
    }
}
