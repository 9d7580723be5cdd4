//! Exit decision types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of exit, in descending priority after `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitType {
    None,
    StopLoss,
    TakeProfit,
    PartialProfit,
    TrailingStop,
}

impl ExitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitType::None => "NONE",
            ExitType::StopLoss => "STOP_LOSS",
            ExitType::TakeProfit => "TAKE_PROFIT",
            ExitType::PartialProfit => "PARTIAL_PROFIT",
            ExitType::TrailingStop => "TRAILING_STOP",
        }
    }
}

impl fmt::Display for ExitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order details attached to a firing exit rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitOrder {
    /// Share of the position to close, in (0, 1]
    pub quantity: Decimal,
    /// Expected execution price
    pub expected_price: Decimal,
    /// Human-readable explanation
    pub reason: String,
    /// True when part of the position stays open
    pub partial: bool,
}

impl ExitOrder {
    /// Close the whole position
    pub fn full(expected_price: Decimal, reason: impl Into<String>) -> Self {
        Self {
            quantity: Decimal::ONE,
            expected_price,
            reason: reason.into(),
            partial: false,
        }
    }

    /// Close `quantity` of the position; a quantity of one or more is a full exit
    pub fn fraction(quantity: Decimal, expected_price: Decimal, reason: impl Into<String>) -> Self {
        let partial = quantity < Decimal::ONE;
        Self {
            quantity: quantity.min(Decimal::ONE),
            expected_price,
            reason: reason.into(),
            partial,
        }
    }
}

/// Outcome of one exit evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitDecision {
    /// No rule matched
    NoExit,
    StopLoss(ExitOrder),
    TakeProfit(ExitOrder),
    /// Milestone `level` (1-indexed) was reached
    PartialProfit { level: u32, order: ExitOrder },
    /// Price retraced from `high_water_mark` past the trailing threshold
    TrailingStop {
        high_water_mark: Decimal,
        order: ExitOrder,
    },
}

impl ExitDecision {
    pub fn exit_type(&self) -> ExitType {
        match self {
            ExitDecision::NoExit => ExitType::None,
            ExitDecision::StopLoss(_) => ExitType::StopLoss,
            ExitDecision::TakeProfit(_) => ExitType::TakeProfit,
            ExitDecision::PartialProfit { .. } => ExitType::PartialProfit,
            ExitDecision::TrailingStop { .. } => ExitType::TrailingStop,
        }
    }

    pub fn order(&self) -> Option<&ExitOrder> {
        match self {
            ExitDecision::NoExit => None,
            ExitDecision::StopLoss(order) | ExitDecision::TakeProfit(order) => Some(order),
            ExitDecision::PartialProfit { order, .. } | ExitDecision::TrailingStop { order, .. } => {
                Some(order)
            }
        }
    }

    pub fn is_exit(&self) -> bool {
        !matches!(self, ExitDecision::NoExit)
    }

    /// Share of the position to close; zero when nothing fired
    pub fn quantity(&self) -> Decimal {
        self.order().map_or(Decimal::ZERO, |o| o.quantity)
    }

    pub fn expected_price(&self) -> Option<Decimal> {
        self.order().map(|o| o.expected_price)
    }

    pub fn reason(&self) -> &str {
        self.order().map_or("No exit signal", |o| o.reason.as_str())
    }

    pub fn is_partial(&self) -> bool {
        self.order().is_some_and(|o| o.partial)
    }

    /// Milestone to record on the position once the order has executed
    pub fn partial_level(&self) -> Option<u32> {
        match self {
            ExitDecision::PartialProfit { level, .. } => Some(*level),
            _ => None,
        }
    }
}

impl fmt::Display for ExitDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order() {
            None => write!(f, "{}", self.exit_type()),
            Some(order) => write!(
                f,
                "{} qty={} @ {} ({})",
                self.exit_type(),
                order.quantity,
                order.expected_price,
                order.reason
            ),
        }
    }
}
