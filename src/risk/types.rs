//! Risk management types

use rust_decimal::Decimal;
use thiserror::Error;

/// Precondition violations raised by the decision engine
///
/// Callers are expected to validate upstream; these exist so a bad input
/// fails loudly instead of producing a silently wrong number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    /// Price must be strictly positive
    #[error("Price must be positive, got {0}")]
    NonPositivePrice(Decimal),
    /// Win rate is a probability
    #[error("Win rate must be within [0, 1], got {0}")]
    WinRateOutOfRange(Decimal),
    /// Risk/reward ratio must be strictly positive
    #[error("Risk/reward ratio must be positive, got {0}")]
    NonPositiveRiskReward(Decimal),
    /// Quantity must be strictly positive
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),
    /// Starting capital must be strictly positive
    #[error("Initial capital must be positive, got {0}")]
    NonPositiveCapital(Decimal),
    /// Positions need a symbol
    #[error("Symbol must not be empty")]
    EmptySymbol,
    /// No open position is tracked for the symbol
    #[error("No open position for {0}")]
    UnknownSymbol(String),
}

/// Reject zero and negative prices
pub(crate) fn ensure_positive_price(price: Decimal) -> Result<(), RiskError> {
    if price <= Decimal::ZERO {
        return Err(RiskError::NonPositivePrice(price));
    }
    Ok(())
}

/// `numerator / denominator`, saturating at the Decimal range on overflow
///
/// A zero denominator saturates by the sign of the numerator; callers that
/// define a different zero case check for it first.
pub(crate) fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_zero() {
            Decimal::ZERO
        } else if numerator.is_sign_negative() == denominator.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        }
    })
}
