//! Risk management module
//!
//! Position snapshots, market regime, and capital allocation for new positions

mod kelly;
mod position;
mod regime;
mod sizing;
mod types;

pub use kelly::KellyCalculator;
pub use position::{PositionBook, TradePosition};
pub use regime::{MarketRegime, RegimeSource, SharedRegime, UnknownRegime};
pub use sizing::{regime_allocation, PositionSizer};
pub use types::RiskError;

pub(crate) use types::{ensure_positive_price, saturating_div};
