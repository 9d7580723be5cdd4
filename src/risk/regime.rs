//! Market regime values and the sources that publish them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Discrete market risk state, ordered from most to least favourable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketRegime {
    StrongBull,
    WeakBull,
    RangeBound,
    WeakBear,
    StrongBear,
    HighVolatility,
}

impl MarketRegime {
    /// All regimes, most favourable first
    pub const ALL: [MarketRegime; 6] = [
        MarketRegime::StrongBull,
        MarketRegime::WeakBull,
        MarketRegime::RangeBound,
        MarketRegime::WeakBear,
        MarketRegime::StrongBear,
        MarketRegime::HighVolatility,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::StrongBull => "STRONG_BULL",
            MarketRegime::WeakBull => "WEAK_BULL",
            MarketRegime::RangeBound => "RANGE_BOUND",
            MarketRegime::WeakBear => "WEAK_BEAR",
            MarketRegime::StrongBear => "STRONG_BEAR",
            MarketRegime::HighVolatility => "HIGH_VOLATILITY",
        }
    }

    /// Parse a regime name, treating anything unrecognised as `WeakBear`
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!(regime = name, "Unrecognized regime, using WEAK_BEAR");
            MarketRegime::WeakBear
        })
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for regime names that match no variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown market regime: {0}")]
pub struct UnknownRegime(pub String);

impl FromStr for MarketRegime {
    type Err = UnknownRegime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        MarketRegime::ALL
            .into_iter()
            .find(|regime| regime.as_str() == normalized)
            .ok_or_else(|| UnknownRegime(s.to_string()))
    }
}

/// Read-only view of the current market regime
///
/// The classifier behind it is external; the value may change between calls.
pub trait RegimeSource: Send + Sync {
    /// Current regime
    fn current_regime(&self) -> MarketRegime;
}

/// A fixed regime is its own source
impl RegimeSource for MarketRegime {
    fn current_regime(&self) -> MarketRegime {
        *self
    }
}

/// Regime source that a classifier task can update in place
#[derive(Debug)]
pub struct SharedRegime {
    regime: RwLock<MarketRegime>,
}

impl SharedRegime {
    /// Create a source starting at the given regime
    pub fn new(initial: MarketRegime) -> Self {
        Self {
            regime: RwLock::new(initial),
        }
    }

    /// Publish a newly classified regime
    pub fn set(&self, regime: MarketRegime) {
        let mut current = self.regime.write().unwrap_or_else(PoisonError::into_inner);
        let previous = *current;
        if previous != regime {
            tracing::info!(from = %previous, to = %regime, "Market regime changed");
        }
        *current = regime;
    }
}

impl Default for SharedRegime {
    fn default() -> Self {
        Self::new(MarketRegime::RangeBound)
    }
}

impl RegimeSource for SharedRegime {
    fn current_regime(&self) -> MarketRegime {
        *self.regime.read().unwrap_or_else(PoisonError::into_inner)
    }
}
