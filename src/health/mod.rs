//! Position health module

mod scorer;

pub use scorer::{HealthScore, PositionHealthScorer};
