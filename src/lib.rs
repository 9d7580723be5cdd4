//! trade-lifecycle: decision engine for the life of a trade
//!
//! This library provides the core components for:
//! - Position sizing (fractional Kelly, regime-driven, fixed)
//! - Priority-ordered exit decisions (stop, target, partials, trailing)
//! - Advisory position health scoring
//! - Performance analytics over closed trades
//! - Lenient TOML configuration
//! - Structured logging and metrics

pub mod analytics;
pub mod cli;
pub mod config;
pub mod exits;
pub mod health;
pub mod risk;
pub mod telemetry;
