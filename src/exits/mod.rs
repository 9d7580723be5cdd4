//! Exit strategy module
//!
//! Priority-ordered exit decisions for open positions

mod manager;
mod types;

pub use manager::ExitStrategyManager;
pub use types::{ExitDecision, ExitOrder, ExitType};
