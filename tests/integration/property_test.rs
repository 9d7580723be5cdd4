//! Property-based tests for the decision engine

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use trade_lifecycle::analytics::{PerformanceMetrics, TradeAction, TradeRecord};
use trade_lifecycle::exits::{ExitStrategyManager, ExitType};
use trade_lifecycle::health::PositionHealthScorer;
use trade_lifecycle::risk::{KellyCalculator, RiskError, TradePosition};

/// Prices from 1.00 to 1000.00
fn arb_price() -> impl Strategy<Value = Decimal> {
    (100i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Fraction in [0, 1] with four decimal places
fn arb_fraction() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|bp| Decimal::new(bp, 4))
}

/// Long position with stop below and target above entry
fn arb_position() -> impl Strategy<Value = TradePosition> {
    (arb_price(), 1i64..5_000, 1i64..5_000).prop_map(|(entry, stop_bp, target_bp)| {
        let stop = entry * (Decimal::ONE - Decimal::new(stop_bp, 4) / dec!(2));
        let target = entry * (Decimal::ONE + Decimal::new(target_bp, 4));
        TradePosition::new("PROP", entry, dec!(10), stop, target, Utc::now()).unwrap()
    })
}

/// Any non-negative Decimal, from the smallest step up to `Decimal::MAX`
fn arb_full_range() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::MAX),
        Just(Decimal::new(1, 28)),
        (any::<u32>(), any::<u32>(), any::<u32>(), 0u32..=28)
            .prop_map(|(lo, mid, hi, scale)| Decimal::from_parts(lo, mid, hi, false, scale)),
    ]
}

/// Per-trade P&L on 100 of capital, from wipe-outs to 100x gains
fn arb_wide_pnl() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (-200_000i64..0).prop_map(|cents| Decimal::new(cents, 2)),
        (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2)),
        (1i64..1_000_000_000_000).prop_map(Decimal::from),
    ]
}

fn no_portfolio() -> HashMap<String, Decimal> {
    HashMap::new()
}

proptest! {
    /// Price at the stop is always a full stop-loss exit.
    #[test]
    fn stop_loss_at_stop_price(position in arb_position()) {
        let decision = ExitStrategyManager::default()
            .evaluate(&position, position.stop_loss(), dec!(0.02), &no_portfolio())
            .unwrap();
        prop_assert_eq!(decision.exit_type(), ExitType::StopLoss);
        prop_assert_eq!(decision.quantity(), Decimal::ONE);
        prop_assert!(!decision.is_partial());
    }

    /// Price at or above the target is always a full take-profit exit.
    #[test]
    fn take_profit_at_or_above_target(position in arb_position(), extra in 0i64..10_000) {
        let price = position.take_profit() + Decimal::new(extra, 2);
        let decision = ExitStrategyManager::default()
            .evaluate(&position, price, dec!(0.02), &no_portfolio())
            .unwrap();
        prop_assert_eq!(decision.exit_type(), ExitType::TakeProfit);
        prop_assert_eq!(decision.quantity(), Decimal::ONE);
    }

    /// Strictly between stop and target, neither full exit fires.
    #[test]
    fn no_full_exit_between_stop_and_target(position in arb_position(), t in 1i64..10_000) {
        let span = position.take_profit() - position.stop_loss();
        let price = position.stop_loss() + span * Decimal::new(t, 4);
        prop_assume!(price > position.stop_loss() && price < position.take_profit());

        let decision = ExitStrategyManager::default()
            .evaluate(&position, price, dec!(0.02), &no_portfolio())
            .unwrap();
        prop_assert_ne!(decision.exit_type(), ExitType::StopLoss);
        prop_assert_ne!(decision.exit_type(), ExitType::TakeProfit);
    }

    /// A fired milestone never fires again at the same price.
    #[test]
    fn partial_exit_is_idempotent(position in arb_position(), t in 0i64..10_000) {
        let manager = ExitStrategyManager::default();
        let distance = position.take_profit() - position.entry_price();
        let price = position.entry_price() + distance * Decimal::new(t, 4);
        prop_assume!(price < position.take_profit());

        let first = manager.evaluate(&position, price, dec!(0.02), &no_portfolio()).unwrap();
        if let Some(level) = first.partial_level() {
            let marked = position.mark_partial_exit(level);
            let second = manager.evaluate(&marked, price, dec!(0.02), &no_portfolio()).unwrap();
            prop_assert_ne!(second.partial_level(), Some(level));
            if let Some(next) = second.partial_level() {
                prop_assert_eq!(next, level + 1);
            }
        }
    }

    /// Kelly sizing stays inside the configured band.
    #[test]
    fn kelly_within_band(win_rate in arb_fraction(), rr_cents in 1i64..100_000) {
        let calc = KellyCalculator::default();
        let pct = calc.calculate(win_rate, Decimal::new(rr_cents, 2)).unwrap();
        prop_assert!(pct >= calc.min_pct);
        prop_assert!(pct <= calc.max_pct);
    }

    /// Kelly sizing never decreases as win rate rises.
    #[test]
    fn kelly_monotonic_in_win_rate(
        a in arb_fraction(),
        b in arb_fraction(),
        rr_cents in 1i64..100_000,
    ) {
        let calc = KellyCalculator::default();
        let rr = Decimal::new(rr_cents, 2);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calc.calculate(low, rr).unwrap() <= calc.calculate(high, rr).unwrap());
    }

    /// Health score is in [0, 100] for any input.
    #[test]
    fn health_score_in_range(
        position in arb_position(),
        price in arb_price(),
        momentum_bp in -100_000i64..100_000,
        hours in -10i64..1_000,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
        let position = TradePosition::new(
            position.symbol(),
            position.entry_price(),
            position.quantity(),
            position.stop_loss(),
            position.take_profit(),
            now - Duration::hours(hours),
        )
        .unwrap();
        let score = PositionHealthScorer::default()
            .score_at(&position, price, Decimal::new(momentum_bp, 2), now)
            .unwrap();
        prop_assert!(score.value() <= 100);
    }

    /// Max drawdown is always within [0, 1].
    #[test]
    fn max_drawdown_bounded(pnls in prop::collection::vec(-20_000i64..20_000, 0..40)) {
        let mut metrics = PerformanceMetrics::new(dec!(10000)).unwrap();
        for pnl in pnls {
            metrics.record_trade(TradeRecord::new(
                "PROP",
                TradeAction::Sell,
                dec!(1),
                dec!(100),
                Decimal::from(pnl),
            ));
            prop_assert!(metrics.max_drawdown() >= Decimal::ZERO);
            prop_assert!(metrics.max_drawdown() <= Decimal::ONE);
            prop_assert!(metrics.current_drawdown() <= metrics.max_drawdown());
        }
    }

    /// Sharpe is exactly zero with fewer than two trades.
    #[test]
    fn sharpe_zero_below_two_trades(pnl in -5_000i64..5_000) {
        let mut metrics = PerformanceMetrics::new(dec!(10000)).unwrap();
        prop_assert_eq!(metrics.sharpe_ratio(), Decimal::ZERO);
        metrics.record_trade(TradeRecord::new(
            "PROP",
            TradeAction::Sell,
            dec!(1),
            dec!(100),
            Decimal::from(pnl),
        ));
        prop_assert_eq!(metrics.sharpe_ratio(), Decimal::ZERO);
    }

    /// Kelly never panics over the full Decimal range: in-range inputs stay
    /// in band, everything else is a typed error.
    #[test]
    fn kelly_total_over_full_range(
        win_rate in prop_oneof![arb_fraction(), arb_full_range()],
        negative_win_rate in any::<bool>(),
        risk_reward in arb_full_range(),
    ) {
        let calc = KellyCalculator::default();
        let win_rate = if negative_win_rate { -win_rate } else { win_rate };
        match calc.calculate(win_rate, risk_reward) {
            Ok(pct) => {
                prop_assert!(pct >= calc.min_pct && pct <= calc.max_pct);
            }
            Err(RiskError::WinRateOutOfRange(p)) => {
                prop_assert!(p < Decimal::ZERO || p > Decimal::ONE);
            }
            Err(RiskError::NonPositiveRiskReward(b)) => prop_assert!(b.is_zero()),
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// Summaries never panic, even when returns compound past the Decimal
    /// range, and drawdown stays within [0, 1].
    #[test]
    fn summary_total_over_wide_pnl(pnls in prop::collection::vec(arb_wide_pnl(), 0..30)) {
        let mut metrics = PerformanceMetrics::new(dec!(100)).unwrap();
        for pnl in pnls {
            metrics.record_trade(TradeRecord::new(
                "PROP",
                TradeAction::Sell,
                dec!(1),
                dec!(100),
                pnl,
            ));
        }

        let summary = metrics.summary();
        prop_assert!(summary.max_drawdown >= Decimal::ZERO);
        prop_assert!(summary.max_drawdown <= Decimal::ONE);
        if summary.annualized_return >= Decimal::ZERO {
            prop_assert!(summary.calmar_ratio >= Decimal::ZERO);
        }
        prop_assert!(summary.format_table().contains("PERFORMANCE DASHBOARD"));
    }

    /// Health scoring never panics at extreme price-to-entry ratios.
    #[test]
    fn health_total_over_extreme_prices(
        entry in arb_full_range(),
        price in arb_full_range(),
        momentum in arb_full_range(),
        negative_momentum in any::<bool>(),
    ) {
        prop_assume!(!entry.is_zero() && !price.is_zero());
        let position =
            TradePosition::new("PROP", entry, dec!(1), Decimal::ZERO, Decimal::MAX, Utc::now())
                .unwrap();
        let momentum = if negative_momentum { -momentum } else { momentum };
        let score = PositionHealthScorer::default()
            .score(&position, price, momentum)
            .unwrap();
        prop_assert!(score.value() <= 100);
    }
}
