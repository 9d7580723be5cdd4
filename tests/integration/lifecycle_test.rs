//! End-to-end trade lifecycle tests

use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

use trade_lifecycle::analytics::{
    Assessment, PerformanceMetrics, SharedPerformance, TradeAction, TradeRecord,
};
use trade_lifecycle::config::{Config, Settings};
use trade_lifecycle::exits::{ExitDecision, ExitStrategyManager, ExitType};
use trade_lifecycle::health::PositionHealthScorer;
use trade_lifecycle::risk::{MarketRegime, PositionBook, PositionSizer, TradePosition};

fn no_portfolio() -> HashMap<String, Decimal> {
    HashMap::new()
}

#[test]
fn test_config_example_loads() {
    let settings = Settings::from_toml_str(include_str!("../../config.toml.example")).unwrap();
    let config = Config::from_settings(&settings);
    assert_eq!(config, Config::default());
}

#[test]
fn test_stop_target_scenario() {
    let position = TradePosition::new(
        "AAPL",
        dec!(150.00),
        dec!(10),
        dec!(149.25),
        dec!(151.125),
        Utc::now(),
    )
    .unwrap();
    let manager = ExitStrategyManager::default();
    let portfolio = no_portfolio();

    let stop = manager
        .evaluate(&position, dec!(149.25), dec!(0.02), &portfolio)
        .unwrap();
    assert_eq!(stop.exit_type(), ExitType::StopLoss);
    assert_eq!(stop.expected_price(), Some(dec!(149.25)));
    assert_eq!(stop.quantity(), dec!(1));
    assert!(!stop.is_partial());

    let target = manager
        .evaluate(&position, dec!(151.125), dec!(0.02), &portfolio)
        .unwrap();
    assert_eq!(target.exit_type(), ExitType::TakeProfit);
    assert_eq!(target.expected_price(), Some(dec!(151.125)));

    let flat = manager
        .evaluate(&position, dec!(150.00), dec!(0.02), &portfolio)
        .unwrap();
    assert_eq!(flat, ExitDecision::NoExit);
    assert_eq!(flat.quantity(), dec!(0));
}

#[test]
fn test_partial_exits_then_take_profit() {
    let book = PositionBook::new();
    let entry_time = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
    book.open(
        TradePosition::new("MSFT", dec!(100), dec!(30), dec!(95), dec!(110), entry_time).unwrap(),
    );
    let manager = ExitStrategyManager::default();
    let portfolio = no_portfolio();

    // Gap straight to the 75% milestone: levels still fire one at a time
    let mut fired = Vec::new();
    for _ in 0..5 {
        let position = book.get("MSFT").unwrap();
        let decision = manager
            .evaluate(&position, dec!(107.6), dec!(0.02), &portfolio)
            .unwrap();
        match decision {
            ExitDecision::PartialProfit { level, ref order } => {
                assert!(order.partial);
                fired.push(level);
                book.mark_partial_exit("MSFT", level).unwrap();
            }
            ExitDecision::NoExit => break,
            other => panic!("unexpected decision {other:?}"),
        }
    }
    assert_eq!(fired, vec![1, 2, 3]);

    let position = book.get("MSFT").unwrap();
    assert_eq!(position.partial_level(), 3);
    let decision = manager
        .evaluate(&position, dec!(110), dec!(0.02), &portfolio)
        .unwrap();
    assert_eq!(decision.exit_type(), ExitType::TakeProfit);

    let closed = book.close("MSFT").unwrap();
    assert_eq!(closed.partial_level(), 3);
    assert!(book.is_empty());
}

#[test]
fn test_trailing_stop_after_run_up() {
    let book = PositionBook::new();
    book.open(
        TradePosition::new("NVDA", dec!(100), dec!(5), dec!(90), dec!(200), Utc::now()).unwrap(),
    );
    let manager = ExitStrategyManager::default();
    let portfolio = no_portfolio();

    // 25% milestone of a 100-point target is 125; stay below it
    for price in [dec!(105), dec!(112), dec!(118)] {
        let position = book.observe_price("NVDA", price).unwrap();
        let decision = manager
            .evaluate(&position, price, dec!(0.02), &portfolio)
            .unwrap();
        assert_eq!(decision, ExitDecision::NoExit);
    }

    // 2% off the 118 high
    let position = book.get("NVDA").unwrap();
    let decision = manager
        .evaluate(&position, dec!(115.64), dec!(0.02), &portfolio)
        .unwrap();
    match decision {
        ExitDecision::TrailingStop {
            high_water_mark,
            ref order,
        } => {
            assert_eq!(high_water_mark, dec!(118));
            assert_eq!(order.quantity, dec!(1));
        }
        other => panic!("expected trailing stop, got {other:?}"),
    }
}

#[test]
fn test_health_and_exit_are_independent() {
    let entry_time = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
    let position =
        TradePosition::new("AMD", dec!(100), dec!(10), dec!(95), dec!(110), entry_time).unwrap();
    let now = entry_time + Duration::hours(60);

    // Down 2.5% after 60 hours with falling momentum: no exit rule fires
    let decision = ExitStrategyManager::default()
        .evaluate(&position, dec!(97.5), dec!(0.03), &no_portfolio())
        .unwrap();
    assert_eq!(decision, ExitDecision::NoExit);

    let scorer = PositionHealthScorer::default();
    let score = scorer
        .score_at(&position, dec!(97.5), dec!(-2.5), now)
        .unwrap();
    assert_eq!(score.value(), 0);
    assert!(scorer.should_close_unhealthy(score));
}

#[tokio::test]
async fn test_sized_trades_feed_performance() {
    let config = Config::default();
    let sizer = PositionSizer::new(config.sizing.clone(), Arc::new(MarketRegime::WeakBull));
    let performance =
        SharedPerformance::new(PerformanceMetrics::from_config(&config.metrics).unwrap());

    let outcomes = [dec!(1.08), dec!(0.97), dec!(1.05), dec!(1.06), dec!(0.98)];
    for (i, ratio) in outcomes.iter().enumerate() {
        let equity = performance.summary().await.current_equity;
        let entry = dec!(50);
        let shares = sizer.shares(equity, entry).unwrap();
        let exit = entry * ratio;
        let pnl = (exit - entry) * shares;

        performance
            .record_trade(TradeRecord::new(
                format!("T{i}"),
                TradeAction::Sell,
                shares,
                exit,
                pnl,
            ))
            .await;
    }

    let summary = performance.summary().await;
    assert_eq!(summary.total_trades, 5);
    assert_eq!(summary.win_rate, dec!(0.6));
    assert!(summary.current_equity > config.metrics.initial_capital);
    assert!(summary.max_drawdown > Decimal::ZERO);
    assert!(summary.max_drawdown < dec!(0.01));
    assert!(summary.profit_factor > dec!(2));
    assert!(summary.assessment >= Assessment::Good);
}
