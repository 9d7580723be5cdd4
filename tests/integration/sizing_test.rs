//! Position sizing integration tests

use rust_decimal_macros::dec;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use trade_lifecycle::config::{Config, SizingMethod};
use trade_lifecycle::risk::{MarketRegime, PositionSizer, RiskError, SharedRegime};

#[test]
fn test_kelly_scenario_from_defaults() {
    let sizer = PositionSizer::new(
        Config::default().sizing,
        Arc::new(MarketRegime::RangeBound),
    );
    let pct = sizer
        .size_percent(SizingMethod::Kelly, dec!(0.55), dec!(2.0))
        .unwrap();
    assert_eq!(pct, dec!(0.08125));
}

#[test]
fn test_exposure_shrinks_as_regime_deteriorates() {
    let mut config = Config::default().sizing;
    config.method = SizingMethod::Volatility;
    let regime = Arc::new(SharedRegime::new(MarketRegime::StrongBull));
    let sizer = PositionSizer::new(config, regime.clone());

    let mut amounts = Vec::new();
    for next in [
        MarketRegime::StrongBull,
        MarketRegime::WeakBull,
        MarketRegime::RangeBound,
        MarketRegime::WeakBear,
        MarketRegime::StrongBear,
        MarketRegime::HighVolatility,
    ] {
        regime.set(next);
        amounts.push(sizer.position_amount(dec!(10000)).unwrap());
    }

    assert_eq!(
        amounts,
        vec![dec!(1500), dec!(800), dec!(500), dec!(200), dec!(0), dec!(0)]
    );
}

#[test]
fn test_unknown_method_in_config_sizes_fixed() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [sizing]
        method = "martingale"
        fixed_pct = 0.05
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.sizing.method, SizingMethod::Fixed);

    let sizer = PositionSizer::new(config.sizing, Arc::new(MarketRegime::StrongBull));
    // 5% of 20,000 at 25 per share
    assert_eq!(sizer.shares(dec!(20000), dec!(25)).unwrap(), dec!(40));
}

#[test]
fn test_unknown_regime_uses_weak_bear_allocation() {
    let mut config = Config::default().sizing;
    config.method = SizingMethod::Volatility;
    let regime = MarketRegime::parse_lenient("SIDEWAYS_CHOP");
    let sizer = PositionSizer::new(config, Arc::new(regime));
    assert_eq!(sizer.default_size_percent().unwrap(), dec!(0.02));
}

#[test]
fn test_preconditions_fail_fast() {
    let sizer = PositionSizer::new(Config::default().sizing, Arc::new(MarketRegime::RangeBound));
    assert_eq!(
        sizer.size_percent(SizingMethod::Kelly, dec!(0.6), dec!(0)),
        Err(RiskError::NonPositiveRiskReward(dec!(0)))
    );
    assert_eq!(
        sizer.shares(dec!(10000), dec!(-5)),
        Err(RiskError::NonPositivePrice(dec!(-5)))
    );
}
