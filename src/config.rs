//! Configuration types for trade-lifecycle
//!
//! Settings are read leniently: a missing or malformed value is logged and
//! replaced by its default, so building a `Config` never fails once the file
//! itself has been parsed.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sizing: SizingConfig,
    pub exits: ExitConfig,
    pub health: HealthConfig,
    pub metrics: MetricsConfig,
    pub telemetry: TelemetryConfig,
}

/// Sizing method for new positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizingMethod {
    #[default]
    Kelly,
    Volatility,
    Fixed,
}

impl SizingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingMethod::Kelly => "KELLY",
            SizingMethod::Volatility => "VOLATILITY",
            SizingMethod::Fixed => "FIXED",
        }
    }

    /// Parse a method name, treating anything unrecognised as `Fixed`
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "KELLY" => SizingMethod::Kelly,
            "VOLATILITY" => SizingMethod::Volatility,
            "FIXED" => SizingMethod::Fixed,
            _ => {
                tracing::warn!(method = name, "Unrecognized sizing method, using FIXED");
                SizingMethod::Fixed
            }
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Sizing method: KELLY, VOLATILITY or FIXED
    pub method: SizingMethod,
    /// Fractional Kelly multiplier
    pub kelly_fraction: Decimal,
    /// Lower bound of the Kelly band
    pub min_pct: Decimal,
    /// Upper bound of the Kelly band
    pub max_pct: Decimal,
    /// Allocation for FIXED sizing
    pub fixed_pct: Decimal,
    /// Win rate used when no trade-specific estimate exists
    pub default_win_rate: Decimal,
    /// Risk/reward used when no trade-specific estimate exists
    pub default_risk_reward: Decimal,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            method: SizingMethod::Kelly,
            kelly_fraction: dec!(0.25),
            min_pct: dec!(0.02),
            max_pct: dec!(0.20),
            fixed_pct: dec!(0.10),
            default_win_rate: dec!(0.55),
            default_risk_reward: dec!(2.0),
        }
    }
}

/// Exit rule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Partial milestones as fractions of the entry-to-target distance, ascending
    pub partial_levels: Vec<Decimal>,
    /// Share of the position closed at each milestone
    pub partial_sizes: Vec<Decimal>,
    /// Evaluate the trailing stop rule
    pub trailing_enabled: bool,
    /// Retrace from the high-water mark that triggers the trailing stop
    pub trailing_stop_pct: Decimal,
    /// Share of the position closed by the trailing stop (1.0 = full exit)
    pub trailing_exit_fraction: Decimal,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            partial_levels: vec![dec!(0.25), dec!(0.50), dec!(0.75)],
            partial_sizes: vec![dec!(0.33), dec!(0.50), dec!(0.50)],
            trailing_enabled: true,
            trailing_stop_pct: dec!(0.015),
            trailing_exit_fraction: dec!(1.0),
        }
    }
}

/// Health scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Scores below this are flagged for closing
    pub unhealthy_threshold: u8,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            unhealthy_threshold: 30,
        }
    }
}

/// Performance analytics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Annual risk-free rate used by the Sharpe ratio
    pub risk_free_rate: Decimal,
    /// Starting capital when none is given on the command line
    pub initial_capital: Decimal,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: dec!(0.04),
            initial_capital: dec!(10000),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Flattened `section.key` lookup over a TOML document
///
/// Getters coerce integers, floats and numeric strings, and return the
/// caller's default (with a warning) for anything they cannot use.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, toml::Value>,
}

impl Settings {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let table: toml::Table = toml::from_str(content)?;
        Ok(Self::from_table(table))
    }

    /// Flatten a parsed TOML table
    pub fn from_table(table: toml::Table) -> Self {
        let mut values = HashMap::new();
        flatten_into(&mut values, "", table);
        Self { values }
    }

    /// Override a single key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<toml::Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Raw value for a key
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    pub fn decimal(&self, key: &str, default: Decimal) -> Decimal {
        match self.get(key) {
            None => default,
            Some(value) => value_to_decimal(value).unwrap_or_else(|| {
                tracing::warn!(key, ?value, %default, "Invalid decimal setting, using default");
                default
            }),
        }
    }

    /// Decimal constrained to `[min, max]`
    pub fn decimal_in(&self, key: &str, default: Decimal, min: Decimal, max: Decimal) -> Decimal {
        let value = self.decimal(key, default);
        if value < min || value > max {
            tracing::warn!(key, %value, %min, %max, "Setting out of range, using default");
            return default;
        }
        value
    }

    pub fn integer(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            None => default,
            Some(toml::Value::Integer(i)) => *i,
            Some(toml::Value::String(s)) if s.trim().parse::<i64>().is_ok() => {
                s.trim().parse().unwrap_or(default)
            }
            Some(value) => {
                tracing::warn!(key, ?value, default, "Invalid integer setting, using default");
                default
            }
        }
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            None => default.to_string(),
            Some(toml::Value::String(s)) => s.clone(),
            Some(toml::Value::Integer(i)) => i.to_string(),
            Some(toml::Value::Float(f)) => f.to_string(),
            Some(toml::Value::Boolean(b)) => b.to_string(),
            Some(value) => {
                tracing::warn!(key, ?value, default, "Invalid string setting, using default");
                default.to_string()
            }
        }
    }

    pub fn boolean(&self, key: &str, default: bool) -> bool {
        let parsed = match self.get(key) {
            None => return default,
            Some(toml::Value::Boolean(b)) => Some(*b),
            Some(toml::Value::Integer(i)) => Some(*i != 0),
            Some(toml::Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
            Some(_) => None,
        };
        parsed.unwrap_or_else(|| {
            tracing::warn!(key, default, "Invalid boolean setting, using default");
            default
        })
    }

    /// List of decimals; any bad element rejects the whole list
    pub fn decimal_list(&self, key: &str, default: &[Decimal]) -> Vec<Decimal> {
        let parsed = match self.get(key) {
            None => return default.to_vec(),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(value_to_decimal)
                .collect::<Option<Vec<_>>>(),
            Some(toml::Value::String(s)) => s
                .split(',')
                .map(|part| part.trim().parse::<Decimal>().ok())
                .collect::<Option<Vec<_>>>(),
            Some(_) => None,
        };
        parsed.unwrap_or_else(|| {
            tracing::warn!(key, "Invalid decimal list setting, using default");
            default.to_vec()
        })
    }
}

fn flatten_into(values: &mut HashMap<String, toml::Value>, prefix: &str, table: toml::Table) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_into(values, &full_key, inner),
            other => {
                values.insert(full_key, other);
            }
        }
    }
}

fn value_to_decimal(value: &toml::Value) -> Option<Decimal> {
    match value {
        toml::Value::Integer(i) => Some(Decimal::from(*i)),
        toml::Value::Float(f) => Decimal::try_from(*f).ok(),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl SizingConfig {
    fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        let method =
            SizingMethod::parse_lenient(&settings.string("sizing.method", d.method.as_str()));

        let mut min_pct = settings.decimal_in("sizing.min_pct", d.min_pct, dec!(0), dec!(1));
        let mut max_pct = settings.decimal_in("sizing.max_pct", d.max_pct, dec!(0), dec!(1));
        if min_pct > max_pct {
            tracing::warn!(%min_pct, %max_pct, "Sizing band inverted, using default band");
            min_pct = d.min_pct;
            max_pct = d.max_pct;
        }

        Self {
            method,
            kelly_fraction: settings.decimal_in(
                "sizing.kelly_fraction",
                d.kelly_fraction,
                dec!(0),
                dec!(1),
            ),
            min_pct,
            max_pct,
            fixed_pct: settings.decimal_in("sizing.fixed_pct", d.fixed_pct, dec!(0), dec!(1)),
            default_win_rate: settings.decimal_in(
                "sizing.default_win_rate",
                d.default_win_rate,
                dec!(0),
                dec!(1),
            ),
            default_risk_reward: {
                let rr = settings.decimal("sizing.default_risk_reward", d.default_risk_reward);
                if rr > dec!(0) {
                    rr
                } else {
                    tracing::warn!(%rr, "Default risk/reward must be positive, using default");
                    d.default_risk_reward
                }
            },
        }
    }
}

impl ExitConfig {
    fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        let levels = settings.decimal_list("exits.partial_levels", &d.partial_levels);
        let sizes = settings.decimal_list("exits.partial_sizes", &d.partial_sizes);
        let (partial_levels, partial_sizes) = if milestones_valid(&levels, &sizes) {
            (levels, sizes)
        } else {
            tracing::warn!(?levels, ?sizes, "Invalid partial exit milestones, using defaults");
            (d.partial_levels, d.partial_sizes)
        };

        let trailing_exit_fraction = {
            let f = settings.decimal("exits.trailing_exit_fraction", d.trailing_exit_fraction);
            if f > dec!(0) && f <= dec!(1) {
                f
            } else {
                tracing::warn!(%f, "Trailing exit fraction out of range, using default");
                d.trailing_exit_fraction
            }
        };

        Self {
            partial_levels,
            partial_sizes,
            trailing_enabled: settings.boolean("exits.trailing_enabled", d.trailing_enabled),
            trailing_stop_pct: settings.decimal_in(
                "exits.trailing_stop_pct",
                d.trailing_stop_pct,
                dec!(0),
                dec!(1),
            ),
            trailing_exit_fraction,
        }
    }
}

/// Levels strictly ascending inside (0, 1), sizes inside (0, 1), equal lengths
fn milestones_valid(levels: &[Decimal], sizes: &[Decimal]) -> bool {
    let in_unit = |v: &Decimal| *v > dec!(0) && *v < dec!(1);
    levels.len() == sizes.len()
        && levels.iter().all(in_unit)
        && sizes.iter().all(in_unit)
        && levels.windows(2).all(|w| w[0] < w[1])
}

impl HealthConfig {
    fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        let threshold =
            settings.integer("health.unhealthy_threshold", i64::from(d.unhealthy_threshold));
        let unhealthy_threshold = u8::try_from(threshold)
            .ok()
            .filter(|t| *t <= 100)
            .unwrap_or_else(|| {
                tracing::warn!(threshold, "Health threshold out of range, using default");
                d.unhealthy_threshold
            });
        Self { unhealthy_threshold }
    }
}

impl MetricsConfig {
    fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        let initial_capital = settings.decimal("metrics.initial_capital", d.initial_capital);
        Self {
            risk_free_rate: settings.decimal_in(
                "metrics.risk_free_rate",
                d.risk_free_rate,
                dec!(0),
                dec!(1),
            ),
            initial_capital: if initial_capital > dec!(0) {
                initial_capital
            } else {
                tracing::warn!(%initial_capital, "Initial capital must be positive, using default");
                d.initial_capital
            },
        }
    }
}

impl TelemetryConfig {
    fn from_settings(settings: &Settings) -> Self {
        let d = Self::default();
        let log_format = match settings
            .string("telemetry.log_format", "pretty")
            .to_ascii_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                tracing::warn!(format = other, "Unknown log format, using pretty");
                d.log_format
            }
        };
        Self {
            log_level: settings.string("telemetry.log_level", &d.log_level),
            log_format,
        }
    }
}

impl Config {
    /// Build a configuration, substituting defaults for anything unusable
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sizing: SizingConfig::from_settings(settings),
            exits: ExitConfig::from_settings(settings),
            health: HealthConfig::from_settings(settings),
            metrics: MetricsConfig::from_settings(settings),
            telemetry: TelemetryConfig::from_settings(settings),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Settings::from_toml_str(&content)?;
        Ok(Self::from_settings(&settings))
    }
}
