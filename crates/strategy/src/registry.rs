use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use common::{Error, Result};

use crate::config::{StrategyConfig, StrategyFileConfig};
use crate::strategies::{
    Breakout, BreakoutParams, EmaPullback, EmaPullbackParams, GoldenCross, GoldenCrossParams,
    MacdCrossover, MacdCrossoverParams, RsiOversold, RsiOversoldParams, VolumeSurge,
    VolumeSurgeParams,
};
use crate::Strategy;

/// Config `type` keys of the built-in strategies, in registration order.
pub const STRATEGY_TYPES: [&str; 6] = [
    "rsi_oversold",
    "macd_crossover",
    "golden_cross",
    "breakout",
    "volume_surge",
    "ema_pullback",
];

/// Name and description of a registered strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyInfo {
    pub name: String,
    pub description: String,
}

/// Read-only lookup of strategy instances by name.
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn Strategy>>,
    by_name: HashMap<String, usize>,
}

impl StrategyRegistry {
    /// All built-in strategies with default parameters.
    pub fn with_defaults() -> Result<Self> {
        Self::from_config(&StrategyFileConfig::default())
    }

    /// Built-in strategies with overrides from the config file applied.
    ///
    /// Unknown or repeated `type` keys are configuration errors.
    pub fn from_config(file_cfg: &StrategyFileConfig) -> Result<Self> {
        let mut overrides: HashMap<&str, &StrategyConfig> = HashMap::new();
        for cfg in &file_cfg.strategies {
            if !STRATEGY_TYPES.contains(&cfg.strategy_type.as_str()) {
                return Err(Error::Config(format!(
                    "unknown strategy type '{}'",
                    cfg.strategy_type
                )));
            }
            if overrides.insert(cfg.strategy_type.as_str(), cfg).is_some() {
                return Err(Error::Config(format!(
                    "strategy type '{}' configured more than once",
                    cfg.strategy_type
                )));
            }
        }

        let mut registry = Self {
            strategies: Vec::new(),
            by_name: HashMap::new(),
        };
        for strategy_type in STRATEGY_TYPES {
            let cfg = overrides.get(strategy_type).copied();
            if cfg.is_some_and(|c| !c.enabled) {
                info!(strategy_type, "Strategy disabled by config");
                continue;
            }
            let strategy = build_strategy(strategy_type, cfg)?;
            info!(
                name = %strategy.name(),
                min_lookback = strategy.min_lookback(),
                lookback_days = strategy.lookback_days(),
                "Registered strategy"
            );
            registry.register(strategy)?;
        }
        Ok(registry)
    }

    fn register(&mut self, strategy: Arc<dyn Strategy>) -> Result<()> {
        let name = strategy.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(Error::Config(format!("duplicate strategy name '{name}'")));
        }
        self.by_name.insert(name, self.strategies.len());
        self.strategies.push(strategy);
        Ok(())
    }

    /// Look up a strategy by its exact name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Strategy>> {
        self.by_name
            .get(name)
            .map(|&i| Arc::clone(&self.strategies[i]))
            .ok_or_else(|| Error::UnknownStrategy(name.to_string()))
    }

    pub fn list(&self) -> Vec<StrategyInfo> {
        self.strategies
            .iter()
            .map(|s| StrategyInfo {
                name: s.name().to_string(),
                description: s.description().to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

// ─── Strategy builders ────────────────────────────────────────────────────────

fn build_strategy(strategy_type: &str, cfg: Option<&StrategyConfig>) -> Result<Arc<dyn Strategy>> {
    match strategy_type {
        "rsi_oversold" => Ok(Arc::new(RsiOversold::new(params::<RsiOversoldParams>(cfg)?)?)),
        "macd_crossover" => Ok(Arc::new(MacdCrossover::new(params::<MacdCrossoverParams>(
            cfg,
        )?)?)),
        "golden_cross" => Ok(Arc::new(GoldenCross::new(params::<GoldenCrossParams>(cfg)?)?)),
        "breakout" => Ok(Arc::new(Breakout::new(params::<BreakoutParams>(cfg)?)?)),
        "volume_surge" => Ok(Arc::new(VolumeSurge::new(params::<VolumeSurgeParams>(cfg)?)?)),
        "ema_pullback" => Ok(Arc::new(EmaPullback::new(params::<EmaPullbackParams>(cfg)?)?)),
        other => Err(Error::Config(format!("unknown strategy type '{other}'"))),
    }
}

fn params<T>(cfg: Option<&StrategyConfig>) -> Result<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    match cfg {
        Some(cfg) => cfg.params(),
        None => Ok(T::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_all_six_in_order() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let names: Vec<String> = registry.list().into_iter().map(|i| i.name).collect();
        assert_eq!(
            names,
            [
                "RSI Oversold",
                "MACD Bullish Crossover",
                "Golden Cross (50/200 SMA)",
                "52-Week High Breakout",
                "Volume Surge",
                "EMA Pullback (Trend Dip)",
            ]
        );
    }

    #[test]
    fn lookup_by_exact_name() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        let s = registry.get("Volume Surge").unwrap();
        assert_eq!(s.min_lookback(), 25);
        assert_eq!(s.lookback_days(), 180);
        assert!(registry.get("volume surge").is_err());
    }

    #[test]
    fn unknown_name_is_unknown_strategy() {
        let registry = StrategyRegistry::with_defaults().unwrap();
        match registry.get("Not A Strategy") {
            Err(Error::UnknownStrategy(name)) => assert_eq!(name, "Not A Strategy"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected UnknownStrategy"),
        }
    }

    #[test]
    fn config_overrides_and_disables() {
        let cfg = StrategyFileConfig::parse(
            r#"
            [[strategy]]
            type = "golden_cross"
            params = { min_lookback = 250 }

            [[strategy]]
            type = "ema_pullback"
            enabled = false
            "#,
        )
        .unwrap();
        let registry = StrategyRegistry::from_config(&cfg).unwrap();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.get("Golden Cross (50/200 SMA)").unwrap().min_lookback(),
            250
        );
        assert!(registry.get("EMA Pullback (Trend Dip)").is_err());
    }

    #[test]
    fn unknown_type_is_config_error() {
        let cfg = StrategyFileConfig::parse("[[strategy]]\ntype = \"everest\"\n").unwrap();
        let err = StrategyRegistry::from_config(&cfg).err().unwrap();
        assert!(err.is_config_error());
    }

    #[test]
    fn repeated_type_is_config_error() {
        let cfg = StrategyFileConfig::parse(
            "[[strategy]]\ntype = \"breakout\"\n[[strategy]]\ntype = \"breakout\"\n",
        )
        .unwrap();
        assert!(StrategyRegistry::from_config(&cfg).is_err());
    }

    #[test]
    fn descriptions_follow_overridden_params() {
        let cfg = StrategyFileConfig::parse(
            r#"
            [[strategy]]
            type = "rsi_oversold"
            params = { period = 10, threshold = 30.0 }

            [[strategy]]
            type = "macd_crossover"
            params = { crossover_window = 5 }
            "#,
        )
        .unwrap();
        let registry = StrategyRegistry::from_config(&cfg).unwrap();
        let rsi = registry.get("RSI Oversold").unwrap();
        assert!(rsi.description().contains("RSI(10) has dropped below 30:"));
        let macd = registry.get("MACD Bullish Crossover").unwrap();
        assert!(macd.description().contains("in the last 5 sessions"));

        let defaults = StrategyRegistry::with_defaults().unwrap();
        let rsi = defaults.get("RSI Oversold").unwrap();
        assert!(rsi.description().contains("RSI(14) has dropped below 35:"));
    }

    #[test]
    fn misspelled_param_is_config_error() {
        let cfg = StrategyFileConfig::parse(
            "[[strategy]]\ntype = \"rsi_oversold\"\nparams = { treshold = 30.0 }\n",
        )
        .unwrap();
        let err = StrategyRegistry::from_config(&cfg).err().unwrap();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("treshold"));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let cfg = StrategyFileConfig::parse(
            "[[strategy]]\ntype = \"macd_crossover\"\nparams = { fast = 30, slow = 10 }\n",
        )
        .unwrap();
        assert!(StrategyRegistry::from_config(&cfg).is_err());
    }
}
