use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Top-level strategy config file (TOML).
///
/// Every built-in strategy is registered with its defaults; a `[[strategy]]`
/// entry overrides the parameters of one of them, or disables it.
///
/// Example `config/strategies.toml`:
/// ```toml
/// [[strategy]]
/// type = "rsi_oversold"
///
/// [strategy.params]
/// period = 14
/// threshold = 30.0
///
/// [[strategy]]
/// type = "volume_surge"
/// enabled = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StrategyFileConfig {
    #[serde(rename = "strategy", default)]
    pub strategies: Vec<StrategyConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyConfig {
    /// Strategy type identifier, e.g. "rsi_oversold" or "golden_cross".
    #[serde(rename = "type")]
    pub strategy_type: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Strategy-specific parameters. Omitted keys keep their defaults.
    #[serde(default)]
    pub params: toml::Table,
}

fn enabled_by_default() -> bool {
    true
}

impl StrategyConfig {
    /// Deserialize `params` into a strategy's parameter struct.
    pub fn params<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        toml::Value::Table(self.params.clone())
            .try_into()
            .map_err(|e| {
                Error::Config(format!(
                    "invalid params for strategy '{}': {e}",
                    self.strategy_type
                ))
            })
    }
}

impl StrategyFileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read strategy config at '{path}': {e}"))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("strategy config at '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
