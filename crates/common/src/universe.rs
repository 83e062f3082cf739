use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{Error, Result, Ticker};

/// Universe definitions file (TOML).
///
/// Example `config/universes.toml`:
/// ```toml
/// [[universe]]
/// name = "Nifty Bank"
/// tickers = ["HDFCBANK.NS", "ICICIBANK.NS", "SBIN.NS"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniverseFileConfig {
    #[serde(rename = "universe", default)]
    pub universes: Vec<UniverseConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UniverseConfig {
    pub name: String,
    pub tickers: Vec<String>,
}

impl UniverseFileConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read universe config '{path}': {e}")))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse universe config '{path}': {e}")))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// A named, ordered set of tickers.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    name: String,
    tickers: Vec<Ticker>,
}

impl Universe {
    pub fn new<I, S>(name: impl Into<String>, listings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tickers: Vec<Ticker> = Vec::new();
        for listing in listings {
            let ticker = Ticker::new(listing);
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Self {
            name: name.into(),
            tickers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tickers(&self) -> &[Ticker] {
        &self.tickers
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Read-only lookup of universes by exact name.
#[derive(Debug, Default)]
pub struct UniverseRegistry {
    universes: Vec<Arc<Universe>>,
    by_name: HashMap<String, usize>,
}

impl UniverseRegistry {
    pub fn new(universes: Vec<Universe>) -> Result<Self> {
        let mut registry = Self::default();
        for universe in universes {
            if registry.by_name.contains_key(universe.name()) {
                return Err(Error::Config(format!(
                    "duplicate universe name '{}'",
                    universe.name()
                )));
            }
            if universe.is_empty() {
                warn!(universe = %universe.name(), "Universe has no tickers");
            }
            info!(name = %universe.name(), tickers = universe.len(), "Registered universe");
            registry
                .by_name
                .insert(universe.name().to_string(), registry.universes.len());
            registry.universes.push(Arc::new(universe));
        }
        Ok(registry)
    }

    pub fn from_config(file_cfg: &UniverseFileConfig) -> Result<Self> {
        Self::new(
            file_cfg
                .universes
                .iter()
                .map(|u| Universe::new(u.name.clone(), u.tickers.iter().cloned()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Result<Arc<Universe>> {
        self.by_name
            .get(name)
            .map(|&i| self.universes[i].clone())
            .ok_or_else(|| Error::UnknownUniverse(name.to_string()))
    }

    /// Universes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Universe>> {
        self.universes.iter()
    }

    pub fn len(&self) -> usize {
        self.universes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universes.is_empty()
    }
}
