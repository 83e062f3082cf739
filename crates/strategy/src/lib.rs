pub mod config;
pub mod indicators;
pub mod registry;
pub mod strategies;

pub use config::{StrategyConfig, StrategyFileConfig};
pub use registry::{StrategyInfo, StrategyRegistry};

use common::{MatchResult, PriceSeries, Result, Ticker};

/// All strategy implementations must satisfy this trait.
///
/// Strategies are pure: `evaluate` sees only the series it is handed, keeps no
/// state between calls and never performs I/O.
pub trait Strategy: Send + Sync {
    /// Unique, human-readable name used for lookup.
    fn name(&self) -> &str;

    /// One-line description shown to users.
    fn description(&self) -> &str;

    /// Fewest bars the predicate can be evaluated on.
    fn min_lookback(&self) -> usize;

    /// Calendar days of history to request from the data gateway.
    fn lookback_days(&self) -> u32;

    /// Evaluate the predicate on the latest bar.
    ///
    /// Returns `Ok(None)` when the setup is absent or the series is shorter
    /// than `min_lookback`. Errors are indicator failures on malformed input.
    fn evaluate(&self, ticker: &Ticker, series: &PriceSeries) -> Result<Option<MatchResult>>;
}
