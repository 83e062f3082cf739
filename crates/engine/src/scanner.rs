use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use common::{
    Config, Error, MatchResult, PriceDataGateway, Result, ScanEvent, ScanOutcome, Ticker,
    TickerFailure, Universe, UniverseRegistry,
};
use strategy::{Strategy, StrategyRegistry};

use crate::pacer::SubmitPacer;

/// Scheduling knobs for a scan.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Maximum number of tickers in flight at once.
    pub max_workers: usize,
    /// Per-ticker limit on a single gateway call.
    pub fetch_timeout: Duration,
    /// Minimum spacing between consecutive gateway request starts.
    pub submit_stagger: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            max_workers: 20,
            fetch_timeout: Duration::from_secs(5),
            submit_stagger: Duration::from_millis(45),
        }
    }
}

impl ScanSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_workers: config.max_workers.max(1),
            fetch_timeout: config.fetch_timeout,
            submit_stagger: config.submit_stagger,
        }
    }
}

/// Runs one strategy over one universe against the price gateway.
///
/// Registries and the gateway are shared read-only; a scan keeps its own
/// transient state and nothing survives it.
pub struct Scanner {
    strategies: Arc<StrategyRegistry>,
    universes: Arc<UniverseRegistry>,
    gateway: Arc<dyn PriceDataGateway>,
    pacer: Arc<SubmitPacer>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        strategies: Arc<StrategyRegistry>,
        universes: Arc<UniverseRegistry>,
        gateway: Arc<dyn PriceDataGateway>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            pacer: Arc::new(SubmitPacer::new(settings.submit_stagger)),
            strategies,
            universes,
            gateway,
            settings,
        }
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn universes(&self) -> &UniverseRegistry {
        &self.universes
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Resolve both names up front; either failing rejects the request.
    fn job(&self, strategy_name: &str, universe_name: &str) -> Result<ScanJob> {
        let strategy = self.strategies.get(strategy_name)?;
        let universe = self.universes.get(universe_name)?;
        Ok(ScanJob {
            strategy,
            universe,
            gateway: Arc::clone(&self.gateway),
            pacer: Arc::clone(&self.pacer),
            fetch_timeout: self.settings.fetch_timeout,
        })
    }

    /// Scan every ticker of `universe_name` with `strategy_name`.
    ///
    /// Results come back in universe order. Per-ticker failures are recorded
    /// in `failures` and never fail the scan; only unknown names do.
    pub async fn run_scan(
        &self,
        strategy_name: &str,
        universe_name: &str,
    ) -> Result<ScanOutcome> {
        let job = self.job(strategy_name, universe_name)?;
        let started = Instant::now();
        info!(
            strategy = %strategy_name,
            universe = %universe_name,
            tickers = job.universe.len(),
            workers = self.settings.max_workers,
            stagger_ms = self.settings.submit_stagger.as_millis() as u64,
            "Scan started"
        );

        let job = Arc::new(job);
        let outcomes: Vec<TickerOutcome> = stream::iter(job.universe.tickers().to_vec())
            .map(|ticker| {
                let job = Arc::clone(&job);
                async move { job.scan_ticker(&ticker).await }
            })
            .buffered(self.settings.max_workers.max(1))
            .collect()
            .await;

        let mut outcome = ScanOutcome {
            strategy: strategy_name.to_string(),
            universe: universe_name.to_string(),
            total_scanned: 0,
            matches: 0,
            results: Vec::new(),
            failures: Vec::new(),
        };
        for ticker_outcome in outcomes {
            match ticker_outcome {
                TickerOutcome::Scanned(result) => {
                    outcome.total_scanned += 1;
                    outcome.results.extend(result);
                }
                TickerOutcome::Failed(failure) => outcome.failures.push(failure),
            }
        }
        outcome.matches = outcome.results.len();

        info!(
            strategy = %strategy_name,
            universe = %universe_name,
            scanned = outcome.total_scanned,
            matches = outcome.matches,
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan complete"
        );
        Ok(outcome)
    }

    /// Start a scan in the background and stream its events.
    ///
    /// Names are resolved before anything is spawned. Events arrive in
    /// completion order and end with `ScanEvent::Done`. Dropping the
    /// receiver cancels the remaining tickers.
    pub fn scan_stream(
        &self,
        strategy_name: &str,
        universe_name: &str,
    ) -> Result<mpsc::Receiver<ScanEvent>> {
        let job = self.job(strategy_name, universe_name)?;
        let workers = self.settings.max_workers.max(1);
        let (tx, rx) = mpsc::channel(workers * 2);
        let strategy_name = strategy_name.to_string();
        let universe_name = universe_name.to_string();

        tokio::spawn(async move {
            let started = Instant::now();
            let total = job.universe.len();
            info!(
                strategy = %strategy_name,
                universe = %universe_name,
                tickers = total,
                workers,
                "Streaming scan started"
            );

            let job = Arc::new(job);
            let mut pending = stream::iter(job.universe.tickers().to_vec())
                .map(|ticker| {
                    let job = Arc::clone(&job);
                    async move {
                        let outcome = job.scan_ticker(&ticker).await;
                        (ticker, outcome)
                    }
                })
                .buffer_unordered(workers);

            let (mut completed, mut scanned, mut matches) = (0, 0, 0);
            while let Some((ticker, outcome)) = pending.next().await {
                completed += 1;
                let event = match outcome {
                    TickerOutcome::Scanned(Some(result)) => {
                        scanned += 1;
                        matches += 1;
                        ScanEvent::Match {
                            completed,
                            total,
                            result,
                        }
                    }
                    TickerOutcome::Scanned(None) => {
                        scanned += 1;
                        progress(completed, total, &ticker)
                    }
                    TickerOutcome::Failed(_) => progress(completed, total, &ticker),
                };
                if tx.send(event).await.is_err() {
                    info!(
                        strategy = %strategy_name,
                        completed,
                        total,
                        "Scan receiver dropped, cancelling"
                    );
                    return;
                }
            }

            let _ = tx
                .send(ScanEvent::Done {
                    total_scanned: scanned,
                    matches,
                })
                .await;
            info!(
                strategy = %strategy_name,
                universe = %universe_name,
                scanned,
                matches,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Streaming scan complete"
            );
        });

        Ok(rx)
    }
}

fn progress(completed: usize, total: usize, ticker: &Ticker) -> ScanEvent {
    ScanEvent::Progress {
        completed,
        total,
        symbol: ticker.symbol().to_string(),
    }
}

enum TickerOutcome {
    /// History retrieved and evaluated; `Some` on a match.
    Scanned(Option<MatchResult>),
    Failed(TickerFailure),
}

/// Everything one scan needs, resolved and owned.
struct ScanJob {
    strategy: Arc<dyn Strategy>,
    universe: Arc<Universe>,
    gateway: Arc<dyn PriceDataGateway>,
    pacer: Arc<SubmitPacer>,
    fetch_timeout: Duration,
}

impl ScanJob {
    async fn scan_ticker(&self, ticker: &Ticker) -> TickerOutcome {
        match self.fetch_and_evaluate(ticker).await {
            Ok(result) => TickerOutcome::Scanned(result),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Ticker skipped");
                TickerOutcome::Failed(TickerFailure {
                    ticker: ticker.symbol().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn fetch_and_evaluate(&self, ticker: &Ticker) -> Result<Option<MatchResult>> {
        self.pacer.wait().await;

        let fetch = self
            .gateway
            .fetch_history(ticker, self.strategy.lookback_days());
        let series = tokio::time::timeout(self.fetch_timeout, fetch)
            .await
            .map_err(|_| Error::Timeout {
                ticker: ticker.to_string(),
            })??;

        if series.is_empty() {
            return Err(Error::data_unavailable(ticker.to_string(), "empty series"));
        }

        debug!(ticker = %ticker, bars = series.len(), "Evaluating");
        self.strategy.evaluate(ticker, &series)
    }
}
