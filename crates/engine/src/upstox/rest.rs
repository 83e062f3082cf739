use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use common::{Bar, Error, PriceDataGateway, PriceSeries, Result, Ticker};

use super::InstrumentMaster;

pub const DEFAULT_BASE_URL: &str = "https://api.upstox.com/v2";

/// Status codes worth another attempt.
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Upstox API v2 client for daily historical candles.
///
/// One pooled HTTP client is shared by every concurrent scan task.
pub struct UpstoxClient {
    access_token: String,
    base_url: String,
    http: Client,
    instruments: Arc<InstrumentMaster>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl UpstoxClient {
    pub fn new(access_token: impl Into<String>, instruments: InstrumentMaster) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(20)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
            instruments: Arc::new(instruments),
            max_retries: 3,
            retry_backoff: Duration::from_millis(300),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff = backoff;
        self
    }

    fn candle_url(&self, instrument_key: &str, to: NaiveDate, from: NaiveDate) -> String {
        let key: String = url::form_urlencoded::byte_serialize(instrument_key.as_bytes()).collect();
        format!(
            "{}/historical-candle/{key}/day/{}/{}",
            self.base_url,
            to.format("%Y-%m-%d"),
            from.format("%Y-%m-%d")
        )
    }

    /// GET with bearer auth, retrying transient server errors with
    /// exponential backoff.
    async fn get_with_retry(&self, ticker: &Ticker, url: &str) -> Result<String> {
        let mut backoff = self.retry_backoff;
        let mut attempt = 0;

        loop {
            let resp = self
                .http
                .get(url)
                .bearer_auth(&self.access_token)
                .header("Accept", "application/json")
                .send()
                .await
                .map_err(|e| Error::data_unavailable(ticker.symbol(), e.to_string()))?;

            let status = resp.status();
            if RETRY_STATUSES.contains(&status) && attempt < self.max_retries {
                attempt += 1;
                warn!(
                    ticker = %ticker,
                    status = %status,
                    attempt,
                    backoff = ?backoff,
                    "Upstox server error, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(Error::data_unavailable(
                    ticker.symbol(),
                    "Upstox token rejected; refresh UPSTOX_ACCESS_TOKEN",
                ));
            }

            let body = resp
                .text()
                .await
                .map_err(|e| Error::data_unavailable(ticker.symbol(), e.to_string()))?;
            if !status.is_success() {
                return Err(Error::data_unavailable(
                    ticker.symbol(),
                    format!("HTTP {status}: {body}"),
                ));
            }
            return Ok(body);
        }
    }
}

#[async_trait]
impl PriceDataGateway for UpstoxClient {
    async fn fetch_history(&self, ticker: &Ticker, lookback_days: u32) -> Result<PriceSeries> {
        let key = self.instruments.resolve(ticker.symbol()).ok_or_else(|| {
            Error::data_unavailable(ticker.symbol(), "not found in Upstox instrument master")
        })?;

        let to = Utc::now().date_naive();
        let from = to - chrono::Duration::days(i64::from(lookback_days));
        let url = self.candle_url(key, to, from);

        debug!(ticker = %ticker, instrument_key = key, %from, %to, "Fetching daily candles");
        let body = self.get_with_retry(ticker, &url).await?;
        let series = parse_candles(ticker.symbol(), &body)?;
        debug!(ticker = %ticker, bars = series.len(), "Received candles");
        Ok(series)
    }

    fn name(&self) -> &str {
        "upstox"
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CandleResponse {
    #[serde(default)]
    data: Option<CandleData>,
}

#[derive(Deserialize)]
struct CandleData {
    #[serde(default)]
    candles: Vec<Vec<Value>>,
}

/// Parse `data.candles` rows of `[timestamp, open, high, low, close, volume, oi]`.
///
/// Rows arrive newest first; unparsable rows are dropped.
fn parse_candles(symbol: &str, body: &str) -> Result<PriceSeries> {
    let resp: CandleResponse = serde_json::from_str(body)
        .map_err(|e| Error::data_unavailable(symbol, format!("bad candle payload: {e}")))?;
    let rows = resp.data.map(|d| d.candles).unwrap_or_default();

    let bars: Vec<Bar> = rows.iter().filter_map(|row| parse_row(row)).collect();
    if bars.is_empty() {
        return Err(Error::data_unavailable(symbol, "no candles returned"));
    }
    if bars.len() < rows.len() {
        debug!(symbol, dropped = rows.len() - bars.len(), "Dropped unparsable candles");
    }
    PriceSeries::from_unsorted(bars)
}

fn parse_row(row: &[Value]) -> Option<Bar> {
    let timestamp = DateTime::parse_from_rfc3339(row.first()?.as_str()?)
        .ok()?
        .with_timezone(&Utc);
    let num = |i: usize| -> Option<f64> {
        let value = row.get(i)?;
        value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
    };
    Some(Bar {
        timestamp,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        volume: num(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UpstoxClient {
        UpstoxClient::new("token", InstrumentMaster::default())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v2/")
    }

    #[test]
    fn candle_url_encodes_instrument_key() {
        let to = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(
            client().candle_url("NSE_EQ|INE002A01018", to, from),
            "http://127.0.0.1:9/v2/historical-candle/NSE_EQ%7CINE002A01018/day/2024-06-28/2024-01-01"
        );
    }

    #[test]
    fn parses_newest_first_rows_into_ascending_series() {
        let body = r#"{
            "status": "success",
            "data": {
                "candles": [
                    ["2024-01-03T00:00:00+05:30", 102.0, 104.0, 101.0, 103.5, 12000, 0],
                    ["2024-01-02T00:00:00+05:30", 100.0, 102.5, 99.5, 102.0, 9000, 0],
                    ["2024-01-01T00:00:00+05:30", 99.0, 100.5, 98.0, 100.0, 8000, 0]
                ]
            }
        }"#;
        let series = parse_candles("RELIANCE", body).unwrap();
        assert_eq!(series.closes(), vec![100.0, 102.0, 103.5]);
        assert_eq!(series.volumes(), vec![8000.0, 9000.0, 12000.0]);
        assert_eq!(series.change_pct(), Some(1.47));
    }

    #[test]
    fn drops_bad_rows_and_duplicates() {
        let body = r#"{"data": {"candles": [
            ["2024-01-02T00:00:00+05:30", 1.0, 1.0, 1.0, 2.0, 10, 0],
            ["not-a-date", 1.0, 1.0, 1.0, 1.0, 10, 0],
            ["2024-01-01T00:00:00+05:30", 1.0, 1.0, 1.0, null, 10, 0],
            ["2024-01-02T00:00:00+05:30", 1.0, 1.0, 1.0, 2.5, 10, 0],
            ["2024-01-01T00:00:00+05:30", "1.0", "1.0", "1.0", "1.5", "10", 0]
        ]}}"#;
        let series = parse_candles("X", body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes()[0], 1.5);
    }

    #[test]
    fn empty_candles_are_data_unavailable() {
        let err = parse_candles("X", r#"{"status":"success","data":{"candles":[]}}"#).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable { .. }));
        let err = parse_candles("X", r#"{"status":"error"}"#).unwrap_err();
        assert!(matches!(err, Error::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn unknown_symbol_fails_before_any_request() {
        let err = client()
            .fetch_history(&Ticker::new("NOSUCHCO.NS"), 180)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("instrument master"));
    }

    #[tokio::test]
    async fn connection_failure_is_data_unavailable() {
        let master = InstrumentMaster::from_reader(
            "instrument_key,tradingsymbol,instrument_type\nNSE_EQ|X,ABC,EQUITY\n".as_bytes(),
        )
        .unwrap();
        let client = UpstoxClient::new("token", master)
            .unwrap()
            .with_base_url("http://127.0.0.1:9")
            .with_retry(0, Duration::ZERO);
        let err = client.fetch_history(&Ticker::new("ABC"), 30).await.unwrap_err();
        assert!(matches!(err, Error::DataUnavailable { .. }));
    }
}
