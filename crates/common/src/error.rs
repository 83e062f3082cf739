use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown universe: {0}")]
    UnknownUniverse(String),

    #[error("Insufficient data: need {required} values, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid indicator parameter: {0}")]
    InvalidParameter(String),

    #[error("Malformed price series: {0}")]
    MalformedSeries(String),

    #[error("No data for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("Timed out fetching {ticker}")]
    Timeout { ticker: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn data_unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    /// Errors that reject the whole request rather than a single ticker.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownStrategy(_) | Error::UnknownUniverse(_) | Error::Config(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
