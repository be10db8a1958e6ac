use chrono::NaiveDate;

/// Result alias that carries the custom [`SunMatrixError`] type.
pub type Result<T> = std::result::Result<T, SunMatrixError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum SunMatrixError {
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Transport level failure while talking to the light-event service.
    #[error("light event request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The response body was not the JSON document we expected.
    #[error("malformed light event response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field} timestamp `{value}`: {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid day length `{0}`, expected H:MM:SS")]
    InvalidDayLength(String),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The provider answered but had no light events for the date.
    #[error("no light event data available for {date}")]
    MissingData { date: NaiveDate },
}
