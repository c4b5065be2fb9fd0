use thiserror::Error;

/// Validation and contract errors exposed by `macrofeed-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("region code cannot be empty")]
    EmptyRegion,
    #[error("region code length {len} exceeds max {max}")]
    RegionTooLong { len: usize, max: usize },
    #[error("region code contains invalid character '{ch}' at index {index}")]
    RegionInvalidChar { ch: char, index: usize },

    #[error("invalid indicator '{value}', expected one of inflation_rate, consumer_price_index, exchange_rate, cost_of_living, unemployment_rate, gdp_per_capita")]
    InvalidIndicator { value: String },
    #[error("invalid resolution '{value}', expected one of daily, monthly, quarterly, annual")]
    InvalidResolution { value: String },
    #[error("invalid freshness policy '{value}', expected one of must-be-fresh, allow-stale, estimate-ok")]
    InvalidFreshnessPolicy { value: String },
    #[error("invalid provider '{value}', expected one of world_bank, fred, open_exchange, numbeo")]
    InvalidProvider { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("time range start {start} is after end {end}")]
    ReversedTimeRange { start: String, end: String },

    #[error("observation at {date} is out of order")]
    ObservationOutOfOrder { date: String },
    #[error("duplicate observation at {date}")]
    DuplicateObservation { date: String },

    #[error("cannot combine series for different (indicator, region, resolution) contexts")]
    SeriesContextMismatch,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
