//! Provider adapter contract and request/error types.
//!
//! Every upstream data source implements [`IndicatorSource`]: one
//! normalization boundary per provider, translating vendor quirks (error
//! codes, payload shapes, missing-value markers) into the canonical
//! [`Series`] shape and the fixed [`SourceErrorKind`] taxonomy. Adapters
//! never retry; retry and backoff policy belong to the orchestrator.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Indicator, ProviderId, Region, Resolution, Series, TimeRange, ValidationError};

/// Parameters of one series fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub indicator: Indicator,
    pub region: Region,
    pub range: TimeRange,
    pub resolution: Resolution,
}

impl SeriesRequest {
    pub fn new(
        indicator: Indicator,
        region: Region,
        range: TimeRange,
        resolution: Resolution,
    ) -> Self {
        Self {
            indicator,
            region,
            range,
            resolution,
        }
    }
}

/// Adapter-level error classification.
///
/// `RateLimited`, `Unavailable`, and `Schema` are the three upstream
/// failure modes; `Unsupported` and `InvalidRequest` are pre-flight
/// rejections that never reach the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    RateLimited,
    Unavailable,
    Schema,
    Unsupported,
    InvalidRequest,
}

/// Structured source error consumed by the orchestrator's fallback logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Schema,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unsupported(provider: ProviderId, indicator: Indicator) -> Self {
        Self {
            kind: SourceErrorKind::Unsupported,
            message: format!("indicator '{indicator}' is not served by '{provider}'"),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Schema => "source.schema",
            SourceErrorKind::Unsupported => "source.unsupported",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        // Upstream payloads that fail domain validation are schema drift.
        Self::schema(error.to_string())
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync` and safely callable concurrently
/// for different `(indicator, region)` pairs; the only side effect is the
/// network call itself.
pub trait IndicatorSource: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Whether this source serves the given indicator.
    fn supports(&self, indicator: Indicator) -> bool;

    /// Fetch one normalized series.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] with kind `RateLimited` (HTTP 429 or local
    /// quota exhausted), `Unavailable` (5xx, timeout, transport failure),
    /// or `Schema` (malformed or drifted payload).
    fn series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>>;
}
