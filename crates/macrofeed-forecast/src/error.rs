use thiserror::Error;

/// Forecast failures. These surface directly to callers; there is no
/// fallback forecast.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("series has {len} usable observations after cleaning, need at least {min}")]
    InsufficientData { len: usize, min: usize },

    #[error("horizon {requested} exceeds configured maximum {max}")]
    HorizonTooLarge { requested: usize, max: usize },

    #[error("forecast horizon must be at least one period")]
    EmptyHorizon,

    #[error("model fit failed: {reason}")]
    ModelFitFailed { reason: String },

    #[error("forecast bounds are inconsistent at step {index}")]
    InconsistentBounds { index: usize },

    #[error("unknown forecast model '{value}', expected one of trend_regression, seasonal_trend, ensemble")]
    UnknownModel { value: String },
}

impl ForecastError {
    pub fn fit_failed(reason: impl Into<String>) -> Self {
        Self::ModelFitFailed {
            reason: reason.into(),
        }
    }
}
