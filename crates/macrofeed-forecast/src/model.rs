//! Forecast strategy interface and result envelope.
//!
//! The model is a pluggable strategy selected by configuration:
//! [`ForecastEngine::fit`] cleans the series, enforces the minimum-length
//! requirement, and hands off to the configured [`ModelKind`]. The fitted
//! model is immutable; `predict` is deterministic: identical fitted
//! models and horizons produce bit-identical forecasts.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use macrofeed_core::{Indicator, Region, Series, UtcDateTime};

use crate::clean;
use crate::ensemble::EnsembleModel;
use crate::error::ForecastError;
use crate::seasonal::SeasonalTrendModel;
use crate::trend::TrendModel;

/// Point forecasts with uncertainty bounds over a fixed horizon.
///
/// Invariant: `lower[i] <= points[i] <= upper[i]` for every step, enforced
/// at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub indicator: Indicator,
    pub region: Region,
    pub horizon: usize,
    pub points: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub model_name: String,
    pub generated_at: UtcDateTime,
}

impl ForecastResult {
    pub fn new(
        indicator: Indicator,
        region: Region,
        points: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        model_name: impl Into<String>,
    ) -> Result<Self, ForecastError> {
        let horizon = points.len();
        if horizon == 0 {
            return Err(ForecastError::EmptyHorizon);
        }
        if lower.len() != horizon || upper.len() != horizon {
            return Err(ForecastError::InconsistentBounds { index: 0 });
        }
        for index in 0..horizon {
            let ordered = lower[index].is_finite()
                && points[index].is_finite()
                && upper[index].is_finite()
                && lower[index] <= points[index]
                && points[index] <= upper[index];
            if !ordered {
                return Err(ForecastError::InconsistentBounds { index });
            }
        }

        Ok(Self {
            indicator,
            region,
            horizon,
            points,
            lower,
            upper,
            model_name: model_name.into(),
            generated_at: UtcDateTime::now(),
        })
    }
}

/// Forecast model selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    TrendRegression,
    SeasonalTrend,
    Ensemble,
}

impl ModelKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrendRegression => "trend_regression",
            Self::SeasonalTrend => "seasonal_trend",
            Self::Ensemble => "ensemble",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trend_regression" => Ok(Self::TrendRegression),
            "seasonal_trend" => Ok(Self::SeasonalTrend),
            "ensemble" => Ok(Self::Ensemble),
            other => Err(ForecastError::UnknownModel {
                value: other.to_owned(),
            }),
        }
    }
}

/// Forecasting configuration supplied by the config layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub model: ModelKind,
    /// Series shorter than this after cleaning fail fast instead of
    /// producing a low-confidence forecast.
    pub min_series_len: usize,
    /// Horizons beyond this are rejected, not silently extrapolated.
    pub max_horizon: usize,
    /// z-score of the uncertainty band (1.96 ~ 95%).
    pub confidence_z: f64,
    /// Ensemble blend weights (trend, seasonal); normalized at fit time.
    pub ensemble_weights: (f64, f64),
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::TrendRegression,
            min_series_len: 8,
            max_horizon: 24,
            confidence_z: 1.96,
            ensemble_weights: (0.6, 0.4),
        }
    }
}

/// A fitted, immutable forecast model.
pub trait FittedModel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Forecast `horizon` periods past the end of the fitted series.
    ///
    /// # Errors
    ///
    /// [`ForecastError::HorizonTooLarge`] when `horizon` exceeds the
    /// configured maximum; [`ForecastError::EmptyHorizon`] for zero.
    fn predict(&self, horizon: usize) -> Result<ForecastResult, ForecastError>;
}

/// Fits the configured model to a cleaned series.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Clean `series` and fit the configured model. The input series is
    /// never mutated; the engine reads a prepared copy.
    pub fn fit(&self, series: &Series) -> Result<Box<dyn FittedModel>, ForecastError> {
        let cleaned = clean::prepare(series);

        if cleaned.len() < self.config.min_series_len {
            return Err(ForecastError::InsufficientData {
                len: cleaned.len(),
                min: self.config.min_series_len,
            });
        }

        match self.config.model {
            ModelKind::TrendRegression => {
                Ok(Box::new(TrendModel::fit(&cleaned, &self.config)?))
            }
            ModelKind::SeasonalTrend => {
                Ok(Box::new(SeasonalTrendModel::fit(&cleaned, &self.config)?))
            }
            ModelKind::Ensemble => Ok(Box::new(EnsembleModel::fit(&cleaned, &self.config)?)),
        }
    }
}
