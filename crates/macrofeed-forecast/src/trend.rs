//! Ordinary least-squares trend extrapolation.

use macrofeed_core::{Indicator, Region, Series};

use crate::error::ForecastError;
use crate::model::{FittedModel, ForecastConfig, ForecastResult};

/// Fitted least-squares line over observation indices 0..n.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OlsLine {
    pub intercept: f64,
    pub slope: f64,
    pub residual_std: f64,
    pub n: usize,
    pub x_mean: f64,
    pub sxx: f64,
}

impl OlsLine {
    /// Fit `y = intercept + slope * index` by least squares.
    pub fn fit(values: &[f64]) -> Result<Self, ForecastError> {
        let n = values.len();
        if n < 2 {
            return Err(ForecastError::fit_failed(
                "trend fit needs at least two observations",
            ));
        }

        let x_mean = (n - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n as f64;

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (index, value) in values.iter().enumerate() {
            let dx = index as f64 - x_mean;
            sxx += dx * dx;
            sxy += dx * (value - y_mean);
        }

        if sxx == 0.0 {
            return Err(ForecastError::fit_failed(
                "degenerate time axis in trend fit",
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let mut sse = 0.0;
        for (index, value) in values.iter().enumerate() {
            let fitted = intercept + slope * index as f64;
            sse += (value - fitted) * (value - fitted);
        }
        // Unbiased residual variance; collapses to zero for a perfect fit.
        let residual_std = if n > 2 {
            (sse / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            intercept,
            slope,
            residual_std,
            n,
            x_mean,
            sxx,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Prediction standard error at `x`, widening with distance from the
    /// fitted window.
    pub fn prediction_se(&self, x: f64) -> f64 {
        let dx = x - self.x_mean;
        self.residual_std * (1.0 + 1.0 / self.n as f64 + (dx * dx) / self.sxx).sqrt()
    }

    pub fn with_residual_std(&self, residual_std: f64) -> Self {
        Self {
            residual_std,
            ..self.clone()
        }
    }
}

/// Linear trend model: point forecasts on the fitted line, bands from the
/// regression prediction interval.
#[derive(Debug)]
pub struct TrendModel {
    indicator: Indicator,
    region: Region,
    line: OlsLine,
    last_index: usize,
    confidence_z: f64,
    max_horizon: usize,
}

impl TrendModel {
    pub fn fit(series: &Series, config: &ForecastConfig) -> Result<Self, ForecastError> {
        let line = OlsLine::fit(&series.values())?;
        Ok(Self {
            indicator: series.indicator(),
            region: series.region().clone(),
            last_index: series.len() - 1,
            line,
            confidence_z: config.confidence_z,
            max_horizon: config.max_horizon,
        })
    }
}

impl FittedModel for TrendModel {
    fn name(&self) -> &str {
        "trend_regression"
    }

    fn predict(&self, horizon: usize) -> Result<ForecastResult, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::EmptyHorizon);
        }
        if horizon > self.max_horizon {
            return Err(ForecastError::HorizonTooLarge {
                requested: horizon,
                max: self.max_horizon,
            });
        }

        let mut points = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for step in 1..=horizon {
            let x = (self.last_index + step) as f64;
            let estimate = self.line.predict(x);
            let band = self.confidence_z * self.line.prediction_se(x);
            points.push(estimate);
            lower.push(estimate - band);
            upper.push(estimate + band);
        }

        ForecastResult::new(
            self.indicator,
            self.region.clone(),
            points,
            lower,
            upper,
            self.name(),
        )
    }
}
