//! Additive seasonal decomposition with linear trend extrapolation.
//!
//! The series is split into `trend + seasonal + residual`: a centered
//! moving average isolates the trend, per-phase means of the detrended
//! residuals form the seasonal component, and a least-squares line over
//! the deseasonalized series extrapolates the trend forward. The remaining
//! residual spread drives the uncertainty band. Requires at least two full
//! seasonal cycles.

use macrofeed_core::{Indicator, Region, Series};

use crate::error::ForecastError;
use crate::model::{FittedModel, ForecastConfig, ForecastResult};
use crate::trend::OlsLine;

#[derive(Debug)]
pub struct SeasonalTrendModel {
    indicator: Indicator,
    region: Region,
    line: OlsLine,
    /// Zero-mean additive seasonal offsets, one per phase.
    seasonal: Vec<f64>,
    period: usize,
    last_index: usize,
    confidence_z: f64,
    max_horizon: usize,
}

impl SeasonalTrendModel {
    pub fn fit(series: &Series, config: &ForecastConfig) -> Result<Self, ForecastError> {
        let period = series.resolution().periods_per_cycle();
        if period < 2 {
            return Err(ForecastError::fit_failed(format!(
                "resolution '{}' has no seasonal cycle; use trend_regression",
                series.resolution()
            )));
        }

        let values = series.values();
        if values.len() < 2 * period {
            return Err(ForecastError::fit_failed(format!(
                "seasonal decomposition needs two full cycles ({} observations), got {}",
                2 * period,
                values.len()
            )));
        }

        // Per-phase means of the MA-detrended residuals, centered to zero
        // so the seasonal component carries no trend.
        let trend = centered_moving_average(&values, period);
        let mut sums = vec![0.0_f64; period];
        let mut counts = vec![0_usize; period];
        for (index, value) in values.iter().enumerate() {
            let Some(trend_value) = trend[index] else {
                continue;
            };
            sums[index % period] += value - trend_value;
            counts[index % period] += 1;
        }
        let mut seasonal = Vec::with_capacity(period);
        for (sum, count) in sums.iter().zip(&counts) {
            if *count == 0 {
                return Err(ForecastError::fit_failed(
                    "seasonal phase never falls inside the moving-average window",
                ));
            }
            seasonal.push(sum / *count as f64);
        }
        let seasonal_mean = seasonal.iter().sum::<f64>() / period as f64;
        for offset in &mut seasonal {
            *offset -= seasonal_mean;
        }

        // Trend extrapolation comes from a line over the deseasonalized
        // series, so the seasonal shape never leaks into the slope.
        let deseasonalized: Vec<f64> = values
            .iter()
            .enumerate()
            .map(|(index, value)| value - seasonal[index % period])
            .collect();
        let line = OlsLine::fit(&deseasonalized)?;

        // Residual spread of the full decomposition.
        let n = values.len();
        let mut sse = 0.0;
        for (index, value) in values.iter().enumerate() {
            let fitted = line.predict(index as f64) + seasonal[index % period];
            sse += (value - fitted) * (value - fitted);
        }
        let residual_std = if n > 2 {
            (sse / (n - 2) as f64).sqrt()
        } else {
            0.0
        };

        Ok(Self {
            indicator: series.indicator(),
            region: series.region().clone(),
            line: line.with_residual_std(residual_std),
            seasonal,
            period,
            last_index: n - 1,
            confidence_z: config.confidence_z,
            max_horizon: config.max_horizon,
        })
    }
}

/// Centered moving average over one full cycle; `None` at the edges where
/// the window does not fit. Even periods split the outermost observations
/// half-and-half so the window stays centered.
fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut trend = vec![None; n];

    if period % 2 == 0 {
        let half = period / 2;
        for index in half..n.saturating_sub(half) {
            let mut sum = 0.5 * values[index - half] + 0.5 * values[index + half];
            for offset in (index - half + 1)..(index + half) {
                sum += values[offset];
            }
            trend[index] = Some(sum / period as f64);
        }
    } else {
        let half = period / 2;
        for index in half..n.saturating_sub(half) {
            let sum: f64 = values[(index - half)..=(index + half)].iter().sum();
            trend[index] = Some(sum / period as f64);
        }
    }

    trend
}

impl FittedModel for SeasonalTrendModel {
    fn name(&self) -> &str {
        "seasonal_trend"
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
            let index = self.last_index + step;
            let x = index as f64;
            let estimate = self.line.predict(x) + self.seasonal[index % self.period];
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
