//! Weighted blend of the trend and seasonal models.

use macrofeed_core::Series;

use crate::error::ForecastError;
use crate::model::{FittedModel, ForecastConfig, ForecastResult};
use crate::seasonal::SeasonalTrendModel;
use crate::trend::TrendModel;

/// Blends the two base models pointwise; bounds blend with the same
/// weights, which preserves `lower <= point <= upper`.
#[derive(Debug)]
pub struct EnsembleModel {
    trend: TrendModel,
    seasonal: SeasonalTrendModel,
    trend_weight: f64,
    seasonal_weight: f64,
}

impl EnsembleModel {
    pub fn fit(series: &Series, config: &ForecastConfig) -> Result<Self, ForecastError> {
        let (trend_weight, seasonal_weight) = config.ensemble_weights;
        if !(trend_weight.is_finite() && seasonal_weight.is_finite())
            || trend_weight < 0.0
            || seasonal_weight < 0.0
            || trend_weight + seasonal_weight <= 0.0
        {
            return Err(ForecastError::fit_failed(
                "ensemble weights must be non-negative with a positive sum",
            ));
        }
        let total = trend_weight + seasonal_weight;

        Ok(Self {
            trend: TrendModel::fit(series, config)?,
            seasonal: SeasonalTrendModel::fit(series, config)?,
            trend_weight: trend_weight / total,
            seasonal_weight: seasonal_weight / total,
        })
    }

    fn blend(&self, a: &[f64], b: &[f64]) -> Vec<f64> {
        a.iter()
            .zip(b)
            .map(|(x, y)| self.trend_weight * x + self.seasonal_weight * y)
            .collect()
    }
}

impl FittedModel for EnsembleModel {
    fn name(&self) -> &str {
        "ensemble"
    }

    fn predict(&self, horizon: usize) -> Result<ForecastResult, ForecastError> {
        let trend = self.trend.predict(horizon)?;
        let seasonal = self.seasonal.predict(horizon)?;

        ForecastResult::new(
            trend.indicator,
            trend.region.clone(),
            self.blend(&trend.points, &seasonal.points),
            self.blend(&trend.lower, &seasonal.lower),
            self.blend(&trend.upper, &seasonal.upper),
            self.name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macrofeed_core::{Confidence, DataPoint, Indicator, ProviderId, Region, Resolution};
    use time::macros::date;

    fn quarterly_series(values: &[f64]) -> Series {
        let mut date = date!(2022 - 01 - 01);
        let mut points = Vec::with_capacity(values.len());
        for value in values {
            points.push(
                DataPoint::new(date, *value, ProviderId::Fred, Confidence::Live).expect("finite"),
            );
            date = Resolution::Quarterly.advance(date);
        }
        Series::from_points(
            Indicator::InflationRate,
            Region::parse("US").expect("valid"),
            Resolution::Quarterly,
            points,
        )
        .expect("ordered")
    }

    fn config() -> ForecastConfig {
        ForecastConfig {
            min_series_len: 4,
            ..ForecastConfig::default()
        }
    }

    #[test]
    fn blend_sits_between_the_base_models() {
        let values = [5.0, 7.0, 5.0, 3.0, 5.5, 7.5, 5.5, 3.5, 6.0, 8.0, 6.0, 4.0];
        let series = quarterly_series(&values);

        let ensemble = EnsembleModel::fit(&series, &config()).expect("fit succeeds");
        let trend = TrendModel::fit(&series, &config()).expect("fit succeeds");
        let seasonal = SeasonalTrendModel::fit(&series, &config()).expect("fit succeeds");

        let blended = ensemble.predict(4).expect("predict succeeds");
        let trend_forecast = trend.predict(4).expect("predict succeeds");
        let seasonal_forecast = seasonal.predict(4).expect("predict succeeds");

        for index in 0..4 {
            let low = trend_forecast.points[index].min(seasonal_forecast.points[index]);
            let high = trend_forecast.points[index].max(seasonal_forecast.points[index]);
            assert!(
                (low - 1e-9..=high + 1e-9).contains(&blended.points[index]),
                "blend must sit between base models at step {index}"
            );
            assert!(blended.lower[index] <= blended.points[index]);
            assert!(blended.points[index] <= blended.upper[index]);
        }
    }

    #[test]
    fn weights_are_normalized() {
        let series = quarterly_series(&[5.0, 7.0, 5.0, 3.0, 5.0, 7.0, 5.0, 3.0]);
        let ensemble = EnsembleModel::fit(
            &series,
            &ForecastConfig {
                ensemble_weights: (3.0, 1.0),
                min_series_len: 4,
                ..ForecastConfig::default()
            },
        )
        .expect("fit succeeds");

        assert!((ensemble.trend_weight - 0.75).abs() < 1e-12);
        assert!((ensemble.seasonal_weight - 0.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let series = quarterly_series(&[5.0, 7.0, 5.0, 3.0, 5.0, 7.0, 5.0, 3.0]);
        let err = EnsembleModel::fit(
            &series,
            &ForecastConfig {
                ensemble_weights: (0.0, 0.0),
                min_series_len: 4,
                ..ForecastConfig::default()
            },
        )
        .expect_err("must fail");
        assert!(matches!(err, ForecastError::ModelFitFailed { .. }));
    }
}
