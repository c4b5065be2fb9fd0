//! # Macrofeed Forecast
//!
//! Deterministic short-horizon forecasting for macrofeed series, plus the
//! personal budget projection built on top of it.
//!
//! ## Pipeline
//!
//! ```text
//! Series ──▶ clean::prepare ──▶ ForecastEngine::fit ──▶ FittedModel
//!                 │                    │                    │
//!        grid + interpolation   min-length check      predict(horizon)
//!                                                          │
//!                                                    ForecastResult
//! ```
//!
//! ## Models
//!
//! | Kind | Description |
//! |------|-------------|
//! | `trend_regression` | Least-squares trend with prediction-interval bands |
//! | `seasonal_trend` | Additive seasonal decomposition + trend extrapolation |
//! | `ensemble` | Weighted blend of the two |
//!
//! Model selection is configuration, not code: the engine dispatches on
//! [`ModelKind`]. Everything here is deterministic; no randomness is
//! involved anywhere in fitting or prediction, so identical inputs and
//! configuration reproduce identical forecasts.
//!
//! ## Example
//!
//! ```rust
//! use macrofeed_core::{Confidence, DataPoint, Indicator, ProviderId, Region, Resolution, Series};
//! use macrofeed_forecast::{ForecastConfig, ForecastEngine};
//! use time::macros::date;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut points = Vec::new();
//!     let mut date = date!(2024 - 01 - 01);
//!     for value in [3.1, 3.0, 3.2, 3.3, 3.1, 3.4, 3.5, 3.3, 3.6, 3.4] {
//!         points.push(DataPoint::new(date, value, ProviderId::Fred, Confidence::Live)?);
//!         date = Resolution::Monthly.advance(date);
//!     }
//!     let series = Series::from_points(
//!         Indicator::InflationRate,
//!         Region::parse("US")?,
//!         Resolution::Monthly,
//!         points,
//!     )?;
//!
//!     let engine = ForecastEngine::new(ForecastConfig::default());
//!     let forecast = engine.fit(&series)?.predict(6)?;
//!     assert_eq!(forecast.horizon, 6);
//!     Ok(())
//! }
//! ```

pub mod budget;
pub mod clean;
pub mod ensemble;
pub mod error;
pub mod model;
pub mod seasonal;
pub mod trend;

pub use budget::{
    project_budget, project_costs, Advisory, BudgetAssumptions, BudgetPeriod, BudgetProjection,
    ExpenseCategory,
};
pub use ensemble::EnsembleModel;
pub use error::ForecastError;
pub use model::{FittedModel, ForecastConfig, ForecastEngine, ForecastResult, ModelKind};
pub use seasonal::SeasonalTrendModel;
pub use trend::TrendModel;
