use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{iso_date, parse_iso_date, seeded_series, status_to_error};
use crate::config::FredConfig;
use crate::data_source::{IndicatorSource, SeriesRequest, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RateBudget;
use crate::{Confidence, DataPoint, Indicator, ProviderId, Region, Series};

/// FRED (St. Louis Fed) adapter for monthly US series.
///
/// FRED reports observation values as strings and uses `"."` for missing
/// observations; both conventions stop here.
#[derive(Clone)]
pub struct FredAdapter {
    http_client: Arc<dyn HttpClient>,
    config: FredConfig,
    budget: RateBudget,
}

impl Default for FredAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            config: FredConfig::new("demo"),
            budget: RateBudget::from_policy(&ProviderPolicy::fred_default()),
        }
    }
}

impl FredAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: FredConfig) -> Self {
        Self {
            http_client,
            config,
            budget: RateBudget::from_policy(&ProviderPolicy::fred_default()),
        }
    }

    fn series_id(indicator: Indicator) -> Option<&'static str> {
        match indicator {
            Indicator::InflationRate => Some("CPILFESL"),
            Indicator::ConsumerPriceIndex => Some("CPIAUCSL"),
            Indicator::UnemploymentRate => Some("UNRATE"),
            _ => None,
        }
    }

    fn endpoint(&self, req: &SeriesRequest, series_id: &str) -> String {
        format!(
            "{}/series/observations?series_id={}&api_key={}&file_type=json&observation_start={}&observation_end={}",
            self.config.base_url,
            series_id,
            urlencoding::encode(&self.config.api_key),
            iso_date(req.range.start()),
            iso_date(req.range.end()),
        )
    }

    fn parse(&self, req: &SeriesRequest, body: &str) -> Result<Series, SourceError> {
        let payload: FredObservationsResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::schema(format!("fred: unexpected payload shape: {e}")))?;

        let mut points = Vec::with_capacity(payload.observations.len());
        for observation in payload.observations {
            // "." marks a missing observation.
            if observation.value.trim() == "." {
                continue;
            }
            let value: f64 = observation.value.trim().parse().map_err(|_| {
                SourceError::schema(format!(
                    "fred: non-numeric observation value '{}'",
                    observation.value
                ))
            })?;
            let date = parse_iso_date(ProviderId::Fred, &observation.date)?;
            points.push(DataPoint::new(date, value, ProviderId::Fred, Confidence::Live)?);
        }

        Series::from_points(req.indicator, req.region.clone(), req.resolution, points)
            .map_err(Into::into)
    }
}

#[derive(Debug, Deserialize)]
struct FredObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

impl IndicatorSource for FredAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fred
    }

    fn supports(&self, indicator: Indicator) -> bool {
        Self::series_id(indicator).is_some()
    }

    fn series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let Some(series_id) = Self::series_id(req.indicator) else {
                return Err(SourceError::unsupported(self.id(), req.indicator));
            };

            if req.region != Region::parse("US").expect("US is a valid region code") {
                return Err(SourceError::invalid_request(format!(
                    "fred serves national US series only, not region '{}'",
                    req.region
                )));
            }

            if let Err(delay) = self.budget.try_acquire() {
                return Err(SourceError::rate_limited(format!(
                    "fred request quota exhausted; retry in {:.0}s",
                    delay.as_secs_f64()
                )));
            }

            let request = HttpRequest::get(self.endpoint(&req, series_id)).with_timeout_ms(5_000);
            let response = self.http_client.execute(request).await.map_err(|e| {
                SourceError::unavailable(format!("fred transport error: {}", e.message()))
            })?;

            if !response.is_success() {
                return Err(status_to_error(self.id(), response.status));
            }

            if self.http_client.is_mock() {
                return seeded_series(self.id(), &req, 3.0, 0.9);
            }

            self.parse(&req, &response.body)
        })
    }
}
