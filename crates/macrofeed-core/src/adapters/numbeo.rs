use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::Date;

use crate::adapters::{iso_date, parse_iso_date, seeded_series, status_to_error};
use crate::config::NumbeoConfig;
use crate::data_source::{IndicatorSource, SeriesRequest, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RateBudget;
use crate::{Confidence, DataPoint, Indicator, ProviderId, Series};

/// Weights of the composite cost-of-living index. Rent in the city center
/// dominates, followed by food and transport.
const COMPONENT_WEIGHTS: [(ComponentField, f64); 5] = [
    (ComponentField::RentCityCenter, 0.30),
    (ComponentField::MealInexpensive, 0.20),
    (ComponentField::TransportMonthly, 0.20),
    (ComponentField::UtilitiesBasic, 0.15),
    (ComponentField::RentOutsideCenter, 0.15),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ComponentField {
    RentCityCenter,
    RentOutsideCenter,
    MealInexpensive,
    TransportMonthly,
    UtilitiesBasic,
}

/// Numbeo adapter producing the composite cost-of-living index.
///
/// The upstream reports raw component costs per period; this adapter
/// normalizes each component against its window maximum (0–100) and folds
/// them into one weighted index series.
#[derive(Clone)]
pub struct NumbeoAdapter {
    http_client: Arc<dyn HttpClient>,
    config: NumbeoConfig,
    budget: RateBudget,
}

impl Default for NumbeoAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            config: NumbeoConfig::new("demo"),
            budget: RateBudget::from_policy(&ProviderPolicy::numbeo_default()),
        }
    }
}

impl NumbeoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: NumbeoConfig) -> Self {
        Self {
            http_client,
            config,
            budget: RateBudget::from_policy(&ProviderPolicy::numbeo_default()),
        }
    }

    fn endpoint(&self, req: &SeriesRequest) -> String {
        format!(
            "{}/cost_of_living_history?country={}&start={}&end={}",
            self.config.base_url,
            urlencoding::encode(req.region.as_str()),
            iso_date(req.range.start()),
            iso_date(req.range.end()),
        )
    }

    fn parse(&self, req: &SeriesRequest, body: &str) -> Result<Series, SourceError> {
        let payload: CostOfLivingResponse = serde_json::from_str(body)
            .map_err(|e| SourceError::schema(format!("numbeo: unexpected payload shape: {e}")))?;

        let mut rows = Vec::with_capacity(payload.entries.len());
        for entry in payload.entries {
            let date = parse_iso_date(ProviderId::Numbeo, &entry.date)?;
            rows.push((date, entry));
        }
        rows.sort_by_key(|(date, _)| *date);

        let points = composite_index(&rows)?
            .into_iter()
            .map(|(date, value)| {
                DataPoint::new(date, value, ProviderId::Numbeo, Confidence::Live)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Series::from_points(req.indicator, req.region.clone(), req.resolution, points)
            .map_err(Into::into)
    }
}

/// Weighted 0–100 index per period, each component normalized against its
/// maximum over the window.
fn composite_index(rows: &[(Date, CostOfLivingEntry)]) -> Result<Vec<(Date, f64)>, SourceError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let max_of = |field: ComponentField| -> f64 {
        rows.iter()
            .map(|(_, entry)| entry.component(field))
            .fold(0.0_f64, f64::max)
    };

    let mut maxima = Vec::with_capacity(COMPONENT_WEIGHTS.len());
    for (field, weight) in COMPONENT_WEIGHTS {
        let max = max_of(field);
        if !max.is_finite() || max <= 0.0 {
            return Err(SourceError::schema(
                "numbeo: component costs must be positive to build the index",
            ));
        }
        maxima.push((field, weight, max));
    }

    Ok(rows
        .iter()
        .map(|(date, entry)| {
            let index = maxima
                .iter()
                .map(|(field, weight, max)| (entry.component(*field) / max) * 100.0 * weight)
                .sum();
            (*date, index)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CostOfLivingResponse {
    entries: Vec<CostOfLivingEntry>,
}

#[derive(Debug, Deserialize)]
struct CostOfLivingEntry {
    date: String,
    rent_1br_city_center: f64,
    rent_1br_outside_center: f64,
    meal_inexpensive_restaurant: f64,
    transportation_monthly: f64,
    utilities_basic: f64,
}

impl CostOfLivingEntry {
    fn component(&self, field: ComponentField) -> f64 {
        match field {
            ComponentField::RentCityCenter => self.rent_1br_city_center,
            ComponentField::RentOutsideCenter => self.rent_1br_outside_center,
            ComponentField::MealInexpensive => self.meal_inexpensive_restaurant,
            ComponentField::TransportMonthly => self.transportation_monthly,
            ComponentField::UtilitiesBasic => self.utilities_basic,
        }
    }
}

impl IndicatorSource for NumbeoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Numbeo
    }

    fn supports(&self, indicator: Indicator) -> bool {
        indicator == Indicator::CostOfLiving
    }

    fn series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.supports(req.indicator) {
                return Err(SourceError::unsupported(self.id(), req.indicator));
            }

            if let Err(delay) = self.budget.try_acquire() {
                return Err(SourceError::rate_limited(format!(
                    "numbeo request quota exhausted; retry in {:.0}s",
                    delay.as_secs_f64()
                )));
            }

            let auth = HttpAuth::Header {
                name: String::from("X-Api-Key"),
                value: self.config.api_key.clone(),
            };
            let request = HttpRequest::get(self.endpoint(&req))
                .with_auth(&auth)
                .with_timeout_ms(5_000);

            let response = self.http_client.execute(request).await.map_err(|e| {
                SourceError::unavailable(format!("numbeo transport error: {}", e.message()))
            })?;

            if !response.is_success() {
                return Err(status_to_error(self.id(), response.status));
            }

            if self.http_client.is_mock() {
                return seeded_series(self.id(), &req, 68.0, 9.0);
            }

            self.parse(&req, &response.body)
        })
    }
}
