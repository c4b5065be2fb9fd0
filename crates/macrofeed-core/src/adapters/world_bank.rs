use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::{Date, Month};

use crate::adapters::{seeded_series, status_to_error};
use crate::config::WorldBankConfig;
use crate::data_source::{IndicatorSource, SeriesRequest, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RateBudget;
use crate::{Confidence, DataPoint, Indicator, ProviderId, Series};

/// World Bank open data adapter for annual country indicators.
///
/// The API wraps every response in a two-element array `[page_meta, rows]`
/// and reports observation dates as bare year strings; both quirks are
/// contained here.
#[derive(Clone)]
pub struct WorldBankAdapter {
    http_client: Arc<dyn HttpClient>,
    config: WorldBankConfig,
    budget: RateBudget,
}

impl Default for WorldBankAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            config: WorldBankConfig::default(),
            budget: RateBudget::from_policy(&ProviderPolicy::world_bank_default()),
        }
    }
}

impl WorldBankAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: WorldBankConfig) -> Self {
        Self {
            http_client,
            config,
            budget: RateBudget::from_policy(&ProviderPolicy::world_bank_default()),
        }
    }

    fn indicator_code(indicator: Indicator) -> Option<&'static str> {
        match indicator {
            Indicator::InflationRate => Some("FP.CPI.TOTL.ZG"),
            Indicator::GdpPerCapita => Some("NY.GDP.PCAP.CD"),
            Indicator::UnemploymentRate => Some("SL.UEM.TOTL.ZS"),
            _ => None,
        }
    }

    fn endpoint(&self, req: &SeriesRequest, code: &str) -> String {
        format!(
            "{}/country/{}/indicator/{}?format=json&per_page=2000&date={}:{}",
            self.config.base_url,
            urlencoding::encode(&req.region.as_str().to_ascii_lowercase()),
            code,
            req.range.start().year(),
            req.range.end().year(),
        )
    }

    fn parse(&self, req: &SeriesRequest, body: &str) -> Result<Series, SourceError> {
        let (_, rows): (serde_json::Value, Option<Vec<WorldBankRow>>) =
            serde_json::from_str(body).map_err(|e| {
                SourceError::schema(format!("world_bank: unexpected payload shape: {e}"))
            })?;

        let mut by_date: BTreeMap<Date, f64> = BTreeMap::new();
        for row in rows.unwrap_or_default() {
            let Some(value) = row.value else {
                continue;
            };
            let year: i32 = row.date.trim().parse().map_err(|_| {
                SourceError::schema(format!("world_bank: unparseable year '{}'", row.date))
            })?;
            let date = Date::from_calendar_date(year, Month::January, 1)
                .map_err(|_| SourceError::schema(format!("world_bank: year {year} out of range")))?;
            by_date.insert(date, value);
        }

        let points = by_date
            .into_iter()
            .map(|(date, value)| {
                DataPoint::new(date, value, ProviderId::WorldBank, Confidence::Live)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Series::from_points(req.indicator, req.region.clone(), req.resolution, points)
            .map_err(Into::into)
    }
}

#[derive(Debug, Deserialize)]
struct WorldBankRow {
    date: String,
    value: Option<f64>,
}

impl IndicatorSource for WorldBankAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::WorldBank
    }

    fn supports(&self, indicator: Indicator) -> bool {
        Self::indicator_code(indicator).is_some()
    }

    fn series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let Some(code) = Self::indicator_code(req.indicator) else {
                return Err(SourceError::unsupported(self.id(), req.indicator));
            };

            if let Err(delay) = self.budget.try_acquire() {
                return Err(SourceError::rate_limited(format!(
                    "world_bank request quota exhausted; retry in {:.0}s",
                    delay.as_secs_f64()
                )));
            }

            let request = HttpRequest::get(self.endpoint(&req, code)).with_timeout_ms(5_000);
            let response = self.http_client.execute(request).await.map_err(|e| {
                SourceError::unavailable(format!("world_bank transport error: {}", e.message()))
            })?;

            if !response.is_success() {
                return Err(status_to_error(self.id(), response.status));
            }

            if self.http_client.is_mock() {
                return seeded_series(self.id(), &req, 3.2, 1.4);
            }

            self.parse(&req, &response.body)
        })
    }
}
