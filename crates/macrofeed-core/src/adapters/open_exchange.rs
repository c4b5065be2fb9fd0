use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{iso_date, parse_iso_date, seeded_series, status_to_error};
use crate::config::OpenExchangeConfig;
use crate::data_source::{IndicatorSource, SeriesRequest, SourceError};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::RateBudget;
use crate::{Confidence, DataPoint, Indicator, ProviderId, Region, Series};

const BASE_CURRENCY: &str = "USD";

/// Open Exchange Rates adapter for daily spot rates against USD.
///
/// A request's region selects the quote currency of that economy; regions
/// without a currency mapping are rejected before the network.
#[derive(Clone)]
pub struct OpenExchangeAdapter {
    http_client: Arc<dyn HttpClient>,
    config: OpenExchangeConfig,
    budget: RateBudget,
}

impl Default for OpenExchangeAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            config: OpenExchangeConfig::new("demo"),
            budget: RateBudget::from_policy(&ProviderPolicy::open_exchange_default()),
        }
    }
}

impl OpenExchangeAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: OpenExchangeConfig) -> Self {
        Self {
            http_client,
            config,
            budget: RateBudget::from_policy(&ProviderPolicy::open_exchange_default()),
        }
    }

    /// Quote currency for a region's economy.
    pub fn currency_for(region: &Region) -> Option<&'static str> {
        match region.as_str() {
            "US" => Some("USD"),
            "GB" => Some("GBP"),
            "DE" | "FR" | "IT" | "ES" | "NL" => Some("EUR"),
            "JP" => Some("JPY"),
            "CA" => Some("CAD"),
            "AU" => Some("AUD"),
            "CH" => Some("CHF"),
            "CN" => Some("CNY"),
            "IN" => Some("INR"),
            "BR" => Some("BRL"),
            "MX" => Some("MXN"),
            _ => None,
        }
    }

    fn endpoint(&self, req: &SeriesRequest, symbol: &str) -> String {
        format!(
            "{}/timeseries?app_id={}&base={}&symbols={}&start_date={}&end_date={}",
            self.config.base_url,
            urlencoding::encode(&self.config.app_id),
            BASE_CURRENCY,
            symbol,
            iso_date(req.range.start()),
            iso_date(req.range.end()),
        )
    }

    fn parse(&self, req: &SeriesRequest, symbol: &str, body: &str) -> Result<Series, SourceError> {
        let payload: TimeseriesResponse = serde_json::from_str(body).map_err(|e| {
            SourceError::schema(format!("open_exchange: unexpected payload shape: {e}"))
        })?;

        let mut points = Vec::with_capacity(payload.rates.len());
        for (date_str, rates) in payload.rates {
            let Some(rate) = rates.get(symbol) else {
                return Err(SourceError::schema(format!(
                    "open_exchange: symbol '{symbol}' missing from rates on {date_str}"
                )));
            };
            let date = parse_iso_date(ProviderId::OpenExchange, &date_str)?;
            points.push(DataPoint::new(
                date,
                *rate,
                ProviderId::OpenExchange,
                Confidence::Live,
            )?);
        }

        Series::from_points(req.indicator, req.region.clone(), req.resolution, points)
            .map_err(Into::into)
    }
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    // BTreeMap keeps observation dates sorted ascending.
    rates: BTreeMap<String, HashMap<String, f64>>,
}

impl IndicatorSource for OpenExchangeAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenExchange
    }

    fn supports(&self, indicator: Indicator) -> bool {
        indicator == Indicator::ExchangeRate
    }

    fn series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.supports(req.indicator) {
                return Err(SourceError::unsupported(self.id(), req.indicator));
            }

            let Some(symbol) = Self::currency_for(&req.region) else {
                return Err(SourceError::invalid_request(format!(
                    "open_exchange has no currency mapping for region '{}'",
                    req.region
                )));
            };

            if let Err(delay) = self.budget.try_acquire() {
                return Err(SourceError::rate_limited(format!(
                    "open_exchange request quota exhausted; retry in {:.0}s",
                    delay.as_secs_f64()
                )));
            }

            let request = HttpRequest::get(self.endpoint(&req, symbol)).with_timeout_ms(5_000);
            let response = self.http_client.execute(request).await.map_err(|e| {
                SourceError::unavailable(format!(
                    "open_exchange transport error: {}",
                    e.message()
                ))
            })?;

            if !response.is_success() {
                return Err(status_to_error(self.id(), response.status));
            }

            if self.http_client.is_mock() {
                return seeded_series(self.id(), &req, 1.05, 0.12);
            }

            self.parse(&req, symbol, &response.body)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::{Resolution, TimeRange};
    use time::macros::date;

    struct ScriptedHttpClient {
        response: Result<HttpResponse, HttpError>,
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn request() -> SeriesRequest {
        SeriesRequest::new(
            Indicator::ExchangeRate,
            Region::parse("GB").expect("valid"),
            TimeRange::new(date!(2025 - 06 - 02), date!(2025 - 06 - 04)).expect("valid"),
            Resolution::Daily,
        )
    }

    #[tokio::test]
    async fn parses_timeseries_rates_in_date_order() {
        let body = r#"{
            "base": "USD",
            "rates": {
                "2025-06-03": {"GBP": 0.787},
                "2025-06-02": {"GBP": 0.790},
                "2025-06-04": {"GBP": 0.785}
            }
        }"#;
        let adapter = OpenExchangeAdapter::with_http_client(
            Arc::new(ScriptedHttpClient {
                response: Ok(HttpResponse::ok_json(body)),
            }),
            OpenExchangeConfig::new("app-id"),
        );

        let series = adapter.series(request()).await.expect("parse succeeds");

        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), vec![0.790, 0.787, 0.785]);
    }

    #[tokio::test]
    async fn missing_symbol_in_rates_is_a_schema_error() {
        let body = r#"{"rates": {"2025-06-02": {"EUR": 0.92}}}"#;
        let adapter = OpenExchangeAdapter::with_http_client(
            Arc::new(ScriptedHttpClient {
                response: Ok(HttpResponse::ok_json(body)),
            }),
            OpenExchangeConfig::new("app-id"),
        );

        let err = adapter.series(request()).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::Schema);
    }

    #[tokio::test]
    async fn unmapped_region_is_rejected_before_the_network() {
        let adapter = OpenExchangeAdapter::default();
        let req = SeriesRequest::new(
            Indicator::ExchangeRate,
            Region::parse("ZZ").expect("valid"),
            TimeRange::new(date!(2025 - 06 - 02), date!(2025 - 06 - 04)).expect("valid"),
            Resolution::Daily,
        );

        let err = adapter.series(req).await.expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn mock_mode_is_deterministic_per_region() {
        let adapter = OpenExchangeAdapter::default();
        let first = adapter.series(request()).await.expect("mock fetch");
        let second = adapter.series(request()).await.expect("mock fetch");
        assert_eq!(first, second);
    }
}
