//! Fetch orchestration: cache check, parallel provider fan-out, fallback.
//!
//! One `get` call resolves to exactly one provenance-tagged result:
//!
//! 1. a non-stale cache entry short-circuits as `cached`;
//! 2. otherwise every eligible provider is queried concurrently, each call
//!    bounded by the per-call timeout; a timeout cancels that call only;
//! 3. any live success is merged under the indicator's priority order,
//!    written through to the cache, and returned as `live`;
//! 4. with no live data the request degrades to the stale cache entry
//!    (`cached-stale`), then to a carry-forward estimate (`estimated`),
//!    as far as the freshness policy permits;
//! 5. only when every path is exhausted does the caller see
//!    [`FetchError::NoDataAvailable`].
//!
//! Provider failures are absorbed into structured warnings on the result
//! metadata. Callers never receive raw source errors, and never receive
//! data without its trust level.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::cache::{CacheKey, CacheStore};
use crate::config::{default_priorities, CachePolicy};
use crate::cooldown::{GateDecision, ProviderGate};
use crate::data_source::{IndicatorSource, SeriesRequest, SourceErrorKind};
use crate::resolve::{self, LiveResult};
use crate::{
    Confidence, FreshnessPolicy, Indicator, Provenance, ProviderId, Region, Resolution, Series,
    TimeRange, UtcDateTime, ValidationError,
};

/// Terminal fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data available for {indicator}/{region} under policy '{policy}'")]
    NoDataAvailable {
        indicator: Indicator,
        region: Region,
        policy: FreshnessPolicy,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Metadata attached to every resolved result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    /// Providers consulted, in consultation order.
    pub source_chain: Vec<ProviderId>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    /// Absorbed provider failures and degradation notices.
    pub warnings: Vec<String>,
}

/// A series plus the trust level it was resolved at.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSeries {
    pub series: Series,
    pub provenance: Provenance,
    pub meta: ResolveMeta,
}

/// Drives adapters, applies per-call timeouts, and composes fallbacks.
///
/// All collaborators are injected: the cache store, the provider gate, and
/// the adapters themselves, so tests can substitute scripted fakes.
pub struct FetchOrchestrator {
    adapters: HashMap<ProviderId, Arc<dyn IndicatorSource>>,
    cache: CacheStore,
    gate: ProviderGate,
    priorities: HashMap<Indicator, Vec<ProviderId>>,
    cache_policy: CachePolicy,
    call_timeout: Duration,
}

impl FetchOrchestrator {
    pub fn builder() -> FetchOrchestratorBuilder {
        FetchOrchestratorBuilder::new()
    }

    /// Resolve one series under the caller's freshness policy.
    pub async fn get(
        &self,
        req: &SeriesRequest,
        policy: FreshnessPolicy,
    ) -> Result<ResolvedSeries, FetchError> {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let key = CacheKey::new(req.indicator, req.region.clone(), req.resolution);
        let now = UtcDateTime::now();

        let cached = self.cache.get(&key).await;
        if let Some(entry) = &cached {
            if !entry.is_stale_at(now) {
                return Ok(self.finish(
                    entry.series.retagged(Confidence::Cached),
                    Provenance::Cached,
                    vec![entry.provider],
                    true,
                    warnings,
                    started,
                ));
            }
        }

        let plan = self.plan_providers(req.indicator, &mut warnings);
        let mut source_chain = Vec::with_capacity(plan.len());
        let mut successes = Vec::new();

        let tasks: Vec<_> = plan
            .into_iter()
            .map(|provider| {
                let adapter = Arc::clone(
                    self.adapters
                        .get(&provider)
                        .expect("planned providers are registered"),
                );
                let request = req.clone();
                let timeout = self.call_timeout;
                (
                    provider,
                    tokio::spawn(async move {
                        tokio::time::timeout(timeout, adapter.series(request)).await
                    }),
                )
            })
            .collect();

        for (provider, task) in tasks {
            source_chain.push(provider);
            match task.await {
                Ok(Ok(Ok(series))) => {
                    self.gate.record_success(provider);
                    successes.push(LiveResult { provider, series });
                }
                Ok(Ok(Err(error))) => {
                    match error.kind() {
                        SourceErrorKind::RateLimited => {
                            let cooldown = self.gate.record_rate_limited(provider);
                            warnings.push(format!(
                                "{provider}: rate limited; cooling down for {}s",
                                cooldown.as_secs()
                            ));
                        }
                        SourceErrorKind::Schema => {
                            self.gate.mark_degraded(provider);
                            warnings.push(format!(
                                "{provider}: schema drift, degraded for this session: {error}"
                            ));
                        }
                        _ => warnings.push(format!("{provider}: {error}")),
                    }
                }
                Ok(Err(_elapsed)) => {
                    warnings.push(format!(
                        "{provider}: no response within {}ms",
                        self.call_timeout.as_millis()
                    ));
                }
                Err(join_error) => {
                    warnings.push(format!("{provider}: fetch task failed: {join_error}"));
                }
            }
        }

        if let Some(merged) = resolve::merge_live(&successes, self.priority_for(req.indicator))? {
            self.cache
                .put(
                    key,
                    merged.series.clone(),
                    self.cache_policy.ttl_for(req.indicator),
                    merged.winner,
                )
                .await;
            return Ok(self.finish(
                merged.series,
                Provenance::Live,
                source_chain,
                false,
                warnings,
                started,
            ));
        }

        // All live paths failed; degrade as far as the policy permits.
        if let Some(entry) = cached {
            let overlap = entry.series.within(&req.range);

            if policy.permits_stale() && !overlap.is_empty() {
                warnings.push(format!(
                    "serving stale cache entry from {} fetched at {}",
                    entry.provider, entry.fetched_at
                ));
                let mut chain = vec![entry.provider];
                chain.extend(source_chain);
                return Ok(self.finish(
                    entry.series.retagged(Confidence::Cached),
                    Provenance::CachedStale,
                    chain,
                    true,
                    warnings,
                    started,
                ));
            }

            if policy.permits_estimate() {
                let estimate = resolve::carry_forward(&entry.series, &req.range);
                if !estimate.is_empty() {
                    warnings.push(format!(
                        "carry-forward estimate from last value of {}",
                        entry.provider
                    ));
                    let mut chain = vec![entry.provider];
                    chain.extend(source_chain);
                    return Ok(self.finish(
                        estimate,
                        Provenance::Estimated,
                        chain,
                        true,
                        warnings,
                        started,
                    ));
                }
            }
        }

        Err(FetchError::NoDataAvailable {
            indicator: req.indicator,
            region: req.region.clone(),
            policy,
        })
    }

    /// Most recent value per region, degrading as far as estimates allow.
    /// Regions with no data at any trust level are omitted.
    pub async fn latest(
        &self,
        indicator: Indicator,
        regions: &[Region],
        range: TimeRange,
        resolution: Resolution,
    ) -> HashMap<Region, f64> {
        let mut latest = HashMap::with_capacity(regions.len());
        for region in regions {
            let req = SeriesRequest::new(indicator, region.clone(), range, resolution);
            if let Ok(resolved) = self.get(&req, FreshnessPolicy::EstimateOk).await {
                if let Some(point) = resolved.series.last() {
                    latest.insert(region.clone(), point.value);
                }
            }
        }
        latest
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    fn priority_for(&self, indicator: Indicator) -> &[ProviderId] {
        self.priorities
            .get(&indicator)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Providers eligible for this cycle: support the indicator, pass the
    /// gate. Skips are recorded as warnings so callers can see why a
    /// provider sat out.
    fn plan_providers(&self, indicator: Indicator, warnings: &mut Vec<String>) -> Vec<ProviderId> {
        let mut plan = Vec::new();
        for provider in self.priority_for(indicator) {
            let Some(adapter) = self.adapters.get(provider) else {
                warnings.push(format!("{provider}: not registered; skipped"));
                continue;
            };
            if !adapter.supports(indicator) {
                continue;
            }
            match self.gate.decide(*provider) {
                GateDecision::Allowed => plan.push(*provider),
                GateDecision::CoolingDown { remaining } => {
                    warnings.push(format!(
                        "{provider}: cooling down for another {}s; skipped",
                        remaining.as_secs()
                    ));
                }
                GateDecision::Degraded => {
                    warnings.push(format!("{provider}: degraded for this session; skipped"));
                }
            }
        }
        plan
    }

    fn finish(
        &self,
        series: Series,
        provenance: Provenance,
        source_chain: Vec<ProviderId>,
        cache_hit: bool,
        warnings: Vec<String>,
        started: Instant,
    ) -> ResolvedSeries {
        ResolvedSeries {
            series,
            provenance,
            meta: ResolveMeta {
                request_id: uuid::Uuid::new_v4().to_string(),
                generated_at: UtcDateTime::now(),
                source_chain,
                latency_ms: started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64,
                cache_hit,
                warnings,
            },
        }
    }
}

/// Builder wiring adapters, cache, and policies into an orchestrator.
#[derive(Default)]
pub struct FetchOrchestratorBuilder {
    adapters: Vec<Arc<dyn IndicatorSource>>,
    cache: Option<CacheStore>,
    gate: Option<ProviderGate>,
    priorities: Option<HashMap<Indicator, Vec<ProviderId>>>,
    cache_policy: Option<CachePolicy>,
    call_timeout: Duration,
}

impl FetchOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            call_timeout: Duration::from_secs(3),
            ..Self::default()
        }
    }

    /// Register all four built-in adapters in deterministic offline mode.
    pub fn with_mock_providers(mut self) -> Self {
        use crate::adapters::{FredAdapter, NumbeoAdapter, OpenExchangeAdapter, WorldBankAdapter};
        self.adapters.push(Arc::new(WorldBankAdapter::default()));
        self.adapters.push(Arc::new(FredAdapter::default()));
        self.adapters.push(Arc::new(OpenExchangeAdapter::default()));
        self.adapters.push(Arc::new(NumbeoAdapter::default()));
        self
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn IndicatorSource>) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_gate(mut self, gate: ProviderGate) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_priorities(mut self, priorities: HashMap<Indicator, Vec<ProviderId>>) -> Self {
        self.priorities = Some(priorities);
        self
    }

    pub fn with_cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = Some(cache_policy);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn build(self) -> FetchOrchestrator {
        let adapters = self
            .adapters
            .into_iter()
            .map(|adapter| (adapter.id(), adapter))
            .collect();

        FetchOrchestrator {
            adapters,
            cache: self.cache.unwrap_or_default(),
            gate: self.gate.unwrap_or_else(ProviderGate::with_defaults),
            priorities: self.priorities.unwrap_or_else(default_priorities),
            cache_policy: self.cache_policy.unwrap_or_default(),
            call_timeout: if self.call_timeout.is_zero() {
                Duration::from_secs(3)
            } else {
                self.call_timeout
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{SeriesRequest, SourceError};
    use crate::{DataPoint, Region};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use time::macros::date;

    struct ScriptedSource {
        id: ProviderId,
        responses: Mutex<Vec<Result<Series, SourceError>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedSource {
        fn new(id: ProviderId, responses: Vec<Result<Series, SourceError>>) -> Self {
            Self {
                id,
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().expect("not poisoned")
        }
    }

    impl IndicatorSource for ScriptedSource {
        fn id(&self) -> ProviderId {
            self.id
        }

        fn supports(&self, _indicator: Indicator) -> bool {
            true
        }

        fn series<'a>(
            &'a self,
            _req: SeriesRequest,
        ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
            *self.calls.lock().expect("not poisoned") += 1;
            let next = {
                let mut responses = self.responses.lock().expect("not poisoned");
                if responses.is_empty() {
                    Err(SourceError::unavailable("script exhausted"))
                } else {
                    responses.remove(0)
                }
            };
            Box::pin(async move { next })
        }
    }

    fn us() -> Region {
        Region::parse("US").expect("valid region")
    }

    fn request() -> SeriesRequest {
        SeriesRequest::new(
            Indicator::InflationRate,
            us(),
            TimeRange::new(date!(2025 - 01 - 01), date!(2025 - 03 - 01)).expect("valid"),
            Resolution::Monthly,
        )
    }

    fn inflation_series(provider: ProviderId, values: &[(time::Date, f64)]) -> Series {
        Series::from_points(
            Indicator::InflationRate,
            us(),
            Resolution::Monthly,
            values
                .iter()
                .map(|(d, v)| DataPoint::new(*d, *v, provider, Confidence::Live).expect("finite"))
                .collect(),
        )
        .expect("ordered")
    }

    fn priorities_fred_then_wb() -> HashMap<Indicator, Vec<ProviderId>> {
        let mut priorities = HashMap::new();
        priorities.insert(
            Indicator::InflationRate,
            vec![ProviderId::Fred, ProviderId::WorldBank],
        );
        priorities
    }

    #[tokio::test]
    async fn live_success_writes_through_to_cache() {
        let series = inflation_series(
            ProviderId::Fred,
            &[(date!(2025 - 01 - 01), 3.1), (date!(2025 - 02 - 01), 3.3)],
        );
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(Arc::new(ScriptedSource::new(
                ProviderId::Fred,
                vec![Ok(series.clone())],
            )))
            .with_priorities(priorities_fred_then_wb())
            .build();

        let resolved = orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("live fetch succeeds");

        assert_eq!(resolved.provenance, Provenance::Live);
        assert_eq!(resolved.series.values(), vec![3.1, 3.3]);
        assert!(!resolved.meta.cache_hit);

        let key = CacheKey::new(Indicator::InflationRate, us(), Resolution::Monthly);
        let entry = orchestrator.cache().get(&key).await.expect("cache written");
        assert_eq!(entry.provider, ProviderId::Fred);
    }

    #[tokio::test]
    async fn second_get_is_served_from_cache() {
        let series = inflation_series(ProviderId::Fred, &[(date!(2025 - 01 - 01), 3.1)]);
        let scripted = Arc::new(ScriptedSource::new(ProviderId::Fred, vec![Ok(series)]));
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(scripted.clone())
            .with_priorities(priorities_fred_then_wb())
            .build();

        orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("live fetch");
        let resolved = orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("cached fetch");

        assert_eq!(resolved.provenance, Provenance::Cached);
        assert!(resolved.meta.cache_hit);
        assert_eq!(scripted.calls(), 1);
    }

    #[tokio::test]
    async fn no_data_anywhere_is_terminal() {
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(Arc::new(ScriptedSource::new(
                ProviderId::Fred,
                vec![Err(SourceError::unavailable("down"))],
            )))
            .with_priorities(priorities_fred_then_wb())
            .build();

        let err = orchestrator
            .get(&request(), FreshnessPolicy::EstimateOk)
            .await
            .expect_err("must fail");

        assert!(matches!(err, FetchError::NoDataAvailable { .. }));
    }

    #[tokio::test]
    async fn rate_limited_provider_is_skipped_on_the_next_cycle() {
        let scripted = Arc::new(ScriptedSource::new(
            ProviderId::Fred,
            vec![
                Err(SourceError::rate_limited("429")),
                Ok(inflation_series(ProviderId::Fred, &[(date!(2025 - 01 - 01), 3.1)])),
            ],
        ));
        let backup = Arc::new(ScriptedSource::new(
            ProviderId::WorldBank,
            vec![
                Ok(inflation_series(ProviderId::WorldBank, &[(date!(2025 - 01 - 01), 2.8)])),
                Ok(inflation_series(ProviderId::WorldBank, &[(date!(2025 - 01 - 01), 2.8)])),
            ],
        ));
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(scripted.clone())
            .with_adapter(backup)
            .with_priorities(priorities_fred_then_wb())
            .build();

        let first = orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("world bank still succeeds");
        assert_eq!(first.provenance, Provenance::Live);
        assert_eq!(first.series.values(), vec![2.8]);

        // Invalidate so the second cycle must consult providers again.
        let key = CacheKey::new(Indicator::InflationRate, us(), Resolution::Monthly);
        orchestrator.cache().invalidate(&key).await;

        let second = orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("world bank succeeds again");

        // Fred is cooling down: exactly one call ever reached it.
        assert_eq!(scripted.calls(), 1);
        assert!(second
            .meta
            .warnings
            .iter()
            .any(|warning| warning.contains("cooling down")));
    }

    #[tokio::test]
    async fn schema_error_degrades_provider_for_the_session() {
        let flaky = Arc::new(ScriptedSource::new(
            ProviderId::Fred,
            vec![Err(SourceError::schema("unexpected field"))],
        ));
        let backup = Arc::new(ScriptedSource::new(
            ProviderId::WorldBank,
            vec![
                Ok(inflation_series(ProviderId::WorldBank, &[(date!(2025 - 01 - 01), 2.8)])),
                Ok(inflation_series(ProviderId::WorldBank, &[(date!(2025 - 01 - 01), 2.8)])),
            ],
        ));
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(flaky.clone())
            .with_adapter(backup)
            .with_priorities(priorities_fred_then_wb())
            .build();

        orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("backup succeeds");

        let key = CacheKey::new(Indicator::InflationRate, us(), Resolution::Monthly);
        orchestrator.cache().invalidate(&key).await;

        let second = orchestrator
            .get(&request(), FreshnessPolicy::MustBeFresh)
            .await
            .expect("backup succeeds again");

        assert_eq!(flaky.calls(), 1);
        assert!(second
            .meta
            .warnings
            .iter()
            .any(|warning| warning.contains("degraded for this session")));
    }

    #[tokio::test]
    async fn latest_returns_most_recent_value_per_region() {
        let series = inflation_series(
            ProviderId::Fred,
            &[(date!(2025 - 01 - 01), 3.1), (date!(2025 - 02 - 01), 3.4)],
        );
        let orchestrator = FetchOrchestrator::builder()
            .with_adapter(Arc::new(ScriptedSource::new(ProviderId::Fred, vec![Ok(series)])))
            .with_priorities(priorities_fred_then_wb())
            .build();

        let range = TimeRange::new(date!(2025 - 01 - 01), date!(2025 - 03 - 01)).expect("valid");
        let latest = orchestrator
            .latest(Indicator::InflationRate, &[us()], range, Resolution::Monthly)
            .await;

        assert_eq!(latest.get(&us()), Some(&3.4));
    }
}
