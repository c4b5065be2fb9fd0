//! Contract tests every provider adapter must satisfy in offline mode.

use std::sync::Arc;

use macrofeed_core::{
    FredAdapter, Indicator, IndicatorSource, NumbeoAdapter, OpenExchangeAdapter, ProviderId,
    Region, Resolution, SeriesRequest, SourceErrorKind, TimeRange, WorldBankAdapter,
};
use time::macros::date;

struct ProviderCase {
    id: ProviderId,
    source: Arc<dyn IndicatorSource>,
    indicator: Indicator,
    region: &'static str,
    resolution: Resolution,
}

fn provider_cases() -> Vec<ProviderCase> {
    vec![
        ProviderCase {
            id: ProviderId::WorldBank,
            source: Arc::new(WorldBankAdapter::default()),
            indicator: Indicator::InflationRate,
            region: "DE",
            resolution: Resolution::Annual,
        },
        ProviderCase {
            id: ProviderId::Fred,
            source: Arc::new(FredAdapter::default()),
            indicator: Indicator::ConsumerPriceIndex,
            region: "US",
            resolution: Resolution::Monthly,
        },
        ProviderCase {
            id: ProviderId::OpenExchange,
            source: Arc::new(OpenExchangeAdapter::default()),
            indicator: Indicator::ExchangeRate,
            region: "GB",
            resolution: Resolution::Daily,
        },
        ProviderCase {
            id: ProviderId::Numbeo,
            source: Arc::new(NumbeoAdapter::default()),
            indicator: Indicator::CostOfLiving,
            region: "FR",
            resolution: Resolution::Monthly,
        },
    ]
}

fn request_for(case: &ProviderCase) -> SeriesRequest {
    // Wide enough to produce observations at every resolution, including
    // annual.
    SeriesRequest::new(
        case.indicator,
        Region::parse(case.region).expect("valid region"),
        TimeRange::new(date!(2022 - 01 - 01), date!(2024 - 12 - 31)).expect("valid range"),
        case.resolution,
    )
}

#[tokio::test]
async fn every_provider_returns_points_inside_the_requested_range() {
    for case in provider_cases() {
        let request = request_for(&case);
        let series = case
            .source
            .series(request.clone())
            .await
            .unwrap_or_else(|error| panic!("provider '{}' failed: {error}", case.id));

        assert!(
            !series.is_empty(),
            "provider '{}' returned an empty series",
            case.id
        );
        assert!(
            series
                .points()
                .iter()
                .all(|point| request.range.contains(point.date)),
            "provider '{}' leaked points outside the range",
            case.id
        );
    }
}

#[tokio::test]
async fn every_provider_emits_strictly_increasing_finite_observations() {
    for case in provider_cases() {
        let series = case
            .source
            .series(request_for(&case))
            .await
            .unwrap_or_else(|error| panic!("provider '{}' failed: {error}", case.id));

        for window in series.points().windows(2) {
            assert!(
                window[0].date < window[1].date,
                "provider '{}' emitted unordered dates",
                case.id
            );
        }
        assert!(
            series.values().iter().all(|value| value.is_finite()),
            "provider '{}' emitted a non-finite value",
            case.id
        );
        assert!(
            series.points().iter().all(|point| point.source == case.id),
            "provider '{}' mislabeled point sources",
            case.id
        );
    }
}

#[tokio::test]
async fn every_provider_is_deterministic_in_offline_mode() {
    for case in provider_cases() {
        let first = case
            .source
            .series(request_for(&case))
            .await
            .unwrap_or_else(|error| panic!("provider '{}' failed: {error}", case.id));
        let second = case
            .source
            .series(request_for(&case))
            .await
            .unwrap_or_else(|error| panic!("provider '{}' failed: {error}", case.id));

        assert_eq!(first, second, "provider '{}' is not deterministic", case.id);
    }
}

#[tokio::test]
async fn capability_matrix_matches_the_configured_providers() {
    let world_bank = WorldBankAdapter::default();
    assert!(world_bank.supports(Indicator::InflationRate));
    assert!(world_bank.supports(Indicator::GdpPerCapita));
    assert!(world_bank.supports(Indicator::UnemploymentRate));
    assert!(!world_bank.supports(Indicator::ExchangeRate));

    let fred = FredAdapter::default();
    assert!(fred.supports(Indicator::InflationRate));
    assert!(fred.supports(Indicator::ConsumerPriceIndex));
    assert!(!fred.supports(Indicator::CostOfLiving));

    let open_exchange = OpenExchangeAdapter::default();
    assert!(open_exchange.supports(Indicator::ExchangeRate));
    assert!(!open_exchange.supports(Indicator::InflationRate));

    let numbeo = NumbeoAdapter::default();
    assert!(numbeo.supports(Indicator::CostOfLiving));
    assert!(!numbeo.supports(Indicator::GdpPerCapita));
}

#[tokio::test]
async fn unsupported_indicator_is_rejected_without_a_network_call() {
    for case in provider_cases() {
        // Find an indicator the provider does not serve.
        let unsupported = Indicator::ALL
            .into_iter()
            .find(|indicator| !case.source.supports(*indicator))
            .expect("no provider serves every indicator");

        let request = SeriesRequest::new(
            unsupported,
            Region::parse(case.region).expect("valid region"),
            TimeRange::new(date!(2022 - 01 - 01), date!(2024 - 12 - 31)).expect("valid range"),
            case.resolution,
        );

        let error = case
            .source
            .series(request)
            .await
            .expect_err("unsupported indicator must be rejected");
        assert_eq!(error.kind(), SourceErrorKind::Unsupported);
    }
}
