//! Typed configuration surface filled in by the (external) config layer.
//!
//! Providers are an enumerated set with one typed credentials struct each;
//! no untyped key/value dictionaries. The core never reads files or
//! environment variables itself; callers construct these values and hand
//! them to the orchestrator builder.

use std::collections::HashMap;
use std::time::Duration;

use crate::{Indicator, ProviderId};

/// World Bank open data API (no credentials).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldBankConfig {
    pub base_url: String,
}

impl Default for WorldBankConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.worldbank.org/v2"),
        }
    }
}

/// FRED (St. Louis Fed) API; the key travels as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FredConfig {
    pub base_url: String,
    pub api_key: String,
}

impl FredConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: String::from("https://api.stlouisfed.org/fred"),
            api_key: api_key.into(),
        }
    }
}

/// Open Exchange Rates API; the app id travels as a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenExchangeConfig {
    pub base_url: String,
    pub app_id: String,
}

impl OpenExchangeConfig {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            base_url: String::from("https://openexchangerates.org/api"),
            app_id: app_id.into(),
        }
    }
}

/// Numbeo cost-of-living API; the key travels as a request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumbeoConfig {
    pub base_url: String,
    pub api_key: String,
}

impl NumbeoConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: String::from("https://www.numbeo.com/api"),
            api_key: api_key.into(),
        }
    }
}

/// Per-indicator cache TTLs, supplied to the cache at `put` time.
///
/// TTLs are indicator-class-dependent: exchange rates go stale in minutes
/// while inflation indices hold for a week.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    ttls: HashMap<Indicator, Duration>,
    default_ttl: Duration,
}

impl CachePolicy {
    pub fn new(ttls: HashMap<Indicator, Duration>, default_ttl: Duration) -> Self {
        Self { ttls, default_ttl }
    }

    pub fn ttl_for(&self, indicator: Indicator) -> Duration {
        self.ttls
            .get(&indicator)
            .copied()
            .unwrap_or(self.default_ttl)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        let mut ttls = HashMap::new();
        ttls.insert(Indicator::ExchangeRate, Duration::from_secs(15 * 60));
        ttls.insert(Indicator::CostOfLiving, Duration::from_secs(24 * 3600));
        ttls.insert(Indicator::InflationRate, Duration::from_secs(7 * 24 * 3600));
        ttls.insert(
            Indicator::ConsumerPriceIndex,
            Duration::from_secs(7 * 24 * 3600),
        );
        ttls.insert(
            Indicator::UnemploymentRate,
            Duration::from_secs(7 * 24 * 3600),
        );
        ttls.insert(Indicator::GdpPerCapita, Duration::from_secs(30 * 24 * 3600));
        Self {
            ttls,
            default_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

/// Per-indicator provider preference, best-first. Not alphabetic: the
/// ordering is a product decision configured per indicator.
pub fn default_priorities() -> HashMap<Indicator, Vec<ProviderId>> {
    let mut priorities = HashMap::new();
    priorities.insert(
        Indicator::InflationRate,
        vec![ProviderId::Fred, ProviderId::WorldBank],
    );
    priorities.insert(Indicator::ConsumerPriceIndex, vec![ProviderId::Fred]);
    priorities.insert(
        Indicator::UnemploymentRate,
        vec![ProviderId::Fred, ProviderId::WorldBank],
    );
    priorities.insert(Indicator::GdpPerCapita, vec![ProviderId::WorldBank]);
    priorities.insert(Indicator::ExchangeRate, vec![ProviderId::OpenExchange]);
    priorities.insert(Indicator::CostOfLiving, vec![ProviderId::Numbeo]);
    priorities
}
