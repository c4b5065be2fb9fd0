use std::time::Duration;

use crate::ProviderId;

/// Request quota and backoff tuning for one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub backoff: BackoffPolicy,
}

/// Exponential backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// +/- 50% randomization of each delay; disable for deterministic tests.
    pub jitter: bool,
}

impl BackoffPolicy {
    /// Delay for the given consecutive-failure count (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scale = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let seconds = self.initial_delay.as_secs_f64() * scale;
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let mut delay = Duration::from_secs_f64(capped);

        if self.jitter {
            let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
            let offset = fastrand::u64(0..=(jitter_ms * 2));
            let total_ms = delay.as_millis() as i64 + (offset as i64 - jitter_ms as i64);
            delay = Duration::from_millis(total_ms.max(0) as u64);
        }

        delay
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(900),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl ProviderPolicy {
    /// World Bank open API: generous anonymous quota.
    pub fn world_bank_default() -> Self {
        Self {
            provider_id: ProviderId::WorldBank,
            quota_window: Duration::from_secs(60),
            quota_limit: 60,
            backoff: BackoffPolicy::default(),
        }
    }

    /// FRED keyed API: 120 requests per minute.
    pub fn fred_default() -> Self {
        Self {
            provider_id: ProviderId::Fred,
            quota_window: Duration::from_secs(60),
            quota_limit: 120,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Open Exchange Rates free tier is tight; back off aggressively.
    pub fn open_exchange_default() -> Self {
        Self {
            provider_id: ProviderId::OpenExchange,
            quota_window: Duration::from_secs(60),
            quota_limit: 10,
            backoff: BackoffPolicy {
                initial_delay: Duration::from_secs(60),
                max_delay: Duration::from_secs(3600),
                multiplier: 2.0,
                jitter: true,
            },
        }
    }

    /// Numbeo cost-of-living API: small partner quota.
    pub fn numbeo_default() -> Self {
        Self {
            provider_id: ProviderId::Numbeo,
            quota_window: Duration::from_secs(60),
            quota_limit: 5,
            backoff: BackoffPolicy {
                initial_delay: Duration::from_secs(60),
                max_delay: Duration::from_secs(3600),
                multiplier: 2.0,
                jitter: true,
            },
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::WorldBank => Self::world_bank_default(),
            ProviderId::Fred => Self::fred_default(),
            ProviderId::OpenExchange => Self::open_exchange_default(),
            ProviderId::Numbeo => Self::numbeo_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_exponential_and_capped() {
        let backoff = BackoffPolicy {
            initial_delay: Duration::from_secs(30),
            max_delay: Duration::from_secs(120),
            multiplier: 2.0,
            jitter: false,
        };

        assert_eq!(backoff.delay_for(0), Duration::from_secs(30));
        assert_eq!(backoff.delay_for(1), Duration::from_secs(60));
        assert_eq!(backoff.delay_for(2), Duration::from_secs(120));
        assert_eq!(backoff.delay_for(3), Duration::from_secs(120));
    }

    #[test]
    fn jitter_stays_within_half_delay() {
        let backoff = BackoffPolicy {
            initial_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        };

        for _ in 0..20 {
            let delay = backoff.delay_for(0).as_millis() as f64;
            assert!((4_900.0..=15_100.0).contains(&delay), "delay {delay}ms out of band");
        }
    }

    #[test]
    fn numbeo_quota_is_tightest() {
        let numbeo = ProviderPolicy::numbeo_default();
        let fred = ProviderPolicy::fred_default();
        assert!(numbeo.quota_limit < fred.quota_limit);
    }
}
