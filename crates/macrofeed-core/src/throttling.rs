use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::provider_policy::ProviderPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// In-process request budget enforcing a provider's quota window.
///
/// Adapters call [`RateBudget::try_acquire`] before every upstream request;
/// an exhausted budget surfaces as a `RateLimited` source error with the
/// suggested retry delay, and the orchestrator decides what to do about it.
#[derive(Clone)]
pub struct RateBudget {
    limiter: Arc<DirectRateLimiter>,
    retry_after: Duration,
}

impl RateBudget {
    pub fn new(quota_window: Duration, quota_limit: u32, retry_after: Duration) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                quota_limit,
            ))),
            retry_after,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(
            policy.quota_window,
            policy.quota_limit,
            policy.backoff.initial_delay,
        )
    }

    /// Tries to take one unit of rate budget. When the quota is exhausted
    /// the recommended retry delay is returned instead.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        if self.limiter.check().is_ok() {
            Ok(())
        } else {
            Err(self.retry_after)
        }
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_fails_when_quota_is_exhausted() {
        let budget = RateBudget::new(Duration::from_secs(60), 2, Duration::from_secs(30));

        assert!(budget.try_acquire().is_ok());
        assert!(budget.try_acquire().is_ok());

        let retry = budget.try_acquire().expect_err("third request must be rejected");
        assert_eq!(retry, Duration::from_secs(30));
    }

    #[test]
    fn budget_is_shared_across_clones() {
        let budget = RateBudget::new(Duration::from_secs(60), 1, Duration::from_secs(5));
        let clone = budget.clone();

        assert!(budget.try_acquire().is_ok());
        assert!(clone.try_acquire().is_err());
    }
}
