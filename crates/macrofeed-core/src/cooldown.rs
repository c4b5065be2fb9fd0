//! Per-provider failure bookkeeping between orchestration cycles.
//!
//! Three failure classes, three policies: `RateLimited` puts the provider
//! on an exponential cooldown so the next cycles skip it until the window
//! expires; `Schema` marks the provider degraded for the rest of the
//! session; `Unavailable` carries no penalty and is retried next cycle.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::provider_policy::BackoffPolicy;
use crate::ProviderId;

/// Outcome of asking the gate whether a provider may be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    CoolingDown { remaining: Duration },
    Degraded,
}

#[derive(Debug, Default)]
struct ProviderState {
    cooldown_until: Option<Instant>,
    rate_limit_strikes: u32,
    degraded: bool,
}

/// Thread-safe gate shared by all orchestration requests in a session.
pub struct ProviderGate {
    backoffs: HashMap<ProviderId, BackoffPolicy>,
    inner: Mutex<HashMap<ProviderId, ProviderState>>,
}

impl ProviderGate {
    pub fn new(backoffs: HashMap<ProviderId, BackoffPolicy>) -> Self {
        Self {
            backoffs,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_defaults() -> Self {
        let backoffs = ProviderId::ALL
            .into_iter()
            .map(|provider| {
                (
                    provider,
                    crate::provider_policy::ProviderPolicy::default_for(provider).backoff,
                )
            })
            .collect();
        Self::new(backoffs)
    }

    pub fn decide(&self, provider: ProviderId) -> GateDecision {
        let mut inner = self.inner.lock().expect("provider gate lock is not poisoned");
        let state = inner.entry(provider).or_default();

        if state.degraded {
            return GateDecision::Degraded;
        }

        match state.cooldown_until {
            Some(until) => {
                let now = Instant::now();
                if now >= until {
                    state.cooldown_until = None;
                    GateDecision::Allowed
                } else {
                    GateDecision::CoolingDown {
                        remaining: until - now,
                    }
                }
            }
            None => GateDecision::Allowed,
        }
    }

    /// Record a rate-limit rejection and return the cooldown applied.
    ///
    /// Consecutive rejections grow the window exponentially per the
    /// provider's backoff policy.
    pub fn record_rate_limited(&self, provider: ProviderId) -> Duration {
        let backoff = self.backoff_for(provider);
        let mut inner = self.inner.lock().expect("provider gate lock is not poisoned");
        let state = inner.entry(provider).or_default();
        let delay = backoff.delay_for(state.rate_limit_strikes);
        state.rate_limit_strikes = state.rate_limit_strikes.saturating_add(1);
        state.cooldown_until = Some(Instant::now() + delay);
        delay
    }

    /// Mark a provider degraded for the rest of the session (schema drift).
    pub fn mark_degraded(&self, provider: ProviderId) {
        let mut inner = self.inner.lock().expect("provider gate lock is not poisoned");
        inner.entry(provider).or_default().degraded = true;
    }

    /// A successful call clears the rate-limit strike count.
    pub fn record_success(&self, provider: ProviderId) {
        let mut inner = self.inner.lock().expect("provider gate lock is not poisoned");
        let state = inner.entry(provider).or_default();
        state.rate_limit_strikes = 0;
        state.cooldown_until = None;
    }

    pub fn is_degraded(&self, provider: ProviderId) -> bool {
        let inner = self.inner.lock().expect("provider gate lock is not poisoned");
        inner
            .get(&provider)
            .map(|state| state.degraded)
            .unwrap_or(false)
    }

    fn backoff_for(&self, provider: ProviderId) -> BackoffPolicy {
        self.backoffs
            .get(&provider)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_with(initial: Duration) -> ProviderGate {
        let backoff = BackoffPolicy {
            initial_delay: initial,
            max_delay: initial * 8,
            multiplier: 2.0,
            jitter: false,
        };
        ProviderGate::new(
            ProviderId::ALL
                .into_iter()
                .map(|provider| (provider, backoff.clone()))
                .collect(),
        )
    }

    #[test]
    fn rate_limit_opens_cooldown_window() {
        let gate = gate_with(Duration::from_secs(60));

        assert_eq!(gate.decide(ProviderId::Fred), GateDecision::Allowed);
        let applied = gate.record_rate_limited(ProviderId::Fred);
        assert_eq!(applied, Duration::from_secs(60));
        assert!(matches!(
            gate.decide(ProviderId::Fred),
            GateDecision::CoolingDown { .. }
        ));
        // Other providers are unaffected.
        assert_eq!(gate.decide(ProviderId::WorldBank), GateDecision::Allowed);
    }

    #[test]
    fn consecutive_rate_limits_grow_exponentially() {
        let gate = gate_with(Duration::from_secs(10));

        assert_eq!(
            gate.record_rate_limited(ProviderId::Numbeo),
            Duration::from_secs(10)
        );
        assert_eq!(
            gate.record_rate_limited(ProviderId::Numbeo),
            Duration::from_secs(20)
        );
        assert_eq!(
            gate.record_rate_limited(ProviderId::Numbeo),
            Duration::from_secs(40)
        );
    }

    #[test]
    fn cooldown_expires_and_reallows() {
        let gate = gate_with(Duration::from_millis(5));

        gate.record_rate_limited(ProviderId::OpenExchange);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(gate.decide(ProviderId::OpenExchange), GateDecision::Allowed);
    }

    #[test]
    fn success_resets_strikes() {
        let gate = gate_with(Duration::from_secs(10));

        gate.record_rate_limited(ProviderId::Fred);
        gate.record_rate_limited(ProviderId::Fred);
        gate.record_success(ProviderId::Fred);

        assert_eq!(gate.decide(ProviderId::Fred), GateDecision::Allowed);
        assert_eq!(
            gate.record_rate_limited(ProviderId::Fred),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn degraded_is_sticky_for_the_session() {
        let gate = gate_with(Duration::from_millis(1));

        gate.mark_degraded(ProviderId::Numbeo);
        assert!(gate.is_degraded(ProviderId::Numbeo));
        assert_eq!(gate.decide(ProviderId::Numbeo), GateDecision::Degraded);

        // Neither time nor success clears degradation.
        gate.record_success(ProviderId::Numbeo);
        assert_eq!(gate.decide(ProviderId::Numbeo), GateDecision::Degraded);
    }
}
