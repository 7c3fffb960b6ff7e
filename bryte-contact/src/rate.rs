use async_trait::async_trait;
use bryte_config::RateLimitConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// At most `max_requests` admitted submissions per key inside any `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatePolicy {
    pub window: Duration,
    pub max_requests: u32,
}

impl RatePolicy {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
        }
    }
}

impl From<&RateLimitConfig> for RatePolicy {
    fn from(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.window(), cfg.max_requests)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
    /// Recorded; `remaining` more submissions fit in the current window.
    Allowed { remaining: u32 },
    /// Rejected and not recorded; the oldest hit leaves the window after `retry_after`.
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_limited(&self) -> bool {
        matches!(self, RateDecision::Limited { .. })
    }
}

/// Per-key sliding-window store. Injected into the handler so a shared
/// backend can replace the in-process map.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn check(&self, key: &str, now: Instant) -> RateDecision;
}

/// Process-local store: one timestamp list per key.
///
/// Expired timestamps are dropped whenever a key is checked; keys that go idle
/// are only removed by [`InMemoryRateStore::sweep`].
#[derive(Debug)]
pub struct InMemoryRateStore {
    policy: RatePolicy,
    hits: DashMap<String, Vec<Instant>>,
}

impl InMemoryRateStore {
    pub fn new(policy: RatePolicy) -> Self {
        Self {
            policy,
            hits: DashMap::new(),
        }
    }

    pub fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.hits.len()
    }

    fn in_window(&self, hit: Instant, now: Instant) -> bool {
        now.saturating_duration_since(hit) < self.policy.window
    }

    /// Drop expired timestamps everywhere and forget keys left with none.
    /// Returns the number of keys removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.hits.len();
        self.hits.retain(|_, hits| {
            hits.retain(|t| self.in_window(*t, now));
            !hits.is_empty()
        });
        before.saturating_sub(self.hits.len())
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn check(&self, key: &str, now: Instant) -> RateDecision {
        let mut hits = self.hits.entry(key.to_string()).or_default();
        hits.retain(|t| self.in_window(*t, now));

        let max = self.policy.max_requests as usize;
        if hits.len() >= max {
            let retry_after = hits
                .first()
                .map(|oldest| self.policy.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.policy.window);
            return RateDecision::Limited { retry_after };
        }
        hits.push(now);
        RateDecision::Allowed {
            remaining: (max - hits.len()) as u32,
        }
    }
}

/// Periodically evict idle keys from `store`.
pub fn spawn_sweeper(store: Arc<InMemoryRateStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = store.sweep(Instant::now());
            if evicted > 0 {
                tracing::debug!(evicted, remaining = store.tracked_keys(), "contact.rate.sweep");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(max: u32) -> InMemoryRateStore {
        InMemoryRateStore::new(RatePolicy::new(Duration::from_secs(60), max))
    }

    #[tokio::test]
    async fn admits_up_to_the_limit() {
        let store = store(2);
        let t0 = Instant::now();
        assert_eq!(store.check("a", t0).await, RateDecision::Allowed { remaining: 1 });
        assert_eq!(store.check("a", t0).await, RateDecision::Allowed { remaining: 0 });
        assert!(store.check("a", t0).await.is_limited());
        assert!(!store.check("b", t0).await.is_limited());
    }

    #[tokio::test]
    async fn window_slides() {
        let store = store(2);
        let t0 = Instant::now();
        store.check("a", t0).await;
        store.check("a", t0 + Duration::from_secs(30)).await;

        let limited = store.check("a", t0 + Duration::from_secs(45)).await;
        assert_eq!(limited, RateDecision::Limited { retry_after: Duration::from_secs(15) });

        // first hit has aged out, second is still inside
        let decision = store.check("a", t0 + Duration::from_secs(60)).await;
        assert_eq!(decision, RateDecision::Allowed { remaining: 0 });
    }

    #[tokio::test]
    async fn rejected_requests_are_not_recorded() {
        let store = store(1);
        let t0 = Instant::now();
        store.check("a", t0).await;
        for s in 1..50 {
            store.check("a", t0 + Duration::from_secs(s)).await;
        }
        assert!(!store.check("a", t0 + Duration::from_secs(60)).await.is_limited());
    }

    #[tokio::test]
    async fn sweep_forgets_idle_keys() {
        let store = store(5);
        let t0 = Instant::now();
        store.check("old", t0).await;
        store.check("fresh", t0 + Duration::from_secs(50)).await;
        assert_eq!(store.sweep(t0 + Duration::from_secs(70)), 1);
        assert_eq!(store.tracked_keys(), 1);
        assert_eq!(store.sweep(t0 + Duration::from_secs(200)), 1);
        assert_eq!(store.tracked_keys(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_runs_on_its_interval() {
        let store = Arc::new(store(5));
        store.check("a", Instant::now()).await;
        let handle = spawn_sweeper(store.clone(), Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(store.tracked_keys(), 0);
        handle.abort();
    }

    #[test]
    fn policy_from_config() {
        let cfg = RateLimitConfig {
            window_secs: 900,
            max_requests: 5,
        };
        assert_eq!(
            RatePolicy::from(&cfg),
            RatePolicy::new(Duration::from_secs(900), 5)
        );
    }
}
