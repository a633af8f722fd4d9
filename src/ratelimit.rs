use anyhow::Context;
use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use std::{num::NonZeroU32, time::Duration};

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

/// Gate in front of every outbound request. Callers await `wait_until_ready`
/// and are released no faster than both quotas allow.
pub struct RateLimiter {
    req_per_period: SpecificGovernorRateLimiter,
    gap_between_req: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new(
        requests_per_period: NonZeroU32,
        period: Duration,
        min_gap: Duration,
    ) -> anyhow::Result<Self> {
        // N calls per period on average, allowing a burst of N.
        let replenish = period / requests_per_period.get();
        let req_per_period = GovernorRateLimiter::direct(
            Quota::with_period(replenish)
                .context("rate limit period must be non-zero")?
                .allow_burst(requests_per_period),
        );

        // No two requests closer than the gap. A zero gap is treated as 1ms.
        let gap_between_req = GovernorRateLimiter::direct(
            Quota::with_period(min_gap.max(Duration::from_millis(1)))
                .context("request gap must be non-zero")?,
        );

        Ok(RateLimiter {
            req_per_period,
            gap_between_req,
        })
    }

    pub async fn wait_until_ready(&self) {
        // The bucket goes first so queued callers are serialized by the gap
        // limiter after they clear the per-period quota.
        self.req_per_period.until_ready().await;
        self.gap_between_req.until_ready().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonzero_ext::nonzero;
    use std::time::Instant;

    #[test]
    fn zero_period_is_rejected() {
        let limiter = RateLimiter::new(nonzero!(5u32), Duration::ZERO, Duration::from_millis(10));
        assert!(limiter.is_err());
    }

    #[tokio::test]
    async fn enforces_gap_between_requests() {
        let limiter = RateLimiter::new(
            nonzero!(100u32),
            Duration::from_secs(1),
            Duration::from_millis(50),
        )
        .unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait_until_ready().await;
        }
        // First call passes immediately, the next two wait one gap each.
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
