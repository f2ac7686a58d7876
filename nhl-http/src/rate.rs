//! Token-bucket rate limiter shared by every client talking to the NHL hosts.
//!
//! Semantics:
//! - the bucket starts full (`burst` tokens) and refills at `qps` tokens/sec;
//! - [`RateLimiter::acquire`] takes one token, sleeping for the deficit when
//!   the bucket is empty;
//! - a non-positive `qps` disables limiting.
//!
//! Clones share the same bucket, so one limiter handed to several
//! [`HttpClient`](crate::HttpClient)s caps their combined request rate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::{sleep, Instant};

#[derive(Clone, Copy, Debug)]
struct BucketCfg {
    qps: f64,
    burst: f64,
}

#[derive(Debug)]
struct BucketState {
    cfg: BucketCfg,
    tokens: f64,
    last: Instant,
}

impl BucketState {
    fn new(cfg: BucketCfg, now: Instant) -> Self {
        Self {
            cfg,
            tokens: cfg.burst,
            last: now,
        }
    }

    /// Wait needed before `need` tokens are available; the tokens are
    /// reserved immediately so concurrent callers queue behind each other.
    fn needed_wait(&mut self, need: f64, now: Instant) -> Duration {
        if self.cfg.qps <= 0.0 || !self.cfg.qps.is_finite() {
            return Duration::ZERO;
        }

        let dt = now.saturating_duration_since(self.last).as_secs_f64();
        self.last = now;
        self.tokens = (self.tokens + dt * self.cfg.qps).min(self.cfg.burst);

        // May go negative: the debt is repaid by later refills.
        self.tokens -= need;
        if self.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-self.tokens / self.cfg.qps)
        }
    }
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

impl RateLimiter {
    /// `qps` steady rate, `burst` bucket capacity (at least one token).
    pub fn new(qps: f64, burst: u32) -> Self {
        let cfg = BucketCfg {
            qps,
            burst: f64::from(burst.max(1)),
        };
        Self {
            state: Arc::new(Mutex::new(BucketState::new(cfg, Instant::now()))),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0.0, 1)
    }

    /// Take one token, sleeping if none is available. Returns the time waited.
    pub async fn acquire(&self) -> Duration {
        self.acquire_n(1).await
    }

    pub async fn acquire_n(&self, cost: u32) -> Duration {
        let wait = {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            state.needed_wait(f64::from(cost), Instant::now())
        };
        if !wait.is_zero() {
            tracing::trace!(target: "rate", wait_ms = wait.as_millis() as u64, cost, "rate.wait");
            sleep(wait).await;
        }
        wait
    }
}
