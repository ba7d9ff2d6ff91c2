//! Per-client token-bucket rate limiting
//!
//! Each client (keyed by peer IP) gets a bucket holding up to `burst`
//! tokens that refills at `rps` tokens per second. A request spends one
//! token or is rejected with 429. Clients that stop sending requests are
//! dropped by a background sweep so the map does not grow without bound.
//!
//! Credit is tracked as a [`Duration`]: one token is worth `1 / rps`
//! seconds, so refill is plain time arithmetic on [`tokio::time::Instant`].

use axum::{
    extract::{ConnectInfo, Request},
    response::{IntoResponse, Response},
};
use marquee_common::error::env_or;
use marquee_common::MarqueeError;
use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, Weak},
    task::{Context, Poll},
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tower::{Layer, Service};

use crate::error::AppError;

/// Default sustained requests per second per client.
pub const DEFAULT_LIMITER_RPS: f64 = 2.0;

/// Default number of requests a fresh client may make at once.
pub const DEFAULT_LIMITER_BURST: u32 = 4;

/// Default seconds between idle-client sweeps.
pub const DEFAULT_LIMITER_SWEEP_INTERVAL_SECS: u64 = 60;

/// Clients idle for this many sweep intervals are evicted.
pub const IDLE_SWEEP_MULTIPLIER: u32 = 3;

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// Tokens added per second
    pub rps: f64,
    /// Bucket capacity
    pub burst: u32,
    /// When false every request is admitted and no state is kept
    pub enabled: bool,
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rps: DEFAULT_LIMITER_RPS,
            burst: DEFAULT_LIMITER_BURST,
            enabled: true,
            sweep_interval: Duration::from_secs(DEFAULT_LIMITER_SWEEP_INTERVAL_SECS),
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> marquee_common::Result<Self> {
        Ok(Self {
            rps: env_or("LIMITER_RPS", DEFAULT_LIMITER_RPS)?,
            burst: env_or("LIMITER_BURST", DEFAULT_LIMITER_BURST)?,
            enabled: env_or("LIMITER_ENABLED", true)?,
            sweep_interval: Duration::from_secs(env_or(
                "LIMITER_SWEEP_INTERVAL",
                DEFAULT_LIMITER_SWEEP_INTERVAL_SECS,
            )?),
        })
    }

    pub fn validate(&self) -> marquee_common::Result<()> {
        if !(self.rps.is_finite() && self.rps > 0.0) {
            return Err(MarqueeError::config("LIMITER_RPS must be a positive number"));
        }
        if self.burst == 0 {
            return Err(MarqueeError::config("LIMITER_BURST must be at least 1"));
        }
        if self.sweep_interval.is_zero() {
            return Err(MarqueeError::config("LIMITER_SWEEP_INTERVAL must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Bucket {
    /// Unspent time, at most `capacity`
    credit: Duration,
    last_refill: Instant,
    last_seen: Instant,
}

#[derive(Debug)]
struct Inner {
    config: RateLimitConfig,
    per_token: Duration,
    capacity: Duration,
    clients: Mutex<HashMap<String, Bucket>>,
}

impl Inner {
    fn clients(&self) -> MutexGuard<'_, HashMap<String, Bucket>> {
        self.clients.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn idle_threshold(&self) -> Duration {
        self.config.sweep_interval.saturating_mul(IDLE_SWEEP_MULTIPLIER)
    }

    fn admit(&self, identity: &str, now: Instant) -> bool {
        let mut clients = self.clients();
        let bucket = clients.entry(identity.to_string()).or_insert_with(|| Bucket {
            credit: self.capacity,
            last_refill: now,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.credit = bucket.credit.saturating_add(elapsed).min(self.capacity);
        bucket.last_refill = now;
        bucket.last_seen = now;

        if bucket.credit >= self.per_token {
            bucket.credit -= self.per_token;
            true
        } else {
            false
        }
    }

    fn sweep(&self, now: Instant) -> usize {
        let threshold = self.idle_threshold();
        let mut clients = self.clients();
        let before = clients.len();
        clients.retain(|_, bucket| now.saturating_duration_since(bucket.last_seen) <= threshold);
        before - clients.len()
    }
}

/// Shared handle to the per-client buckets
#[derive(Debug, Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let per_token = Duration::try_from_secs_f64(1.0 / config.rps).unwrap_or(Duration::MAX);
        let capacity = per_token.saturating_mul(config.burst.max(1));

        Self {
            inner: Arc::new(Inner {
                config,
                per_token,
                capacity,
                clients: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.config.enabled
    }

    /// Whether `identity` may make a request now
    pub fn admit(&self, identity: &str) -> bool {
        self.admit_at(identity, Instant::now())
    }

    pub fn admit_at(&self, identity: &str, now: Instant) -> bool {
        if !self.is_enabled() {
            return true;
        }
        self.inner.admit(identity, now)
    }

    /// Drops clients idle longer than [`idle_threshold`](Self::idle_threshold);
    /// returns how many were dropped
    pub fn sweep_at(&self, now: Instant) -> usize {
        self.inner.sweep(now)
    }

    pub fn idle_threshold(&self) -> Duration {
        self.inner.idle_threshold()
    }

    pub fn tracked_clients(&self) -> usize {
        self.inner.clients().len()
    }

    /// Starts the periodic idle sweep
    ///
    /// The task holds only a weak reference and exits once every
    /// `RateLimiter` handle is gone. Abort the handle on shutdown.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.config.sweep_interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };

                let evicted = inner.sweep(Instant::now());
                if evicted > 0 {
                    tracing::debug!(evicted, "Evicted idle rate limit clients");
                }
            }
        })
    }

    pub fn layer(&self) -> RateLimitLayer {
        RateLimitLayer::new(self.clone())
    }
}

/// Rate limiting layer
#[derive(Debug, Clone)]
pub struct RateLimitLayer {
    limiter: RateLimiter,
}

impl RateLimitLayer {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Rate limiting middleware service
#[derive(Debug, Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    limiter: RateLimiter,
}

impl<S> Service<Request> for RateLimitMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            if !limiter.is_enabled() {
                return inner.call(request).await;
            }

            let Some(ConnectInfo(peer)) = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .copied()
            else {
                return Ok(AppError::Internal(
                    "client address unavailable for rate limiting".to_string(),
                )
                .into_response());
            };

            let client = peer.ip().to_string();
            if !limiter.admit(&client) {
                tracing::debug!(client = %client, "Rate limit exceeded");
                return Ok(AppError::RateLimited.into_response());
            }

            inner.call(request).await
        })
    }
}
