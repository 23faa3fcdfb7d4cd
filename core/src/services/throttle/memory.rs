//! Process-local attempt counters

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tfa_shared::ThrottleConfig;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::value_objects::RequestContext;
use crate::errors::DomainResult;

use super::{LockoutResponse, ThrottleGuard};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    ends_at: Instant,
}

/// Fixed-window attempt counter held in memory
#[derive(Clone)]
pub struct InMemoryThrottle {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_attempts: u32,
    decay: Duration,
}

impl Default for InMemoryThrottle {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

impl InMemoryThrottle {
    pub fn new(max_attempts: u32, decay_seconds: u64) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_attempts,
            decay: Duration::from_secs(decay_seconds),
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(config.max_attempts, config.decay_seconds)
    }

    /// Failed attempts currently counted for `ctx`
    pub async fn attempts(&self, ctx: &RequestContext) -> u32 {
        let windows = self.windows.lock().await;
        windows
            .get(&ctx.throttle_key())
            .filter(|w| Instant::now() < w.ends_at)
            .map_or(0, |w| w.count)
    }

    /// Keys with a counter still held in memory
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

fn purge_expired(windows: &mut HashMap<String, Window>, now: Instant) {
    windows.retain(|_, w| now < w.ends_at);
}

#[async_trait]
impl ThrottleGuard for InMemoryThrottle {
    async fn too_many_attempts(&self, ctx: &RequestContext) -> DomainResult<bool> {
        let mut windows = self.windows.lock().await;
        purge_expired(&mut windows, Instant::now());
        let count = windows.get(&ctx.throttle_key()).map_or(0, |w| w.count);
        Ok(count >= self.max_attempts)
    }

    async fn record_failed_attempt(&self, ctx: &RequestContext) -> DomainResult<()> {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        purge_expired(&mut windows, now);
        let window = windows.entry(ctx.throttle_key()).or_insert(Window {
            count: 0,
            ends_at: now + self.decay,
        });
        window.count += 1;

        tracing::debug!(
            key = %ctx.throttle_key(),
            attempts = window.count,
            event = "failed_attempt_recorded",
            "Recorded failed login attempt"
        );
        Ok(())
    }

    async fn clear_attempts(&self, ctx: &RequestContext) -> DomainResult<()> {
        self.windows.lock().await.remove(&ctx.throttle_key());
        Ok(())
    }

    async fn lockout_response(&self, ctx: &RequestContext) -> DomainResult<LockoutResponse> {
        let windows = self.windows.lock().await;
        let remaining = windows
            .get(&ctx.throttle_key())
            .map(|w| w.ends_at.saturating_duration_since(Instant::now()))
            .unwrap_or_default();

        // Whole seconds, rounded up
        let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        Ok(LockoutResponse::new(seconds.max(1)))
    }
}
