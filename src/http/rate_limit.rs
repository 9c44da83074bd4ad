//! Rate limit handling
//!
//! Parses server-reported rate limit state from response headers, and
//! provides an optional client-side throttle using the governor crate.

use chrono::{DateTime, TimeZone, Utc};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Server Rate Limit Info
// ============================================================================

/// Names of the headers carrying rate limit state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitHeaders {
    /// Requests remaining in the current window
    pub remaining: String,
    /// Requests allowed per window
    pub total: String,
    /// Window reset time, in epoch seconds
    pub reset: String,
}

impl Default for RateLimitHeaders {
    fn default() -> Self {
        Self {
            remaining: "Rate-Limit-Remaining".to_string(),
            total: "Rate-Limit-Total".to_string(),
            reset: "Rate-Limit-Reset".to_string(),
        }
    }
}

/// Rate limit state reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window
    pub remaining: i64,
    /// Requests allowed per window
    pub total: i64,
    /// When the window resets
    pub reset_at: DateTime<Utc>,
}

impl RateLimitInfo {
    /// Parse rate limit info from response headers.
    ///
    /// Returns `None` unless all three headers are present and numeric.
    pub fn from_headers(headers: &HeaderMap, names: &RateLimitHeaders) -> Option<Self> {
        let remaining = header_str(headers, &names.remaining)?.parse::<i64>().ok()?;
        let total = header_str(headers, &names.total)?.parse::<i64>().ok()?;
        let reset_at = parse_epoch_seconds(header_str(headers, &names.reset)?)?;

        Some(Self {
            remaining,
            total,
            reset_at,
        })
    }

    /// Time left until the window resets, if it is still in the future
    pub fn wait_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.reset_at - now).to_std().ok().filter(|d| !d.is_zero())
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().map(str::trim)
}

/// Parse a non-negative epoch timestamp in seconds (integral or fractional)
fn parse_epoch_seconds(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = value.parse::<u64>() {
        return Utc.timestamp_opt(i64::try_from(secs).ok()?, 0).single();
    }

    let secs = value.parse::<f64>().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let millis = (secs * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

// ============================================================================
// Client-side Throttle
// ============================================================================

/// Configuration for client-side throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl ThrottleConfig {
    /// Create a new throttle config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token bucket throttle applied before each outgoing request
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl Throttle {
    /// Create a new throttle with the given config
    pub fn new(config: &ThrottleConfig) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }

    /// Try to acquire a permit, returning immediately
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle").finish()
    }
}
