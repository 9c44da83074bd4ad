//! ETag response cache
//!
//! Two indexes: request URI to the last validator seen for it, and validator
//! to the response body. A URI whose validator has no stored body is a miss,
//! never an error. There is no eviction; a cache lives as long as the client
//! that owns it.

use super::response::Response;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

/// Storage for conditional-request validators and their responses
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Last validator recorded for `uri`
    async fn validator_for(&self, uri: &str) -> Option<String>;

    /// Response stored under `validator`
    async fn body_for(&self, validator: &str) -> Option<Response>;

    /// Record `response` under `validator` and point `uri` at it
    async fn store(&self, uri: &str, validator: &str, response: Response);

    /// Number of stored responses
    async fn len(&self) -> usize;

    /// Whether nothing is stored
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every entry
    async fn clear(&self);

    /// Validator for `uri`, only if its response is present
    async fn usable_validator(&self, uri: &str) -> Option<String> {
        let validator = self.validator_for(uri).await?;
        if self.body_for(&validator).await.is_some() {
            Some(validator)
        } else {
            trace!(uri, validator = %validator, "Stale validator mapping, treating as miss");
            None
        }
    }
}

/// In-memory cache backed by concurrent maps
#[derive(Debug, Default)]
pub struct MemoryCache {
    validators: DashMap<String, String>,
    responses: DashMap<String, Response>,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `uri` at `validator` without storing a body
    pub fn insert_validator(&self, uri: impl Into<String>, validator: impl Into<String>) {
        self.validators.insert(uri.into(), validator.into());
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn validator_for(&self, uri: &str) -> Option<String> {
        self.validators.get(uri).map(|v| v.value().clone())
    }

    async fn body_for(&self, validator: &str) -> Option<Response> {
        self.responses.get(validator).map(|r| r.value().clone())
    }

    async fn store(&self, uri: &str, validator: &str, response: Response) {
        // Body first, so a concurrent reader never follows a URI to a missing body
        self.responses.insert(validator.to_string(), response);
        self.validators.insert(uri.to_string(), validator.to_string());
    }

    async fn len(&self) -> usize {
        self.responses.len()
    }

    async fn clear(&self) {
        self.validators.clear();
        self.responses.clear();
    }
}
