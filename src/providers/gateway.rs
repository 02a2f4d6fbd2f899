//! Request pipeline: Cache -> Rate Limiter -> Transport
//!
//! `RpcGateway` owns the process-wide cache and serial queue. It is built once
//! by the composition root and handed to `EndpointClient` behind an `Arc`;
//! nothing else mutates the cache or the queue.
//!
//! Identical reads queued at the same time reach the transport once: the cache
//! is checked again when each queued call gets its turn.
//!
//! HTTP 429 handling: one fixed cooldown, one retry through the queue, then
//! the `RPC_RATE_LIMITED` error is surfaced. No tight retry loops.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::PulseConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::providers::transport::{ApiRequest, CachePolicy, HttpTransport, Transport};
use crate::utils::cache::{CacheKey, CacheStats, ResponseCache};
use crate::utils::rate_limiter::RateLimiter;

pub struct RpcGateway<T: Transport = HttpTransport> {
    transport: Arc<T>,
    cache: ResponseCache,
    limiter: RateLimiter,
    rate_limit_cooldown: Duration,
}

impl RpcGateway<HttpTransport> {
    /// Production pipeline over reqwest
    pub fn from_config(config: &PulseConfig) -> AppResult<Self> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> RpcGateway<T> {
    pub fn new(transport: T, config: &PulseConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            cache: ResponseCache::new(config.cache_ttl),
            limiter: RateLimiter::new(config.min_interval, config.queue_task_timeout),
            rate_limit_cooldown: config.rate_limit_cooldown,
        }
    }

    /// Fetch a decoded JSON payload, serving cacheable reads from the cache
    pub async fn fetch(&self, request: &ApiRequest) -> AppResult<serde_json::Value> {
        let cacheable = request.cache == CachePolicy::Cached;
        let key = request.cache_key();

        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                return Ok(hit);
            }
        }

        match self.dispatch(request, &key, cacheable).await {
            Err(e) if e.code == ErrorCode::RpcRateLimited => {
                warn!(
                    "⏳ Rate limited on {}, cooling down {}ms before one retry",
                    request.url,
                    self.rate_limit_cooldown.as_millis()
                );
                tokio::time::sleep(self.rate_limit_cooldown).await;
                self.dispatch(request, &key, cacheable).await
            }
            other => other,
        }
    }

    /// One queued call. A duplicate read that waited behind an identical one
    /// is answered from the entry that call stored, without a dispatch.
    async fn dispatch(&self, request: &ApiRequest, key: &CacheKey, cacheable: bool) -> AppResult<serde_json::Value> {
        let transport = self.transport.clone();
        let cache = self.cache.clone();
        let owned = request.clone();
        let store_key = key.clone();

        let operation = async move {
            let payload = transport.send(&owned).await?;
            // stored before the queue is released
            if cacheable {
                cache.put(store_key, payload.clone());
            }
            Ok::<_, AppError>(payload)
        };
        let settled = || if cacheable { self.cache.recheck(key) } else { None };

        let result = self.limiter.enqueue_unless(settled, operation).await;
        if let Err(ref e) = result {
            debug!("🌐 {} failed: {}", request.url, e);
        }
        result
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn dispatched(&self) -> u64 {
        self.limiter.dispatched()
    }
}
