//! The upstream gateway: cache, breaker, and retry around one fetch.

use crate::fetch::{Fetch, FetchRequest};
use chrono::{DateTime, Utc};
use serde_json::Value;
use statgate_breaker::Breaker;
use statgate_cache::Cache;
use statgate_core::ErrorClass;
use statgate_retry::RetryPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Where a served value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Upstream,
    Stale,
    Fallback,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Cache => "cache",
            DataSource::Upstream => "upstream",
            DataSource::Stale => "stale",
            DataSource::Fallback => "fallback",
        }
    }
}

/// A value plus its provenance.
#[derive(Debug, Clone)]
pub struct Sourced {
    pub value: Value,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
    /// True when this came off the degradation path (stale serve).
    pub degraded: bool,
}

/// Gateway wiring: the shared cache and breaker plus per-namespace TTLs.
pub struct Gateway {
    cache: Arc<Cache>,
    breaker: Arc<Breaker>,
    retry: RetryPolicy,
    fetch: Arc<dyn Fetch>,
    ttls: HashMap<String, Duration>,
}

impl Gateway {
    pub fn new(
        cache: Arc<Cache>,
        breaker: Arc<Breaker>,
        retry: RetryPolicy,
        fetch: Arc<dyn Fetch>,
    ) -> Self {
        Self {
            cache,
            breaker,
            retry,
            fetch,
            ttls: HashMap::new(),
        }
    }

    /// Overrides the cache TTL for one namespace.
    pub fn with_namespace_ttl<N: Into<String>>(mut self, namespace: N, ttl: Duration) -> Self {
        self.ttls.insert(namespace.into(), ttl);
        self
    }

    pub fn breaker(&self) -> &Breaker {
        &self.breaker
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Serves one logical call: fresh cache hit, else a breaker-gated,
    /// retried upstream fetch with write-through; stale data only on the
    /// degradation path.
    pub async fn load(
        &self,
        namespace: &str,
        id: &str,
        request: FetchRequest,
        token: &CancellationToken,
    ) -> Result<Sourced, ErrorClass> {
        let key = format!("{namespace}:{id}");

        if let Some(found) = self.cache.get(&key) {
            return Ok(Sourced {
                value: found.value,
                source: DataSource::Cache,
                fetched_at: found.stored_at,
                degraded: false,
            });
        }

        if let Err(rejection) = self.breaker.try_acquire() {
            tracing::debug!(
                key = %statgate_core::redact_key(&key),
                %rejection,
                "breaker denied upstream call"
            );
            return match self.cache.get_stale(&key) {
                Some(found) => {
                    metrics::counter!("gateway_stale_serves_total", "namespace" => namespace.to_string())
                        .increment(1);
                    Ok(Sourced {
                        value: found.value,
                        source: DataSource::Stale,
                        fetched_at: found.stored_at,
                        degraded: true,
                    })
                }
                None => Err(ErrorClass::Upstream(503)),
            };
        }

        let outcome = self
            .retry
            .execute(token, |_attempt| {
                let fetch = Arc::clone(&self.fetch);
                let request = request.clone();
                let token = token.clone();
                async move { fetch.fetch(request, &token).await }
            })
            .await;

        match outcome {
            Ok(response) => {
                self.breaker.record_success();
                self.cache
                    .set(&key, response.body.clone(), self.ttls.get(namespace).copied());
                Ok(Sourced {
                    value: response.body,
                    source: DataSource::Upstream,
                    fetched_at: response.fetched_at,
                    degraded: false,
                })
            }
            Err(error) => {
                self.breaker.record_failure(&error);
                // Definitive upstream answers (bad id, missing player) are
                // not degradation; propagate them untouched.
                if !error.should_trip() {
                    return Err(error);
                }
                match self.cache.get_stale(&key) {
                    Some(found) => {
                        tracing::warn!(
                            key = %statgate_core::redact_key(&key),
                            %error,
                            "serving stale after upstream failure"
                        );
                        metrics::counter!("gateway_stale_serves_total", "namespace" => namespace.to_string())
                            .increment(1);
                        Ok(Sourced {
                            value: found.value,
                            source: DataSource::Stale,
                            fetched_at: found.stored_at,
                            degraded: true,
                        })
                    }
                    None => Err(error),
                }
            }
        }
    }
}
