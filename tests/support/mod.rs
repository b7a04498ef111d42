//! Shared test doubles.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use statgate_core::ErrorClass;
use statgate_upstream::{Fetch, FetchRequest, FetchResponse};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A scripted upstream: plays outcomes in order, repeating the last one.
pub struct ScriptedFetch {
    calls: AtomicU32,
    script: Vec<Result<Value, ErrorClass>>,
    /// Artificial latency per call, for deadline tests.
    pub delay: Option<std::time::Duration>,
}

impl ScriptedFetch {
    pub fn new(script: Vec<Result<Value, ErrorClass>>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            script,
            delay: None,
        })
    }

    pub fn with_delay(
        script: Vec<Result<Value, ErrorClass>>,
        delay: std::time::Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            script,
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn fetch(
        &self,
        _request: FetchRequest,
        token: &CancellationToken,
    ) -> Result<FetchResponse, ErrorClass> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = token.cancelled() => return Err(ErrorClass::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        match self.script.get(n).or_else(|| self.script.last()) {
            Some(Ok(body)) => Ok(FetchResponse {
                body: body.clone(),
                fetched_at: Utc::now(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ErrorClass::Internal("empty script".into())),
        }
    }
}

/// A fetch that routes by endpoint so composite tests can script each
/// source independently.
pub struct RoutedFetch {
    routes: Vec<(statgate_upstream::Endpoint, Arc<ScriptedFetch>)>,
}

impl RoutedFetch {
    pub fn new(routes: Vec<(statgate_upstream::Endpoint, Arc<ScriptedFetch>)>) -> Arc<Self> {
        Arc::new(Self { routes })
    }
}

#[async_trait]
impl Fetch for RoutedFetch {
    async fn fetch(
        &self,
        request: FetchRequest,
        token: &CancellationToken,
    ) -> Result<FetchResponse, ErrorClass> {
        match self
            .routes
            .iter()
            .find(|(endpoint, _)| *endpoint == request.endpoint)
        {
            Some((_, scripted)) => scripted.fetch(request, token).await,
            None => Err(ErrorClass::NotFound(format!(
                "no route for {:?}",
                request.endpoint
            ))),
        }
    }
}
