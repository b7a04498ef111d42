//! Concurrent fan-out of gateway calls for composite requests.

use crate::gateway::{DataSource, Sourced};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Serialize;
use statgate_core::ErrorClass;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

type OpFn = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, Result<Sourced, ErrorClass>> + Send>;

/// One planned sub-fetch of a composite request.
pub struct Op {
    name: &'static str,
    /// Critical failures fail the whole composite; optional ones degrade
    /// to a partial payload.
    critical: bool,
    /// Per-source timeout override on top of the overall deadline.
    timeout: Option<Duration>,
    run: OpFn,
}

impl Op {
    pub fn critical<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<Sourced, ErrorClass>> + Send + 'static,
    {
        Self {
            name,
            critical: true,
            timeout: None,
            run: Box::new(move |token| Box::pin(run(token))),
        }
    }

    pub fn optional<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<Sourced, ErrorClass>> + Send + 'static,
    {
        Self {
            name,
            critical: false,
            timeout: None,
            run: Box::new(move |token| Box::pin(run(token))),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Per-source status for the `data_sources` response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct SourceStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One settled sub-fetch.
#[derive(Debug)]
pub struct CompletedOp {
    pub name: &'static str,
    pub critical: bool,
    pub result: Result<Sourced, ErrorClass>,
}

impl CompletedOp {
    pub fn status(&self) -> SourceStatus {
        match &self.result {
            Ok(sourced) => SourceStatus {
                success: true,
                source: Some(sourced.source.as_str()),
                fetched_at: Some(sourced.fetched_at),
                error: None,
            },
            Err(error) => SourceStatus {
                success: false,
                source: match error {
                    ErrorClass::Upstream(_) => Some(DataSource::Fallback.as_str()),
                    _ => None,
                },
                fetched_at: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// All sub-fetches of a composite, in registration order.
#[derive(Debug)]
pub struct Composite {
    pub parts: Vec<CompletedOp>,
}

impl Composite {
    pub fn part(&self, name: &str) -> Option<&CompletedOp> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn value(&self, name: &str) -> Option<&Sourced> {
        self.part(name).and_then(|p| p.result.as_ref().ok())
    }

    /// Registration-ordered `(name, status)` pairs for the envelope.
    pub fn statuses(&self) -> Vec<(&'static str, SourceStatus)> {
        self.parts.iter().map(|p| (p.name, p.status())).collect()
    }
}

/// Runs composite fan-outs under one overall deadline.
pub struct ParallelFetcher {
    overall_deadline: Duration,
}

impl ParallelFetcher {
    pub fn new(overall_deadline: Duration) -> Self {
        Self { overall_deadline }
    }

    /// Starts every op concurrently and waits for all to settle.
    ///
    /// Results come back in registration order regardless of completion
    /// order. A critical failure fails the composite with that error (all
    /// ops are still drained first so cancellation is clean).
    pub async fn run(
        &self,
        token: &CancellationToken,
        ops: Vec<Op>,
    ) -> Result<Composite, ErrorClass> {
        let deadline = tokio::time::Instant::now() + self.overall_deadline;
        let shared = token.child_token();

        let futures = ops.into_iter().map(|op| {
            let op_token = shared.child_token();
            let per_op = op.timeout;
            let name = op.name;
            let critical = op.critical;
            let fut = (op.run)(op_token.clone());
            async move {
                let bounded = async {
                    match per_op {
                        Some(t) => match tokio::time::timeout(t, fut).await {
                            Ok(result) => result,
                            Err(_) => {
                                op_token.cancel();
                                Err(ErrorClass::Timeout)
                            }
                        },
                        None => fut.await,
                    }
                };
                let result = match tokio::time::timeout_at(deadline, bounded).await {
                    Ok(result) => result,
                    Err(_) => {
                        op_token.cancel();
                        Err(ErrorClass::Timeout)
                    }
                };
                CompletedOp {
                    name,
                    critical,
                    result,
                }
            }
        });

        let parts = futures::future::join_all(futures).await;

        if let Some(failed) = parts
            .iter()
            .find(|p| p.critical && p.result.is_err())
        {
            let error = match &failed.result {
                Err(e) => e.clone(),
                Ok(_) => ErrorClass::Internal("critical op in impossible state".into()),
            };
            tracing::warn!(source = failed.name, %error, "critical sub-fetch failed, composite fails");
            shared.cancel();
            return Err(error);
        }

        Ok(Composite { parts })
    }
}
