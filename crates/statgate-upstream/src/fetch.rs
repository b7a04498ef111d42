//! The injected upstream fetch contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use statgate_core::ErrorClass;
use tokio_util::sync::CancellationToken;

/// Logical provider endpoints the facade calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PlayerSummary,
    PlayerStats,
    PlayerAchievements,
    GameSchema,
    GlobalAchievementPercentages,
    ResolveVanity,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::PlayerSummary => "player_summary",
            Endpoint::PlayerStats => "player_stats",
            Endpoint::PlayerAchievements => "player_achievements",
            Endpoint::GameSchema => "game_schema",
            Endpoint::GlobalAchievementPercentages => "global_percentages",
            Endpoint::ResolveVanity => "resolve_vanity",
        }
    }
}

/// One upstream call: endpoint plus query parameters.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub endpoint: Endpoint,
    pub params: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: Vec::new(),
        }
    }

    pub fn param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }
}

/// A successful upstream response body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub body: Value,
    pub fetched_at: DateTime<Utc>,
}

/// The upstream transport, injected into the gateway.
///
/// Implementations classify every failure into an [`ErrorClass`]; rate
/// limit responses carry the parsed `Retry-After` / `X-RateLimit-Reset`
/// hint inside the error.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(
        &self,
        request: FetchRequest,
        token: &CancellationToken,
    ) -> Result<FetchResponse, ErrorClass>;
}
