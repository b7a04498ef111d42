//! reqwest-backed implementation of [`Fetch`].

use crate::fetch::{Endpoint, Fetch, FetchRequest, FetchResponse};
use crate::hints;
use async_trait::async_trait;
use chrono::Utc;
use statgate_core::ErrorClass;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    pub base_url: String,
    pub api_key: String,
    /// Provider app id the stats and achievements belong to.
    pub app_id: u64,
    /// Per-attempt timeout; elapses to [`ErrorClass::Timeout`].
    pub timeout: Duration,
}

impl HttpFetcherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: String::from("https://api.steampowered.com"),
            api_key: api_key.into(),
            app_id: 381_210,
            timeout: Duration::from_secs(10),
        }
    }
}

/// The real upstream transport.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: HttpFetcherConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpFetcherConfig) -> Result<Self, ErrorClass> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ErrorClass::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client, config })
    }

    fn path_of(endpoint: Endpoint) -> &'static str {
        match endpoint {
            Endpoint::PlayerSummary => "/ISteamUser/GetPlayerSummaries/v2/",
            Endpoint::PlayerStats => "/ISteamUserStats/GetUserStatsForGame/v2/",
            Endpoint::PlayerAchievements => "/ISteamUserStats/GetPlayerAchievements/v1/",
            Endpoint::GameSchema => "/ISteamUserStats/GetSchemaForGame/v2/",
            Endpoint::GlobalAchievementPercentages => {
                "/ISteamUserStats/GetGlobalAchievementPercentagesForApp/v2/"
            }
            Endpoint::ResolveVanity => "/ISteamUser/ResolveVanityURL/v1/",
        }
    }

    /// Endpoints that authenticate; the rarity endpoint is public and
    /// keyless.
    fn needs_key(endpoint: Endpoint) -> bool {
        !matches!(endpoint, Endpoint::GlobalAchievementPercentages)
    }

    fn classify_status(status: reqwest::StatusCode, response: &reqwest::Response) -> ErrorClass {
        match status.as_u16() {
            404 => ErrorClass::NotFound("resource not found upstream".into()),
            429 => {
                let header = |name: &str| {
                    response
                        .headers()
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string)
                };
                let retry_after = header("retry-after").and_then(|v| hints::parse_retry_after(&v));
                let reset = header("x-ratelimit-reset")
                    .and_then(|v| hints::parse_rate_limit_reset(&v));
                ErrorClass::RateLimited {
                    hint: hints::combine(retry_after, reset),
                }
            }
            code if (500..600).contains(&code) => ErrorClass::Upstream(code),
            401 | 403 => ErrorClass::Validation("upstream rejected credentials or access".into()),
            code => ErrorClass::Validation(format!("upstream rejected request (status {code})")),
        }
    }

    fn classify_transport(error: reqwest::Error) -> ErrorClass {
        if error.is_timeout() {
            ErrorClass::Timeout
        } else if error.is_connect() || error.is_request() {
            ErrorClass::Network(error.to_string())
        } else if error.is_decode() {
            ErrorClass::Internal(format!("upstream body not decodable: {error}"))
        } else {
            ErrorClass::Network(error.to_string())
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(
        &self,
        request: FetchRequest,
        token: &CancellationToken,
    ) -> Result<FetchResponse, ErrorClass> {
        let url = format!("{}{}", self.config.base_url, Self::path_of(request.endpoint));

        let mut query: Vec<(String, String)> = Vec::with_capacity(request.params.len() + 2);
        if Self::needs_key(request.endpoint) {
            query.push(("key".into(), self.config.api_key.clone()));
        }
        match request.endpoint {
            Endpoint::PlayerStats | Endpoint::PlayerAchievements | Endpoint::GameSchema => {
                query.push(("appid".into(), self.config.app_id.to_string()));
            }
            Endpoint::GlobalAchievementPercentages => {
                query.push(("gameid".into(), self.config.app_id.to_string()));
            }
            _ => {}
        }
        query.extend(request.params.iter().cloned());

        let send = self.client.get(&url).query(&query).send();
        let response = tokio::select! {
            _ = token.cancelled() => return Err(ErrorClass::Cancelled),
            result = send => result.map_err(Self::classify_transport)?,
        };

        let status = response.status();
        if !status.is_success() {
            let class = Self::classify_status(status, &response);
            tracing::debug!(
                endpoint = request.endpoint.as_str(),
                status = status.as_u16(),
                error = %class,
                "upstream call failed"
            );
            return Err(class);
        }

        let body = tokio::select! {
            _ = token.cancelled() => return Err(ErrorClass::Cancelled),
            body = response.json::<serde_json::Value>() => body.map_err(Self::classify_transport)?,
        };

        Ok(FetchResponse {
            body,
            fetched_at: Utc::now(),
        })
    }
}
