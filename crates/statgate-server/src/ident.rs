//! Player identifier validation and vanity resolution.

use crate::state::AppState;
use statgate_core::ErrorClass;
use statgate_upstream::{Endpoint, FetchRequest};
use tokio_util::sync::CancellationToken;

/// The well-known prefix of 64-bit provider account ids.
const ID_PREFIX: &str = "7656119";

/// A syntactically valid player identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerIdent {
    /// 17-digit canonical id.
    Id(String),
    /// Human-chosen handle, resolvable upstream.
    Vanity(String),
}

/// Validates the raw path segment: a 17-digit id with the well-known
/// prefix, or a 3..=32 character handle of `[A-Za-z0-9_-]`.
pub fn parse_ident(raw: &str) -> Result<PlayerIdent, ErrorClass> {
    if raw.len() == 17 && raw.bytes().all(|b| b.is_ascii_digit()) {
        if raw.starts_with(ID_PREFIX) {
            return Ok(PlayerIdent::Id(raw.to_string()));
        }
        return Err(ErrorClass::Validation(
            "numeric id does not carry the provider prefix".into(),
        ));
    }
    if (3..=32).contains(&raw.len())
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Ok(PlayerIdent::Vanity(raw.to_string()));
    }
    Err(ErrorClass::Validation(
        "player id must be a 17-digit provider id or a 3-32 character handle".into(),
    ))
}

/// Resolves an identifier to the canonical id, going upstream (cached
/// under the `vanity` namespace) for handles.
pub async fn resolve(
    state: &AppState,
    ident: PlayerIdent,
    token: &CancellationToken,
) -> Result<String, ErrorClass> {
    match ident {
        PlayerIdent::Id(id) => Ok(id),
        PlayerIdent::Vanity(handle) => {
            let request =
                FetchRequest::new(Endpoint::ResolveVanity).param("vanityurl", handle.clone());
            let sourced = state.gateway.load("vanity", &handle, request, token).await?;

            let response = sourced.value.get("response");
            let success = response
                .and_then(|r| r.get("success"))
                .and_then(serde_json::Value::as_i64)
                .unwrap_or(0);
            if success != 1 {
                return Err(ErrorClass::NotFound(format!(
                    "no player found for handle {handle:?}"
                )));
            }
            response
                .and_then(|r| r.get("steamid"))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    ErrorClass::Internal("vanity resolution returned no id".into())
                })
        }
    }
}
