//! Identifier helpers: log redaction and request ids.

use rand::Rng;

/// Redacts a user identifier to `prefix***suffix` for logging.
///
/// Short identifiers are fully masked; anything else keeps at most three
/// characters on each side. No secrets or full player ids reach the logs.
pub fn redact(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let keep = 3.min(chars.len() / 4).max(1);
    let prefix: String = chars[..keep].iter().collect();
    let suffix: String = chars[chars.len() - keep..].iter().collect();
    format!("{prefix}***{suffix}")
}

/// Redacts the identifier part of a `namespace:identifier` cache key,
/// keeping the namespace readable.
pub fn redact_key(key: &str) -> String {
    match key.split_once(':') {
        Some((namespace, id)) => format!("{namespace}:{}", redact(id)),
        None => redact(key),
    }
}

/// Generates a 16-character lowercase-hex request id.
pub fn request_id() -> String {
    let n: u64 = rand::rng().random();
    format!("{n:016x}")
}
