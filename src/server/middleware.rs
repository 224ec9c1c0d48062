use axum::http::{HeaderMap, StatusCode};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Checks the `x-api-key` header against the configured key.
///
/// With no key configured every request is rejected.
pub fn require_api_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), StatusCode> {
    let expected = expected
        .filter(|k| !k.is_empty())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let provided = headers
        .get(API_KEY_HEADER)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    if provided != expected {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(())
}
