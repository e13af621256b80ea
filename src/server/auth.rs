//! HTTP basic auth middleware.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;

use crate::config::AuthConfig;

const REALM: &str = "Basic realm=\"netsnap\"";

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        Json(serde_json::json!({ "error": "unauthorized" })),
    )
        .into_response()
}

/// Decode `Authorization: Basic <base64(user:pass)>` into its two halves.
fn decode_credentials(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

pub(crate) async fn basic_auth_middleware(
    State(creds): State<Arc<AuthConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();

    let Some(header_value) = req.headers().get(header::AUTHORIZATION) else {
        tracing::warn!(path = %path, "auth failed: no authorization header");
        return unauthorized();
    };

    let Some((user, pass)) = header_value.to_str().ok().and_then(decode_credentials) else {
        tracing::warn!(path = %path, "auth failed: malformed basic credentials");
        return unauthorized();
    };

    if user != creds.username || pass != creds.password {
        tracing::warn!(user = %user, path = %path, "auth failed: invalid credentials");
        return unauthorized();
    }

    tracing::debug!(user = %user, path = %path, "authenticated");
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_credentials() {
        // "admin:password"
        assert_eq!(
            decode_credentials("Basic YWRtaW46cGFzc3dvcmQ="),
            Some(("admin".to_string(), "password".to_string()))
        );
    }

    #[test]
    fn test_decode_credentials_keeps_colons_in_password() {
        let encoded = base64::engine::general_purpose::STANDARD.encode("ops:a:b");
        assert_eq!(
            decode_credentials(&format!("Basic {encoded}")),
            Some(("ops".to_string(), "a:b".to_string()))
        );
    }

    #[test]
    fn test_decode_credentials_rejects_malformed() {
        assert_eq!(decode_credentials("Bearer abc"), None);
        assert_eq!(decode_credentials("Basic !!!"), None);
        // "nocolon"
        assert_eq!(decode_credentials("Basic bm9jb2xvbg=="), None);
    }
}
