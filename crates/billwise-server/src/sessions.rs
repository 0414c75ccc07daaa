use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// Cookie carrying the session identifier.
pub const SESSION_COOKIE: &str = "billwise_sid";

/// Session identity injected into request extensions by [`ensure_session`].
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Extract the session ID from the `Cookie` header, if present.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// Middleware: every request carries a [`SessionId`] extension.
///
/// Reuses the cookie when the browser presents one, otherwise mints a fresh
/// UUID and sets the cookie on the response. The gate's per-session isolation
/// rests on this: each session ID owns its own `GateState`, and a browser
/// without the cookie always starts over at `Idle`.
pub async fn ensure_session(mut request: Request, next: Next) -> Response {
    let existing = session_id_from_headers(request.headers());
    let fresh = existing.is_none();
    let sid = existing.unwrap_or_else(|| Uuid::new_v4().to_string());
    request.extensions_mut().insert(SessionId(sid.clone()));

    let mut response = next.run(request).await;

    if fresh {
        let cookie = format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = cookie.parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}
