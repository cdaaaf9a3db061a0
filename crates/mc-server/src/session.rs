use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::identity::Session;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "mc_session";

/// Session resolved for the current request, inserted as a request extension
/// by [`session_middleware`].
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<Session>);

impl CurrentSession {
    pub fn email(&self) -> Option<&str> {
        self.0.as_ref().map(|s| s.email.as_str())
    }
}

/// Refresh the visitor's session on every page request.
///
/// Flow:
/// 1. `/assets/*` → passthrough without a lookup
/// 2. No `mc_session` cookie → anonymous
/// 3. Cookie present → `IdentityProvider::get_session`; a stale token or a
///    provider error leaves the request anonymous
///
/// Routes are never gated here; handlers decide what to show.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.uri().path().starts_with("/assets/") {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, SESSION_COOKIE))
        .map(str::to_string);

    let session = match token {
        None => None,
        Some(token) => match state.identity.get_session(&token).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed; treating request as anonymous");
                None
            }
        },
    };

    req.extensions_mut().insert(CurrentSession(session));
    next.run(req).await
}

// ---------------------------------------------------------------------------
// Cookie helpers
// ---------------------------------------------------------------------------

fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .filter(|v| !v.is_empty())
    })
}

pub fn set_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/")
}

pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
