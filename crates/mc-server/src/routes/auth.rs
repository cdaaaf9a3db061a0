use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Form};
use mc_core::auth::{AuthMode, AuthOutcome, Credentials};
use serde::Deserialize;

use crate::error::identity_status;
use crate::render::{self, Notice};
use crate::session::{self, CurrentSession};
use crate::state::AppState;

pub const CONFIRMED_MESSAGE: &str = "Email confirmed. Sign in to continue.";
pub const BUSY_MESSAGE: &str = "A submission for this account is already in progress.";

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

fn login_response(
    app: &AppState,
    status: StatusCode,
    mode: AuthMode,
    email: &str,
    notice: Option<Notice<'_>>,
    session: &CurrentSession,
) -> Response {
    let html = render::login_page(
        &app.config.dashboard.title,
        mode,
        email,
        notice.as_ref(),
        session,
    );
    (status, Html(html)).into_response()
}

/// Absolute confirmation link target for sign-up emails. Built from the
/// configured site origin only; request headers never reach the link.
pub(crate) fn redirect_to(app: &AppState) -> String {
    let origin = match app.config.auth.site_url.as_deref().map(str::trim) {
        Some(site) if !site.is_empty() => site.trim_end_matches('/').to_string(),
        _ => format!("http://localhost:{}", app.config.server.port),
    };
    format!("{origin}{}", app.config.auth.redirect_path)
}

/// GET /login
pub async fn login_form(
    State(app): State<AppState>,
    Query(q): Query<LoginQuery>,
    Extension(session): Extension<CurrentSession>,
) -> Response {
    let notice = match q.notice.as_deref() {
        Some("confirmed") => Some(Notice {
            text: CONFIRMED_MESSAGE,
            success: true,
        }),
        _ => None,
    };
    login_response(
        &app,
        StatusCode::OK,
        AuthMode::from_param(q.mode.as_deref()),
        "",
        notice,
        &session,
    )
}

/// POST /login — sign in or sign up depending on the form's mode.
///
/// Sign-in success sets the session cookie and redirects to the dashboard.
/// Sign-up success re-renders the form with the confirmation notice. Provider
/// failures are shown verbatim and never retried.
pub async fn submit(
    State(app): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    Form(form): Form<LoginForm>,
) -> Response {
    let mode = AuthMode::from_param(form.mode.as_deref());
    let creds = Credentials::new(form.email, form.password);
    let (email, password) = match creds.validated() {
        Ok(fields) => fields,
        Err(e) => {
            let text = e.to_string();
            return login_response(
                &app,
                StatusCode::BAD_REQUEST,
                mode,
                creds.email.trim(),
                Some(Notice {
                    text: &text,
                    success: false,
                }),
                &session,
            );
        }
    };

    let Some(_permit) = app.submissions.try_begin(email) else {
        tracing::debug!(%mode, "duplicate submission refused");
        return login_response(
            &app,
            StatusCode::CONFLICT,
            mode,
            email,
            Some(Notice {
                text: BUSY_MESSAGE,
                success: false,
            }),
            &session,
        );
    };

    let result = match mode {
        AuthMode::SignIn => app
            .identity
            .sign_in_with_password(email, password)
            .await
            .map(Some),
        AuthMode::SignUp => app
            .identity
            .sign_up(email, password, &redirect_to(&app))
            .await
            .map(|()| None),
    };

    match result {
        Ok(Some(new_session)) => {
            tracing::info!(email = %new_session.email, "signed in");
            let cookie = session::set_cookie(&new_session.access_token);
            (
                StatusCode::SEE_OTHER,
                [
                    (header::LOCATION, "/?notice=signed-in".to_string()),
                    (header::SET_COOKIE, cookie),
                ],
            )
                .into_response()
        }
        Ok(None) => {
            tracing::info!(email, "sign-up confirmation requested");
            let outcome = AuthOutcome::ConfirmationSent;
            login_response(
                &app,
                StatusCode::OK,
                mode,
                email,
                Some(Notice {
                    text: outcome.message(),
                    success: outcome.is_success(),
                }),
                &session,
            )
        }
        Err(e) => {
            tracing::warn!(%mode, error = %e, "authentication failed");
            let outcome = AuthOutcome::Rejected(e.to_string());
            login_response(
                &app,
                identity_status(&e),
                mode,
                email,
                Some(Notice {
                    text: outcome.message(),
                    success: outcome.is_success(),
                }),
                &session,
            )
        }
    }
}

/// POST /logout
pub async fn logout() -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/?notice=signed-out".to_string()),
            (header::SET_COOKIE, session::clear_cookie()),
        ],
    )
        .into_response()
}

/// GET /auth/callback — landing page for confirmation links.
pub async fn callback() -> Redirect {
    Redirect::to("/login?notice=confirmed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DisabledIdentity;
    use mc_core::config::Config;
    use std::sync::Arc;

    fn state(site_url: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.auth.site_url = site_url.map(str::to_string);
        AppState::with_identity("/tmp".into(), config, Arc::new(DisabledIdentity))
    }

    #[test]
    fn redirect_uses_site_url() {
        assert_eq!(
            redirect_to(&state(Some("https://mc.example.com/"))),
            "https://mc.example.com/auth/callback"
        );
    }

    #[test]
    fn redirect_without_site_url_targets_local_port() {
        assert_eq!(redirect_to(&state(None)), "http://localhost:3141/auth/callback");
        assert_eq!(redirect_to(&state(Some("  "))), "http://localhost:3141/auth/callback");
    }
}
