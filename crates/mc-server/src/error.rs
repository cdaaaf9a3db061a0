use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mc_core::error::McError;

use crate::identity::IdentityError;
use crate::source::SourceError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit status through the `anyhow::Error` chain without
/// touching the `McError` enum.
#[derive(Debug)]
struct StatusError(StatusCode, String);

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl std::error::Error for StatusError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for JSON API responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(StatusError(StatusCode::BAD_REQUEST, msg.into()).into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusError(StatusCode::CONFLICT, msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusError(StatusCode::NOT_FOUND, msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if let Some(s) = self.0.downcast_ref::<StatusError>() {
            return s.0;
        }
        if let Some(e) = self.0.downcast_ref::<McError>() {
            return core_status(e);
        }
        if let Some(e) = self.0.downcast_ref::<SourceError>() {
            return match e {
                SourceError::Core(inner) => core_status(inner),
                SourceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                SourceError::Http { .. } | SourceError::Status { .. } => StatusCode::BAD_GATEWAY,
                SourceError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            };
        }
        if let Some(e) = self.0.downcast_ref::<IdentityError>() {
            return identity_status(e);
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn identity_status(e: &IdentityError) -> StatusCode {
    match e {
        IdentityError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        IdentityError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        IdentityError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

fn core_status(e: &McError) -> StatusCode {
    match e {
        McError::ProjectNotFound(_) | McError::ProjectFileMissing(_) => StatusCode::NOT_FOUND,
        McError::InvalidSlug(_)
        | McError::InvalidStage(_)
        | McError::MissingField(_) => StatusCode::BAD_REQUEST,
        McError::InvalidConfig(_) | McError::Io(_) | McError::Yaml(_) | McError::Json(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_not_found_maps_to_404() {
        let err = AppError(McError::ProjectNotFound("alpha".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_project_file_maps_to_404() {
        let err = AppError(McError::ProjectFileMissing("projects.json".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn malformed_json_maps_to_500() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError(McError::Json(json_err).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn wrapped_source_error_uses_inner_status() {
        let err = AppError(SourceError::Core(McError::ProjectNotFound("x".into())).into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let timeout = AppError(SourceError::Timeout(10).into());
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn identity_rejection_maps_to_422() {
        let err = AppError(IdentityError::Rejected("Invalid login credentials".into()).into());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.0.to_string(), "Invalid login credentials");
    }

    #[test]
    fn constructors_map_to_their_status() {
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_body_is_json() {
        let response = AppError(McError::ProjectNotFound("alpha".into()).into()).into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
