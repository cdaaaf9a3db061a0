use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "$CARGO_MANIFEST_DIR/assets/"]
struct Assets;

/// GET /assets/{*path} — embedded stylesheet and script.
pub async fn asset_handler(Path(path): Path<String>) -> Response {
    match <Assets as Embed>::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.as_ref().to_string()),
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "asset not found").into_response(),
    }
}

/// Anything unrouted.
pub async fn fallback(uri: axum::http::Uri) -> Response {
    tracing::debug!(path = %uri.path(), "no route");
    (StatusCode::NOT_FOUND, "not found").into_response()
}
