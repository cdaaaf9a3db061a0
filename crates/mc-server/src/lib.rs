pub mod embed;
pub mod error;
pub mod identity;
pub mod render;
pub mod routes;
pub mod session;
pub mod source;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the axum Router with all pages, API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Pages
        .route("/", get(routes::dashboard::index))
        .route("/overview", get(routes::dashboard::overview))
        .route(
            render::FRAGMENT_PATH,
            get(routes::dashboard::fragment),
        )
        // Auth
        .route(
            "/login",
            get(routes::auth::login_form).post(routes::auth::submit),
        )
        .route("/logout", post(routes::auth::logout))
        .route("/auth/callback", get(routes::auth::callback))
        // API
        .route("/api/dashboard", get(routes::dashboard::dashboard_json))
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects/{id}", get(routes::projects::get_project))
        // Assets
        .route("/assets/{*path}", get(embed::asset_handler))
        .fallback(embed::fallback)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the Mission Control web UI server.
pub async fn serve(root: PathBuf, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the Mission Control web UI server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app_state = AppState::new(root)?;
    tracing::info!(
        source = %app_state.project_source().describe(),
        "Mission Control listening on http://localhost:{actual_port}"
    );
    let app = build_router(app_state);

    if open_browser {
        let url = format!("http://localhost:{actual_port}");
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
