use axum::extract::{Query, State};
use axum::response::Html;
use axum::{Extension, Json};
use mc_core::auth::AuthOutcome;
use mc_core::dashboard::{self, Dashboard, DashboardModel};
use mc_core::expansion::Expansion;
use serde::Deserialize;

use crate::render::{self, Notice};
use crate::routes::projects::local_file;
use crate::session::CurrentSession;
use crate::state::AppState;

static SIGNED_IN: AuthOutcome = AuthOutcome::SignedIn;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub expanded: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
}

fn page_notice(code: Option<&str>) -> Option<Notice<'static>> {
    match code? {
        "signed-in" => Some(Notice {
            text: SIGNED_IN.message(),
            success: SIGNED_IN.is_success(),
        }),
        "signed-out" => Some(Notice {
            text: "Signed out.",
            success: true,
        }),
        _ => None,
    }
}

/// Run the one-shot load for this view and settle the dashboard with it.
async fn load_dashboard(app: &AppState, expansion: Expansion) -> Dashboard {
    let task = app.start_load();
    let mut dashboard = Dashboard::new().with_expansion(expansion);
    dashboard.resolve(task.wait().await);
    dashboard
}

/// GET / — page shell with skeleton rows; the script swaps in the fragment.
pub async fn index(
    State(app): State<AppState>,
    Query(q): Query<PageQuery>,
    Extension(session): Extension<CurrentSession>,
) -> Html<String> {
    let expansion = Expansion::from_param(q.expanded.as_deref());
    Html(render::dashboard_page(
        &app.config.dashboard.title,
        &expansion,
        app.config.dashboard.fetch_timeout_secs,
        &session,
        page_notice(q.notice.as_deref()).as_ref(),
    ))
}

/// GET /fragments/dashboard — cards (or the empty state) for one load.
/// Every card carries its detail; collapsed ones are hidden so the script can
/// switch expansion in place.
pub async fn fragment(State(app): State<AppState>, Query(q): Query<PageQuery>) -> Html<String> {
    let dashboard = load_dashboard(&app, Expansion::from_param(q.expanded.as_deref())).await;
    Html(render::dashboard_fragment(
        &dashboard.render_with_details(&app.render_context()),
    ))
}

/// GET /api/dashboard — the model the fragment is rendered from.
pub async fn dashboard_json(
    State(app): State<AppState>,
    Query(q): Query<PageQuery>,
) -> Json<DashboardModel> {
    let dashboard = load_dashboard(&app, Expansion::from_param(q.expanded.as_deref())).await;
    Json(dashboard.render(&app.render_context()))
}

/// GET /overview — server-rendered list read straight from the local project
/// file, whatever source the dashboard is configured with.
pub async fn overview(
    State(app): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Html<String> {
    let path = local_file(&app);
    let loaded = tokio::task::spawn_blocking(move || mc_core::project::load_projects(&path))
        .await
        .map_err(|e| anyhow::anyhow!("task join error: {e}"))
        .and_then(|r| r.map_err(anyhow::Error::from));
    let (projects, failure) = match loaded {
        Ok(projects) => (projects, None),
        Err(e) => {
            tracing::warn!(error = %e, "overview could not read the project file");
            (Vec::new(), Some(e.to_string()))
        }
    };
    let rows = dashboard::overview_rows(&projects, &app.render_context());
    Html(render::overview_page(
        &app.config.dashboard.title,
        &rows,
        failure.as_deref(),
        &session,
    ))
}
