use axum::extract::{Path, State};
use axum::Json;
use mc_core::types::Project;

use crate::error::AppError;
use crate::state::AppState;

/// Path of the local project file, even when the dashboard itself loads from
/// an HTTP source.
pub(crate) fn local_file(app: &AppState) -> std::path::PathBuf {
    app.config
        .source_path(&app.root)
        .unwrap_or_else(|| mc_core::paths::projects_path(&app.root))
}

/// GET /api/projects — the raw project array.
pub async fn list_projects(State(app): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    let path = local_file(&app);
    let projects =
        tokio::task::spawn_blocking(move || mc_core::project::load_projects(&path))
            .await
            .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(projects))
}

/// GET /api/projects/{id} — a single project record.
pub async fn get_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    let path = local_file(&app);
    let project = tokio::task::spawn_blocking(move || {
        let projects = mc_core::project::load_projects(&path)?;
        mc_core::project::find(&projects, &id).cloned()
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;
    Ok(Json(project))
}
