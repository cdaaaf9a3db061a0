use crate::error::{McError, Result};
use crate::types::Project;
use std::path::Path;

/// Parse a project document: a top-level JSON array of project records.
pub fn parse_projects(json: &str) -> Result<Vec<Project>> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse the project file at `path`.
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    if !path.exists() {
        return Err(McError::ProjectFileMissing(path.display().to_string()));
    }
    let data = std::fs::read_to_string(path)?;
    parse_projects(&data)
}

pub fn find<'a>(projects: &'a [Project], id: &str) -> Result<&'a Project> {
    projects
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| McError::ProjectNotFound(id.to_string()))
}
