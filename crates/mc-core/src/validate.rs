//! Consistency checks over a loaded project list.

use crate::config::WarnLevel;
use crate::feed::parse_timestamp;
use crate::paths::validate_slug;
use crate::stage::{resolve, StageIndex};
use crate::types::Project;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectIssue {
    pub level: WarnLevel,
    pub project: String,
    pub message: String,
}

impl ProjectIssue {
    fn error(project: &str, message: String) -> Self {
        Self {
            level: WarnLevel::Error,
            project: project.to_string(),
            message,
        }
    }

    fn warning(project: &str, message: String) -> Self {
        Self {
            level: WarnLevel::Warning,
            project: project.to_string(),
            message,
        }
    }
}

pub fn check_projects(projects: &[Project]) -> Vec<ProjectIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for p in projects {
        if p.id.trim().is_empty() {
            issues.push(ProjectIssue::error(&p.id, "empty id".to_string()));
        } else if !seen.insert(p.id.as_str()) {
            issues.push(ProjectIssue::error(&p.id, format!("duplicate id '{}'", p.id)));
        }

        if p.name.trim().is_empty() {
            issues.push(ProjectIssue::error(&p.id, "empty name".to_string()));
        }

        if !p.slug.is_empty() && validate_slug(&p.slug).is_err() {
            issues.push(ProjectIssue::warning(
                &p.id,
                format!("slug '{}' is not lowercase alphanumeric with hyphens", p.slug),
            ));
        }

        if resolve(&p.stage) == StageIndex::NotFound {
            issues.push(ProjectIssue::error(
                &p.id,
                format!("unknown stage '{}'", p.stage),
            ));
        }

        if !p.started_at.is_empty() && parse_timestamp(&p.started_at).is_none() {
            issues.push(ProjectIssue::warning(
                &p.id,
                format!("startedAt '{}' is not a valid timestamp", p.started_at),
            ));
        }

        for (i, u) in p.updates.iter().enumerate() {
            if parse_timestamp(&u.timestamp).is_none() {
                issues.push(ProjectIssue::error(
                    &p.id,
                    format!("update #{} has invalid timestamp '{}'", i + 1, u.timestamp),
                ));
            }
        }
    }

    issues
}

pub fn has_errors(issues: &[ProjectIssue]) -> bool {
    issues.iter().any(|i| i.level == WarnLevel::Error)
}
