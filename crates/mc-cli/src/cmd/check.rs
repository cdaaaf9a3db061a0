use crate::output::{print_json, print_table};
use anyhow::Context;
use mc_core::config::{Config, WarnLevel};
use mc_core::validate::{self, ProjectIssue};
use std::path::Path;

fn level_name(level: &WarnLevel) -> &'static str {
    match level {
        WarnLevel::Warning => "warning",
        WarnLevel::Error => "error",
    }
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    let projects = super::fetch_projects(root, &config)?.context("failed to load project list")?;
    let issues: Vec<ProjectIssue> = validate::check_projects(&projects);

    if json {
        print_json(&serde_json::json!({
            "projects": projects.len(),
            "config_warnings": warnings,
            "issues": issues,
        }))?;
    } else {
        for w in &warnings {
            println!("[{}] config: {}", level_name(&w.level), w.message);
        }
        if issues.is_empty() {
            println!("{} project(s) checked. No issues.", projects.len());
        } else {
            let rows = issues
                .iter()
                .map(|i| {
                    vec![
                        level_name(&i.level).to_string(),
                        i.project.clone(),
                        i.message.clone(),
                    ]
                })
                .collect();
            print_table(&["LEVEL", "PROJECT", "ISSUE"], rows);
        }
    }

    let config_errors = warnings.iter().any(|w| w.level == WarnLevel::Error);
    if config_errors || validate::has_errors(&issues) {
        anyhow::bail!("validation found errors");
    }
    Ok(())
}
