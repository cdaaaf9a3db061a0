use anyhow::Context;
use mc_core::{config::Config, io, paths};
use std::path::Path;

const EXAMPLE_PROJECTS: &str = r##"[
  {
    "id": "example-app",
    "name": "Example App",
    "slug": "example-app",
    "description": "Replace this record with your own projects.",
    "status": "active",
    "stage": "research",
    "agent": "scout",
    "startedAt": "2026-01-05T09:00:00Z",
    "priority": "medium",
    "icon": "🚀",
    "color": "#3b82f6",
    "updates": [
      {
        "timestamp": "2026-01-05T09:00:00Z",
        "agent": "scout",
        "message": "Kicked off market research",
        "type": "progress"
      }
    ],
    "assets": {},
    "metadata": {
      "pricing": { "free": true }
    }
  }
]
"##;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing Mission Control in: {}", root.display());

    let dir = paths::mc_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if config_path.exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    }

    let projects_path = paths::projects_path(root);
    let written = io::write_if_missing(&projects_path, EXAMPLE_PROJECTS.as_bytes())
        .context("failed to write projects.json")?;
    if written {
        println!("  created: {}", paths::PROJECTS_FILE);
    } else {
        println!("  exists:  {}", paths::PROJECTS_FILE);
    }

    println!("\nNext: mission-control serve");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_projects_parse_cleanly() {
        let projects = mc_core::project::parse_projects(EXAMPLE_PROJECTS).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(mc_core::validate::check_projects(&projects).is_empty());
    }
}
