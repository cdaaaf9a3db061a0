pub mod check;
pub mod init;
pub mod serve;
pub mod show;

use mc_core::config::Config;
use mc_core::types::Project;
use mc_server::source::{LoadTask, ProjectSource, SourceError};
use std::path::Path;
use std::time::Duration;

/// Run a single project load from the configured source on a fresh runtime.
pub fn fetch_projects(
    root: &Path,
    config: &Config,
) -> anyhow::Result<Result<Vec<Project>, SourceError>> {
    let source = ProjectSource::from_config(config, root);
    let timeout = Duration::from_secs(config.dashboard.fetch_timeout_secs.max(1));
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(async move {
        LoadTask::spawn(source, reqwest::Client::new(), timeout)
            .wait()
            .await
    }))
}
