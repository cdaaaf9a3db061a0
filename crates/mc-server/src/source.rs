//! Project list loading for the dashboard.
//!
//! A load is a one-shot task: [`LoadTask::spawn`] starts it, [`LoadTask::wait`]
//! collects the outcome, and dropping the handle aborts the fetch so nothing
//! lands after the requesting view is gone.

use mc_core::config::{Config, SourceConfig};
use mc_core::types::Project;
use mc_core::McError;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Core(#[from] McError),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("project load timed out after {0}s")]
    Timeout(u64),

    #[error("project load was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    File(PathBuf),
    Http(String),
}

impl ProjectSource {
    pub fn from_config(config: &Config, root: &Path) -> Self {
        match &config.dashboard.source {
            SourceConfig::Http { url } => ProjectSource::Http(url.clone()),
            SourceConfig::File { .. } => ProjectSource::File(
                config
                    .source_path(root)
                    .unwrap_or_else(|| mc_core::paths::projects_path(root)),
            ),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ProjectSource::File(path) => path.display().to_string(),
            ProjectSource::Http(url) => url.clone(),
        }
    }

    pub async fn fetch(&self, client: &reqwest::Client) -> Result<Vec<Project>, SourceError> {
        tracing::debug!(source = %self.describe(), "fetching project list");
        match self {
            ProjectSource::File(path) => {
                let path = path.clone();
                let projects = tokio::task::spawn_blocking(move || {
                    mc_core::project::load_projects(&path)
                })
                .await
                .map_err(|_| SourceError::Cancelled)??;
                Ok(projects)
            }
            ProjectSource::Http(url) => {
                let http_err = |source: reqwest::Error| SourceError::Http {
                    url: url.clone(),
                    source,
                };
                let resp = client.get(url).send().await.map_err(http_err)?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(SourceError::Status {
                        url: url.clone(),
                        status: status.as_u16(),
                    });
                }
                let body = resp.text().await.map_err(http_err)?;
                Ok(mc_core::project::parse_projects(&body)?)
            }
        }
    }
}

/// Handle to an in-flight project load. Dropping it aborts the load.
pub struct LoadTask {
    handle: JoinHandle<Result<Vec<Project>, SourceError>>,
}

impl LoadTask {
    pub fn spawn(source: ProjectSource, client: reqwest::Client, timeout: Duration) -> Self {
        let handle = tokio::spawn(async move {
            match tokio::time::timeout(timeout, source.fetch(&client)).await {
                Ok(result) => result,
                Err(_) => Err(SourceError::Timeout(timeout.as_secs())),
            }
        });
        Self { handle }
    }

    /// Observes the spawned load without keeping it alive.
    pub fn abort_handle(&self) -> AbortHandle {
        self.handle.abort_handle()
    }

    pub async fn wait(mut self) -> Result<Vec<Project>, SourceError> {
        (&mut self.handle)
            .await
            .unwrap_or(Err(SourceError::Cancelled))
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_source_reads_projects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"[{"id":"a","name":"A","stage":"qa"}]"#).unwrap();
        let projects = ProjectSource::File(path)
            .fetch(&reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(projects[0].id, "a");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = ProjectSource::File(dir.path().join("nope.json"))
            .fetch(&reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Core(McError::ProjectFileMissing(_))));
    }

    #[tokio::test]
    async fn http_source_parses_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects.json")
            .with_status(200)
            .with_body(r#"[{"id":"remote","name":"Remote","stage":"brand"}]"#)
            .create_async()
            .await;
        let source = ProjectSource::Http(format!("{}/projects.json", server.url()));
        let projects = source.fetch(&reqwest::Client::new()).await.unwrap();
        assert_eq!(projects[0].name, "Remote");
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects.json")
            .with_status(503)
            .create_async()
            .await;
        let source = ProjectSource::Http(format!("{}/projects.json", server.url()));
        let err = source.fetch(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/projects.json")
            .with_status(200)
            .with_body("{oops")
            .create_async()
            .await;
        let source = ProjectSource::Http(format!("{}/projects.json", server.url()));
        let err = source.fetch(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, SourceError::Core(McError::Json(_))));
    }

    #[tokio::test]
    async fn load_task_returns_outcome() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, "[]").unwrap();
        let task = LoadTask::spawn(
            ProjectSource::File(path),
            reqwest::Client::new(),
            Duration::from_secs(5),
        );
        assert!(task.wait().await.unwrap().is_empty());
    }

    /// Accepts connections and never answers them.
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}/projects.json")
    }

    #[tokio::test]
    async fn stalled_source_times_out() {
        let task = LoadTask::spawn(
            ProjectSource::Http(silent_server().await),
            reqwest::Client::new(),
            Duration::from_secs(1),
        );
        let err = task.wait().await.unwrap_err();
        assert!(matches!(err, SourceError::Timeout(1)));
        assert_eq!(err.to_string(), "project load timed out after 1s");
    }

    #[tokio::test]
    async fn dropping_task_aborts_load() {
        let task = LoadTask::spawn(
            ProjectSource::Http(silent_server().await),
            reqwest::Client::new(),
            Duration::from_secs(60),
        );
        let handle = task.abort_handle();
        tokio::task::yield_now().await;
        assert!(!handle.is_finished());
        drop(task);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !handle.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("load should stop once its handle is dropped");
    }

    #[test]
    fn from_config_resolves_relative_file() {
        let cfg = Config::default();
        let source = ProjectSource::from_config(&cfg, Path::new("/srv/ops"));
        assert_eq!(
            source,
            ProjectSource::File(PathBuf::from("/srv/ops/mission-control/projects.json"))
        );
    }
}
