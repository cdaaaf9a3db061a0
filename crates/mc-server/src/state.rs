use crate::identity::{self, IdentityProvider};
use crate::source::{LoadTask, ProjectSource};
use mc_core::config::Config;
use mc_core::dashboard::RenderContext;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub http_client: reqwest::Client,
    pub submissions: SubmitGuard,
}

impl AppState {
    /// Load `mission-control/config.yaml` under `root` and wire the configured
    /// identity provider.
    pub fn new(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load(&root)?;
        for warning in config.validate() {
            tracing::warn!(level = ?warning.level, "config: {}", warning.message);
        }
        let identity = identity::from_config(&config.auth, fetch_timeout(&config))?;
        Ok(Self::with_identity(root, config, identity))
    }

    pub fn with_identity(
        root: PathBuf,
        config: Config,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            root,
            config: Arc::new(config),
            identity,
            http_client: reqwest::Client::new(),
            submissions: SubmitGuard::default(),
        }
    }

    pub fn project_source(&self) -> ProjectSource {
        ProjectSource::from_config(&self.config, &self.root)
    }

    /// Start the one-shot project load for a page view.
    pub fn start_load(&self) -> LoadTask {
        LoadTask::spawn(
            self.project_source(),
            self.http_client.clone(),
            fetch_timeout(&self.config),
        )
    }

    /// Render settings; an invalid offset falls back to UTC.
    pub fn render_context(&self) -> RenderContext {
        RenderContext::from_config(&self.config).unwrap_or_else(|e| {
            tracing::warn!("{e}; rendering timestamps in UTC");
            RenderContext {
                roster: self.config.roster(),
                ..RenderContext::default()
            }
        })
    }
}

fn fetch_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.dashboard.fetch_timeout_secs.max(1))
}

// ---------------------------------------------------------------------------
// SubmitGuard
// ---------------------------------------------------------------------------

/// Tracks auth submissions in flight so a second submit for the same account
/// is refused until the first one settles.
#[derive(Clone, Default)]
pub struct SubmitGuard {
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl SubmitGuard {
    /// Claim `key`; `None` when a submission for it is already running.
    pub fn try_begin(&self, key: &str) -> Option<SubmitPermit> {
        let key = key.trim().to_lowercase();
        let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
        if !inflight.insert(key.clone()) {
            return None;
        }
        Some(SubmitPermit {
            guard: self.clone(),
            key,
        })
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Released on drop.
pub struct SubmitPermit {
    guard: SubmitGuard,
    key: String,
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.guard
            .inflight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
