use crate::error::{McError, Result};
use crate::feed::AgentRoster;
use crate::paths;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SourceConfig
// ---------------------------------------------------------------------------

/// Where the dashboard loads its project list from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// A JSON file, relative to the project root unless absolute.
    File {
        #[serde(default = "default_projects_path")]
        path: PathBuf,
    },
    /// An HTTP endpoint answering `GET` with the JSON array.
    Http { url: String },
}

fn default_projects_path() -> PathBuf {
    PathBuf::from(paths::PROJECTS_FILE)
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            path: default_projects_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// Fixed offset used when rendering update timestamps.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_title() -> String {
    "Mission Control".to_string()
}

fn default_fetch_timeout() -> u64 {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            source: SourceConfig::default(),
            fetch_timeout_secs: default_fetch_timeout(),
            utc_offset_minutes: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the hosted identity provider, e.g. `https://xyz.supabase.co`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
    /// Path appended to the site origin for sign-up confirmation links.
    #[serde(default = "default_redirect_path")]
    pub redirect_path: String,
    /// Public origin of the dashboard, e.g. `https://mc.example.com`.
    /// Without it the confirmation link falls back to `http://localhost:<port>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
}

fn default_redirect_path() -> String {
    "/auth/callback".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_url: None,
            anon_key: None,
            redirect_path: default_redirect_path(),
            site_url: None,
        }
    }
}

impl AuthConfig {
    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.provider_url) && set(&self.anon_key)
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Agent id → glyph overrides.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub agents: HashMap<String, String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            dashboard: DashboardConfig::default(),
            agents: HashMap::new(),
            auth: AuthConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load `mission-control/config.yaml`; a missing file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn roster(&self) -> AgentRoster {
        AgentRoster::new(self.agents.clone())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        let minutes = self.dashboard.utc_offset_minutes;
        minutes.checked_mul(60).and_then(FixedOffset::east_opt).ok_or_else(|| {
            McError::InvalidConfig(format!("utc_offset_minutes out of range: {minutes}"))
        })
    }

    /// Absolute path of a file-backed source.
    pub fn source_path(&self, root: &Path) -> Option<PathBuf> {
        match &self.dashboard.source {
            SourceConfig::File { path } if path.is_absolute() => Some(path.clone()),
            SourceConfig::File { path } => Some(root.join(path)),
            SourceConfig::Http { .. } => None,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.dashboard.fetch_timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "dashboard.fetch_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.utc_offset().is_err() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "dashboard.utc_offset_minutes={} is outside ±1439",
                    self.dashboard.utc_offset_minutes
                ),
            });
        }

        match &self.dashboard.source {
            SourceConfig::File { path } if path.as_os_str().is_empty() => {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "dashboard.source.path is empty".to_string(),
                });
            }
            SourceConfig::Http { url }
                if !(url.starts_with("http://") || url.starts_with("https://")) =>
            {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("dashboard.source.url '{url}' is not an http(s) URL"),
                });
            }
            _ => {}
        }

        let has_url = self.auth.provider_url.is_some();
        let has_key = self.auth.anon_key.is_some();
        if has_url != has_key {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "auth needs both provider_url and anon_key; sign-in is disabled"
                    .to_string(),
            });
        }

        if let Some(site) = &self.auth.site_url {
            if !(site.starts_with("http://") || site.starts_with("https://")) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("auth.site_url '{site}' is not an http(s) URL"),
                });
            }
        }

        if !self.auth.redirect_path.starts_with('/') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "auth.redirect_path '{}' should start with '/'",
                    self.auth.redirect_path
                ),
            });
        }

        for (agent, glyph) in &self.agents {
            if glyph.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("agent '{agent}' has an empty glyph; the default is used"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.dashboard.title, "Mission Control");
        assert_eq!(cfg.dashboard.fetch_timeout_secs, 10);
        assert_eq!(cfg.server.port, 3141);
        assert_eq!(
            cfg.source_path(dir.path()),
            Some(dir.path().join("mission-control/projects.json"))
        );
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.dashboard.title = "Ozzy's OS".into();
        cfg.agents.insert("ozzy".into(), "🐺".into());
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.dashboard.title, "Ozzy's OS");
        assert_eq!(loaded.roster().glyph("ozzy"), "🐺");
    }

    #[test]
    fn http_source_yaml_tagged() {
        let yaml = "dashboard:\n  source:\n    kind: http\n    url: https://example.com/projects.json\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            cfg.dashboard.source,
            SourceConfig::Http {
                url: "https://example.com/projects.json".into()
            }
        );
        assert!(cfg.source_path(Path::new("/tmp")).is_none());
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::default();
        cfg.dashboard.fetch_timeout_secs = 0;
        cfg.dashboard.utc_offset_minutes = 5000;
        cfg.auth.provider_url = Some("https://xyz.supabase.co".into());
        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert!(warnings.iter().any(|w| w.message.contains("anon_key")));
    }

    #[test]
    fn huge_offset_is_a_config_error() {
        let cfg: Config =
            serde_yaml::from_str("dashboard:\n  utc_offset_minutes: 40000000\n").unwrap();
        assert!(matches!(cfg.utc_offset(), Err(McError::InvalidConfig(_))));
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("utc_offset_minutes")));
    }

    #[test]
    fn non_http_url_is_an_error() {
        let mut cfg = Config::default();
        cfg.dashboard.source = SourceConfig::Http {
            url: "ftp://nope".into(),
        };
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("ftp://nope")));
    }

    #[test]
    fn site_url_must_be_http() {
        let yaml = "auth:\n  site_url: mc.example.com\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.auth.site_url.as_deref(), Some("mc.example.com"));
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("site_url")));
    }

    #[test]
    fn auth_configured_requires_both_values() {
        let mut auth = AuthConfig::default();
        assert!(!auth.is_configured());
        auth.provider_url = Some("https://xyz.supabase.co".into());
        auth.anon_key = Some("  ".into());
        assert!(!auth.is_configured());
        auth.anon_key = Some("public-anon".into());
        assert!(auth.is_configured());
    }
}
