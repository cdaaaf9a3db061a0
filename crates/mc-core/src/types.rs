use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline phase a project passes through, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Research,
    Brand,
    Design,
    Build,
    Qa,
    Launch,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[
            Stage::Research,
            Stage::Brand,
            Stage::Design,
            Stage::Build,
            Stage::Qa,
            Stage::Launch,
        ]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Research => "research",
            Stage::Brand => "brand",
            Stage::Design => "design",
            Stage::Build => "build",
            Stage::Qa => "qa",
            Stage::Launch => "launch",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Research => "Research",
            Stage::Brand => "Brand",
            Stage::Design => "Design",
            Stage::Build => "Build",
            Stage::Qa => "QA",
            Stage::Launch => "Launch",
        }
    }

    /// CSS colour used for reached progress segments while this is the
    /// current stage.
    pub fn color(self) -> &'static str {
        match self {
            Stage::Research => "#a855f7",
            Stage::Brand => "#ec4899",
            Stage::Design => "#3b82f6",
            Stage::Build => "#f97316",
            Stage::Qa => "#eab308",
            Stage::Launch => "#22c55e",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = crate::error::McError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::all()
            .iter()
            .copied()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| crate::error::McError::InvalidStage(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// UpdateKind
// ---------------------------------------------------------------------------

/// Category of an update. The set is open: unknown strings are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpdateKind {
    Progress,
    Milestone,
    Blocker,
    Handoff,
    #[default]
    Note,
    Other(String),
}

impl UpdateKind {
    pub fn as_str(&self) -> &str {
        match self {
            UpdateKind::Progress => "progress",
            UpdateKind::Milestone => "milestone",
            UpdateKind::Blocker => "blocker",
            UpdateKind::Handoff => "handoff",
            UpdateKind::Note => "note",
            UpdateKind::Other(s) => s,
        }
    }
}

impl From<String> for UpdateKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "progress" => UpdateKind::Progress,
            "milestone" => UpdateKind::Milestone,
            "blocker" => UpdateKind::Blocker,
            "handoff" => UpdateKind::Handoff,
            "note" => UpdateKind::Note,
            _ => UpdateKind::Other(s),
        }
    }
}

impl From<UpdateKind> for String {
    fn from(kind: UpdateKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A timestamped, agent-attributed note appended to a project's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    /// Raw timestamp as stored; parsed only when rendered.
    pub timestamp: String,
    #[serde(default)]
    pub agent: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: UpdateKind,
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assets {
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub demo_video: Option<String>,
    #[serde(default)]
    pub handoff_doc: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Assets {
    pub fn has_icon(&self) -> bool {
        present(&self.icon)
    }

    pub fn has_screenshots(&self) -> bool {
        self.screenshots.iter().any(|s| !s.trim().is_empty())
    }

    pub fn has_demo_video(&self) -> bool {
        present(&self.demo_video)
    }

    pub fn has_handoff_doc(&self) -> bool {
        present(&self.handoff_doc)
    }
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Pricing descriptor. `free` and `subscription` are independent flags; both
/// may be set (freemium) or neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub free: bool,
    #[serde(default)]
    pub subscription: bool,
    #[serde(default)]
    pub subscription_price: String,
}

impl Pricing {
    pub fn label(&self) -> String {
        let sub = if self.subscription_price.trim().is_empty() {
            "Subscription".to_string()
        } else {
            format!("Subscription ({})", self.subscription_price.trim())
        };
        match (self.free, self.subscription) {
            (true, true) => format!("Free + {sub}"),
            (true, false) => "Free".to_string(),
            (false, true) => sub,
            (false, false) => "Not set".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub app_store_title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pricing: Pricing,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    /// Raw stage value; resolve with [`crate::stage::resolve`].
    #[serde(default)]
    pub stage: String,
    #[serde(default, alias = "assignedTo")]
    pub agent: String,
    #[serde(default)]
    pub started_at: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_path: Option<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub assets: Assets,
    #[serde(default)]
    pub metadata: Metadata,
    /// Free-text last update from older project files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
