//! Dashboard view state and the render model derived from it.
//!
//! [`Dashboard`] owns the one-shot project load and the expansion selector for
//! a single page view. [`Dashboard::render`] is a pure function of that state
//! and produces a [`DashboardModel`] that the HTML and terminal renderers
//! consume without further logic.

use crate::config::Config;
use crate::error::Result;
use crate::expansion::Expansion;
use crate::feed::{self, AgentRoster, TimelineEntry};
use crate::load::LoadState;
use crate::stage::StageProgress;
use crate::types::{Metadata, Project};
use chrono::{FixedOffset, Offset, Utc};
use serde::Serialize;

/// Placeholder rows shown while the project list is loading, regardless of
/// how many projects eventually arrive.
pub const SKELETON_ROWS: usize = 3;
pub const EMPTY_MESSAGE: &str = "No active projects";

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// Display settings shared by every card.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub roster: AgentRoster,
    pub offset: FixedOffset,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            roster: AgentRoster::default(),
            offset: Utc.fix(),
        }
    }
}

impl RenderContext {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            roster: config.roster(),
            offset: config.utc_offset()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Render model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFlags {
    pub icon: bool,
    pub screenshots: usize,
    pub demo_video: bool,
    pub handoff_doc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub description: String,
    pub agent: String,
    pub agent_glyph: String,
    pub priority: String,
    pub started: Option<String>,
    pub timeline: Vec<TimelineEntry>,
    pub assets: AssetFlags,
    pub metadata: Metadata,
    pub pricing: String,
    pub brief_path: Option<String>,
    pub build_path: Option<String>,
    pub next_step: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCard {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub status: String,
    pub stage: String,
    pub stage_label: Option<&'static str>,
    pub progress: StageProgress,
    pub summary: String,
    pub expanded: bool,
    /// Expansion state reached by clicking this card's header.
    pub on_click: Expansion,
    /// Present for the expanded card, or for every card when rendered with
    /// [`Dashboard::render_with_details`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ProjectDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardModel {
    Loading {
        placeholders: usize,
    },
    Empty {
        message: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Projects {
        cards: Vec<ProjectCard>,
    },
}

fn asset_flags(project: &Project) -> AssetFlags {
    let a = &project.assets;
    AssetFlags {
        icon: a.has_icon(),
        screenshots: a.screenshots.iter().filter(|s| !s.trim().is_empty()).count(),
        demo_video: a.has_demo_video(),
        handoff_doc: a.has_handoff_doc(),
    }
}

fn detail(project: &Project, ctx: &RenderContext) -> ProjectDetail {
    ProjectDetail {
        description: project.description.clone(),
        agent: project.agent.clone(),
        agent_glyph: ctx.roster.glyph(&project.agent).to_string(),
        priority: project.priority.clone(),
        started: (!project.started_at.is_empty())
            .then(|| feed::format_timestamp(&project.started_at, ctx.offset)),
        timeline: feed::timeline(&project.updates, &ctx.roster, ctx.offset),
        assets: asset_flags(project),
        metadata: project.metadata.clone(),
        pricing: project.metadata.pricing.label(),
        brief_path: project.brief_path.clone(),
        build_path: project.build_path.clone(),
        next_step: project.next_step.clone(),
    }
}

/// Card for one project; a pure function of the record and the selector.
pub fn card(project: &Project, expansion: &Expansion, ctx: &RenderContext) -> ProjectCard {
    let mut card = card_head(project, expansion, ctx);
    if card.expanded {
        card.detail = Some(detail(project, ctx));
    }
    card
}

fn card_head(project: &Project, expansion: &Expansion, ctx: &RenderContext) -> ProjectCard {
    let progress = StageProgress::for_stage(&project.stage);
    let expanded = expansion.is_expanded(&project.id);
    ProjectCard {
        id: project.id.clone(),
        name: project.name.clone(),
        icon: project.icon.clone(),
        color: project.color.clone(),
        status: project.status.clone(),
        stage: project.stage.clone(),
        stage_label: progress.index.stage().map(|s| s.label()),
        summary: feed::last_update_summary(&project.updates, &ctx.roster),
        expanded,
        on_click: expansion.toggle(&project.id),
        detail: None,
        progress,
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    load: LoadState<Vec<Project>>,
    expansion: Expansion,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expansion(mut self, expansion: Expansion) -> Self {
        self.expansion = expansion;
        self
    }

    /// Settle the one-shot load. Only the first outcome is kept.
    pub fn resolve<E: std::fmt::Display>(&mut self, result: std::result::Result<Vec<Project>, E>) {
        if !self.load.is_pending() {
            tracing::debug!("ignoring second load outcome for this dashboard");
            return;
        }
        if let Err(e) = &result {
            tracing::warn!(error = %e, "project list failed to load; showing empty dashboard");
        }
        self.load = LoadState::from_result(result);
    }

    pub fn click(&mut self, id: &str) {
        self.expansion = self.expansion.toggle(id);
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    pub fn load_state(&self) -> &LoadState<Vec<Project>> {
        &self.load
    }

    /// Loaded projects; empty while pending and after a failure.
    pub fn projects(&self) -> &[Project] {
        self.load.ready().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn render(&self, ctx: &RenderContext) -> DashboardModel {
        self.render_cards(ctx, card)
    }

    /// Like [`render`](Self::render), but every card carries its detail so
    /// a client can switch expansion without another load.
    pub fn render_with_details(&self, ctx: &RenderContext) -> DashboardModel {
        self.render_cards(ctx, |p, expansion, ctx| {
            let mut card = card_head(p, expansion, ctx);
            card.detail = Some(detail(p, ctx));
            card
        })
    }

    fn render_cards(
        &self,
        ctx: &RenderContext,
        build: impl Fn(&Project, &Expansion, &RenderContext) -> ProjectCard,
    ) -> DashboardModel {
        match &self.load {
            LoadState::Pending => DashboardModel::Loading {
                placeholders: SKELETON_ROWS,
            },
            LoadState::Failed(reason) => DashboardModel::Empty {
                message: EMPTY_MESSAGE,
                error: Some(reason.clone()),
            },
            LoadState::Ready(projects) if projects.is_empty() => DashboardModel::Empty {
                message: EMPTY_MESSAGE,
                error: None,
            },
            LoadState::Ready(projects) => DashboardModel::Projects {
                cards: projects
                    .iter()
                    .map(|p| build(p, &self.expansion, ctx))
                    .collect(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Overview (server-rendered card list)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub last_update: String,
    pub next_step: Option<String>,
    pub assigned_to: Option<String>,
}

pub fn overview_rows(projects: &[Project], ctx: &RenderContext) -> Vec<OverviewRow> {
    projects
        .iter()
        .map(|p| OverviewRow {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            status: p.status.clone(),
            last_update: match (&p.last_update, p.updates.is_empty()) {
                (Some(text), true) => text.clone(),
                _ => feed::last_update_summary(&p.updates, &ctx.roster),
            },
            next_step: p.next_step.clone(),
            assigned_to: (!p.agent.is_empty()).then(|| p.agent.clone()),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
