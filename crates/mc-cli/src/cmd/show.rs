use crate::output::print_json;
use anyhow::Context;
use mc_core::config::Config;
use mc_core::dashboard::{Dashboard, DashboardModel, ProjectCard, ProjectDetail, RenderContext};
use mc_core::expansion::Expansion;
use mc_core::stage::SegmentState;
use std::fmt::Write;
use std::path::Path;

pub fn run(root: &Path, expand: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let ctx = RenderContext::from_config(&config).context("invalid dashboard config")?;

    let mut dashboard = Dashboard::new().with_expansion(Expansion::from_param(expand));
    dashboard.resolve(super::fetch_projects(root, &config)?);
    let model = dashboard.render(&ctx);

    if json {
        return print_json(&model);
    }
    if let Some(reason) = dashboard.load_state().failure() {
        eprintln!("warning: {reason}");
    }
    print!("{}", render_text(&config.dashboard.title, &model));
    Ok(())
}

fn progress_bar(card: &ProjectCard) -> String {
    let bar: String = card
        .progress
        .segments
        .iter()
        .map(|s| match s.state {
            SegmentState::Reached => '■',
            SegmentState::Pending => '□',
        })
        .collect();
    format!("[{bar}] {}", card.progress.label)
}

fn render_detail(out: &mut String, detail: &ProjectDetail) {
    if !detail.description.is_empty() {
        let _ = writeln!(out, "    {}", detail.description);
    }
    let mut field = |label: &str, value: &str| {
        if !value.is_empty() {
            let _ = writeln!(out, "    {label:<10} {value}");
        }
    };
    if !detail.agent.is_empty() {
        field("Agent", &format!("{} {}", detail.agent_glyph, detail.agent));
    }
    field("Priority", &detail.priority);
    field("Started", detail.started.as_deref().unwrap_or(""));
    field("Next", detail.next_step.as_deref().unwrap_or(""));
    field("Pricing", &detail.pricing);

    let a = &detail.assets;
    let mark = |present: bool| if present { "✓" } else { "✗" };
    let _ = writeln!(
        out,
        "    Assets     icon {}  screenshots {}  demo {}  handoff {}",
        mark(a.icon),
        a.screenshots,
        mark(a.demo_video),
        mark(a.handoff_doc)
    );

    if !detail.timeline.is_empty() {
        let _ = writeln!(out, "    Timeline");
        for e in &detail.timeline {
            let _ = writeln!(
                out,
                "      {:<14} {} {:<8} {:<10} {}",
                e.time, e.glyph, e.agent, e.kind, e.message
            );
        }
    }
}

/// Plain-text rendering of the dashboard model.
pub fn render_text(title: &str, model: &DashboardModel) -> String {
    let mut out = format!("{title}\n\n");
    match model {
        DashboardModel::Loading { placeholders } => {
            for _ in 0..*placeholders {
                out.push_str("  ░░░░░░░░░░░░░░░░\n");
            }
        }
        DashboardModel::Empty { message, .. } => {
            let _ = writeln!(out, "  {message}");
        }
        DashboardModel::Projects { cards } => {
            for card in cards {
                let marker = if card.expanded { '▾' } else { '▸' };
                let stage = card.stage_label.unwrap_or("Unknown stage");
                let _ = writeln!(
                    out,
                    "{marker} {} {}  [{stage}]  {}",
                    card.icon, card.name, card.status
                );
                let _ = writeln!(out, "  {}", progress_bar(card));
                let _ = writeln!(out, "  {}", card.summary);
                if let Some(detail) = &card.detail {
                    render_detail(&mut out, detail);
                }
                out.push('\n');
            }
        }
    }
    out
}
