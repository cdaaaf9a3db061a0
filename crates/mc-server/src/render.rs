//! Server-side HTML for the dashboard, overview and login pages.
//!
//! Every function here is a pure string builder over core render models;
//! user-supplied text always goes through [`escape`].

use mc_core::auth::AuthMode;
use mc_core::dashboard::{DashboardModel, OverviewRow, ProjectCard, ProjectDetail};
use mc_core::expansion::Expansion;
use mc_core::stage::SegmentState;
use std::fmt::Write;

use crate::session::CurrentSession;

pub const FRAGMENT_PATH: &str = "/fragments/dashboard";

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a query component.
pub fn encode_query(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}

/// Link target that puts the page into `expansion`.
pub fn expansion_href(base: &str, expansion: &Expansion) -> String {
    match expansion.expanded_id() {
        Some(id) => format!("{base}?expanded={}", encode_query(id)),
        None => base.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub struct Notice<'a> {
    pub text: &'a str,
    pub success: bool,
}

fn layout(title: &str, session: &CurrentSession, notice: Option<&Notice<'_>>, body: &str) -> String {
    let account = match session.email() {
        Some(email) => format!(
            r#"<span class="who">{}</span><form method="post" action="/logout"><button type="submit">Sign out</button></form>"#,
            escape(email)
        ),
        None => r#"<a href="/login">Sign in</a>"#.to_string(),
    };
    let notice = notice
        .map(|n| {
            format!(
                r#"<p class="notice {}" role="status">{}</p>"#,
                if n.success { "ok" } else { "err" },
                escape(n.text)
            )
        })
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<header class="top"><a class="brand" href="/">{title}</a><nav><a href="/overview">Overview</a>{account}</nav></header>
<main>
{notice}{body}
</main>
<script src="/assets/dashboard.js" defer></script>
</body>
</html>
"#,
        title = escape(title),
    )
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Page shell: skeleton rows plus the fragment URL the script loads once.
/// `timeout_secs` is the server's fetch timeout; the script waits a little
/// longer than that before giving up.
pub fn dashboard_page(
    title: &str,
    expansion: &Expansion,
    timeout_secs: u64,
    session: &CurrentSession,
    notice: Option<&Notice<'_>>,
) -> String {
    let skeleton = dashboard_fragment(&DashboardModel::Loading {
        placeholders: mc_core::dashboard::SKELETON_ROWS,
    });
    let body = format!(
        r#"<section id="dashboard" data-src="{}" data-timeout="{timeout_secs}" aria-busy="true">{skeleton}</section>"#,
        escape(&expansion_href(FRAGMENT_PATH, expansion)),
    );
    layout(title, session, notice, &body)
}

pub fn dashboard_fragment(model: &DashboardModel) -> String {
    match model {
        DashboardModel::Loading { placeholders } => {
            let mut out = String::from(r#"<div class="cards loading">"#);
            for _ in 0..*placeholders {
                out.push_str(r#"<div class="card skeleton"><div class="bar"></div><div class="bar short"></div></div>"#);
            }
            out.push_str("</div>");
            out
        }
        DashboardModel::Empty { message, error } => {
            let mut out = format!(r#"<p class="empty">{}</p>"#, escape(message));
            if let Some(reason) = error {
                let _ = write!(out, r#"<p class="load-error">{}</p>"#, escape(reason));
            }
            out
        }
        DashboardModel::Projects { cards } => {
            let mut out = String::from(r#"<div class="cards">"#);
            for c in cards {
                out.push_str(&card_html(c));
            }
            out.push_str("</div>");
            out
        }
    }
}

fn progress_html(card: &ProjectCard) -> String {
    let mut out = String::from(r#"<div class="progress">"#);
    for seg in &card.progress.segments {
        let _ = write!(
            out,
            r#"<span class="seg {}" style="background:{}" title="{}"></span>"#,
            match seg.state {
                SegmentState::Reached => "reached",
                SegmentState::Pending => "pending",
            },
            seg.color,
            seg.stage.label(),
        );
    }
    let _ = write!(
        out,
        r#"<span class="progress-label">{}</span></div>"#,
        escape(&card.progress.label)
    );
    out
}

fn card_html(card: &ProjectCard) -> String {
    let stage = card.stage_label.unwrap_or("Unknown stage");
    let mut out = format!(
        r#"<article class="card{expanded}" id="project-{id}" data-id="{id}" style="border-color:{color}">
<a class="card-head" href="{href}" data-toggle aria-expanded="{aria}">
<span class="icon">{icon}</span><span class="name">{name}</span><span class="stage">{stage}</span><span class="status">{status}</span>
</a>
{progress}<p class="summary">{summary}</p>"#,
        expanded = if card.expanded { " expanded" } else { "" },
        id = escape(&card.id),
        color = escape(&card.color),
        href = escape(&expansion_href("/", &card.on_click)),
        aria = card.expanded,
        icon = escape(&card.icon),
        name = escape(&card.name),
        stage = escape(stage),
        status = escape(&card.status),
        progress = progress_html(card),
        summary = escape(&card.summary),
    );
    if let Some(detail) = &card.detail {
        out.push_str(&detail_html(detail, !card.expanded));
    }
    out.push_str("</article>");
    out
}

fn detail_html(detail: &ProjectDetail, hidden: bool) -> String {
    let mut out = String::from(if hidden {
        r#"<div class="detail" hidden>"#
    } else {
        r#"<div class="detail">"#
    });
    if !detail.description.is_empty() {
        let _ = write!(out, r#"<p class="description">{}</p>"#, escape(&detail.description));
    }

    out.push_str("<dl>");
    let mut field = |label: &str, value: &str| {
        if !value.is_empty() {
            let _ = write!(out, "<dt>{}</dt><dd>{}</dd>", label, escape(value));
        }
    };
    if !detail.agent.is_empty() {
        field("Agent", &format!("{} {}", detail.agent_glyph, detail.agent));
    }
    field("Priority", &detail.priority);
    field("Started", detail.started.as_deref().unwrap_or(""));
    field("Next step", detail.next_step.as_deref().unwrap_or(""));
    field("Brief", detail.brief_path.as_deref().unwrap_or(""));
    field("Build", detail.build_path.as_deref().unwrap_or(""));
    field("App Store title", &detail.metadata.app_store_title);
    field("Subtitle", &detail.metadata.subtitle);
    field("Category", &detail.metadata.category);
    field("Keywords", &detail.metadata.keywords.join(", "));
    field("Pricing", &detail.pricing);
    out.push_str("</dl>");

    let a = &detail.assets;
    let _ = write!(
        out,
        r#"<ul class="assets"><li class="{}">Icon</li><li class="{}">Screenshots ({})</li><li class="{}">Demo video</li><li class="{}">Handoff doc</li></ul>"#,
        present(a.icon),
        present(a.screenshots > 0),
        a.screenshots,
        present(a.demo_video),
        present(a.handoff_doc),
    );

    out.push_str(r#"<ol class="timeline">"#);
    for entry in &detail.timeline {
        let _ = write!(
            out,
            r#"<li class="update {kind}"><span class="glyph">{glyph}</span><span class="agent">{agent}</span><time>{time}</time><span class="kind">{kind}</span><p>{message}</p></li>"#,
            kind = escape(&entry.kind),
            glyph = escape(&entry.glyph),
            agent = escape(&entry.agent),
            time = escape(&entry.time),
            message = escape(&entry.message),
        );
    }
    out.push_str("</ol></div>");
    out
}

fn present(flag: bool) -> &'static str {
    if flag {
        "present"
    } else {
        "missing"
    }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview_page(
    title: &str,
    rows: &[OverviewRow],
    error: Option<&str>,
    session: &CurrentSession,
) -> String {
    let mut body = String::from(r#"<h1>Overview</h1>"#);
    if let Some(e) = error {
        let _ = write!(body, r#"<p class="load-error">{}</p>"#, escape(e));
    }
    if rows.is_empty() {
        let _ = write!(
            body,
            r#"<p class="empty">{}</p>"#,
            mc_core::dashboard::EMPTY_MESSAGE
        );
    } else {
        body.push_str(r#"<div class="overview">"#);
        for row in rows {
            let _ = write!(
                body,
                r#"<article class="row" id="overview-{id}"><h2>{name}</h2><span class="status">{status}</span><p>{description}</p><p class="last">{last}</p>"#,
                id = escape(&row.id),
                name = escape(&row.name),
                status = escape(&row.status),
                description = escape(&row.description),
                last = escape(&row.last_update),
            );
            if let Some(next) = &row.next_step {
                let _ = write!(body, r#"<p class="next">Next: {}</p>"#, escape(next));
            }
            if let Some(agent) = &row.assigned_to {
                let _ = write!(body, r#"<p class="agent">Assigned to {}</p>"#, escape(agent));
            }
            body.push_str("</article>");
        }
        body.push_str("</div>");
    }
    layout(title, session, None, &body)
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

pub fn login_page(
    title: &str,
    mode: AuthMode,
    email: &str,
    notice: Option<&Notice<'_>>,
    session: &CurrentSession,
) -> String {
    let (prompt, link) = mode.switch_prompt();
    let body = format!(
        r#"<section class="auth">
<h1>{heading}</h1>
<form method="post" action="/login" data-once>
<input type="hidden" name="mode" value="{mode}">
<label>Email <input type="email" name="email" value="{email}" required autocomplete="email"></label>
<label>Password <input type="password" name="password" required autocomplete="{autocomplete}"></label>
<button type="submit">{submit}</button>
</form>
<p class="switch">{prompt} <a href="/login?mode={other}">{link}</a></p>
</section>"#,
        heading = escape(mode.title()),
        mode = mode.as_str(),
        email = escape(email),
        autocomplete = match mode {
            AuthMode::SignIn => "current-password",
            AuthMode::SignUp => "new-password",
        },
        submit = mode.submit_label(),
        prompt = escape(prompt),
        other = mode.toggle().as_str(),
    );
    layout(title, session, notice, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mc_core::dashboard::{Dashboard, RenderContext};
    use mc_core::project::parse_projects;

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(
            escape(r#"<script>"x" & 'y'</script>"#),
            "&lt;script&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn encode_query_keeps_unreserved() {
        assert_eq!(encode_query("app-1_v2.x~"), "app-1_v2.x~");
        assert_eq!(encode_query("a b&c"), "a%20b%26c");
    }

    #[test]
    fn expansion_href_round_trips_collapsed() {
        assert_eq!(expansion_href("/", &Expansion::Collapsed), "/");
        assert_eq!(
            expansion_href("/", &Expansion::Expanded("alpha".into())),
            "/?expanded=alpha"
        );
    }

    #[test]
    fn loading_fragment_has_three_skeletons() {
        let html = dashboard_fragment(&DashboardModel::Loading { placeholders: 3 });
        assert_eq!(html.matches("card skeleton").count(), 3);
    }

    #[test]
    fn shell_points_at_fragment_with_expansion() {
        let html = dashboard_page(
            "Mission Control",
            &Expansion::Expanded("a b".into()),
            10,
            &CurrentSession::default(),
            None,
        );
        assert!(html.contains(r#"data-src="/fragments/dashboard?expanded=a%20b""#));
        assert!(html.contains(r#"data-timeout="10""#));
        assert_eq!(html.matches("card skeleton").count(), 3);
        assert!(html.contains(r#"href="/login""#));
    }

    #[test]
    fn card_links_toggle_expansion() {
        let mut d = Dashboard::new();
        d.resolve(parse_projects(
            r#"[{"id":"a","name":"<A>","stage":"build",
                 "updates":[{"timestamp":"2026-01-01T00:00:00Z","agent":"forge","message":"ship it"}]},
                {"id":"b","name":"B"}]"#,
        ));
        d.click("a");
        let html = dashboard_fragment(&d.render(&RenderContext::default()));
        assert!(html.contains(r#"href="/" data-toggle aria-expanded="true""#));
        assert!(html.contains(r#"href="/?expanded=b""#));
        assert!(html.contains("&lt;A&gt;"));
        assert!(html.contains("4/6 stages"));
        assert!(html.contains(r#"class="timeline""#));
        assert_eq!(html.matches(r#"class="detail""#).count(), 1);
    }

    #[test]
    fn collapsed_details_render_hidden() {
        let mut d = Dashboard::new();
        d.resolve(parse_projects(
            r#"[{"id":"a","name":"A","description":"alpha notes"},
                {"id":"b","name":"B","description":"beta notes"},
                {"id":"c","name":"C"}]"#,
        ));
        d.click("b");
        let html = dashboard_fragment(&d.render_with_details(&RenderContext::default()));
        assert_eq!(html.matches(r#"class="detail""#).count(), 3);
        assert_eq!(html.matches(r#"class="detail" hidden"#).count(), 2);
        assert!(html.contains("alpha notes"));
        assert!(html.contains(r#"data-id="b""#));
        assert!(html.contains(r#"class="card expanded" id="project-b""#));
    }

    #[test]
    fn empty_fragment_shows_message_and_reason() {
        let html = dashboard_fragment(&DashboardModel::Empty {
            message: "No active projects",
            error: Some("timed out".into()),
        });
        assert!(html.contains("No active projects"));
        assert!(html.contains("timed out"));
    }

    #[test]
    fn login_page_offers_other_mode() {
        let html = login_page(
            "Mission Control",
            AuthMode::SignUp,
            "a@b.co",
            Some(&Notice {
                text: "Check your email for a magic link to sign in!",
                success: true,
            }),
            &CurrentSession::default(),
        );
        assert!(html.contains("Sign Up for Mission Control"));
        assert!(html.contains(r#"href="/login?mode=sign-in">Sign In</a>"#));
        assert!(html.contains(r#"value="sign-up""#));
        assert!(html.contains("notice ok"));
    }
}
