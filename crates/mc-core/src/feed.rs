//! Update feed formatting: the collapsed "last update" line, per-update
//! timestamp labels and agent glyphs.

use crate::types::Update;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;

pub const NO_UPDATES: &str = "No updates yet";
pub const INVALID_TIME: &str = "Invalid time";
pub const DEFAULT_GLYPH: &str = "🤖";
pub const SUMMARY_MAX_CHARS: usize = 60;
pub const ELLIPSIS: &str = "...";

// ---------------------------------------------------------------------------
// Agent glyphs
// ---------------------------------------------------------------------------

fn builtin_glyph(agent: &str) -> Option<&'static str> {
    match agent {
        "ozzy" => Some("🦉"),
        "jace" => Some("🕵️"),
        "pixel" => Some("🎨"),
        "forge" => Some("🔨"),
        "scout" => Some("🔭"),
        "herald" => Some("📣"),
        "tester" => Some("🧪"),
        _ => None,
    }
}

/// Agent id → glyph lookup. Configured overrides win over the built-in
/// roster; anything else gets [`DEFAULT_GLYPH`].
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    overrides: HashMap<String, String>,
}

impl AgentRoster {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn glyph<'a>(&'a self, agent: &str) -> &'a str {
        if let Some(g) = self.overrides.get(agent).filter(|g| !g.trim().is_empty()) {
            return g;
        }
        builtin_glyph(agent).unwrap_or(DEFAULT_GLYPH)
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Cut `message` to [`SUMMARY_MAX_CHARS`] characters, marking the cut.
pub fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(SUMMARY_MAX_CHARS) {
        Some((byte, _)) => format!("{}{ELLIPSIS}", &message[..byte]),
        None => message.to_string(),
    }
}

/// One-line summary of the last update in storage order.
pub fn last_update_summary(updates: &[Update], roster: &AgentRoster) -> String {
    match updates.last() {
        None => NO_UPDATES.to_string(),
        Some(u) => format!("{} {}", roster.glyph(&u.agent), truncate_message(&u.message)),
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse a stored timestamp. RFC 3339 is preferred; naive date-times and bare
/// dates are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render as `<Mon> <day>, <HH>:<MM>` in `offset`, or [`INVALID_TIME`].
pub fn format_timestamp(raw: &str, offset: FixedOffset) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.with_timezone(&offset).format("%b %-d, %H:%M").to_string(),
        None => INVALID_TIME.to_string(),
    }
}

/// A single rendered timeline row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TimelineEntry {
    pub glyph: String,
    pub agent: String,
    pub time: String,
    pub kind: String,
    pub message: String,
}

/// Timeline rows in storage order.
pub fn timeline(updates: &[Update], roster: &AgentRoster, offset: FixedOffset) -> Vec<TimelineEntry> {
    updates
        .iter()
        .map(|u| TimelineEntry {
            glyph: roster.glyph(&u.agent).to_string(),
            agent: u.agent.clone(),
            time: format_timestamp(&u.timestamp, offset),
            kind: u.kind.to_string(),
            message: u.message.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UpdateKind;

    fn update(agent: &str, message: &str, ts: &str) -> Update {
        Update {
            timestamp: ts.to_string(),
            agent: agent.to_string(),
            message: message.to_string(),
            kind: UpdateKind::Progress,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn empty_feed_uses_placeholder() {
        assert_eq!(last_update_summary(&[], &AgentRoster::default()), "No updates yet");
    }

    #[test]
    fn short_message_is_kept_whole() {
        let msg = "x".repeat(60);
        let s = last_update_summary(&[update("ozzy", &msg, "")], &AgentRoster::default());
        assert_eq!(s, format!("🦉 {msg}"));
    }

    #[test]
    fn long_message_is_cut_at_sixty_chars() {
        let msg = "y".repeat(61);
        let s = last_update_summary(&[update("ozzy", &msg, "")], &AgentRoster::default());
        assert_eq!(s, format!("🦉 {}...", "y".repeat(60)));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let msg = "é".repeat(70);
        let cut = truncate_message(&msg);
        assert_eq!(cut.chars().count(), 63);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn summary_uses_last_in_storage_order() {
        let updates = vec![
            update("scout", "newest by time", "2026-03-01T00:00:00Z"),
            update("forge", "last in list", "2026-01-01T00:00:00Z"),
        ];
        let s = last_update_summary(&updates, &AgentRoster::default());
        assert_eq!(s, "🔨 last in list");
    }

    #[test]
    fn unknown_agent_gets_default_glyph() {
        let roster = AgentRoster::default();
        assert_eq!(roster.glyph("nobody"), DEFAULT_GLYPH);
        assert_eq!(roster.glyph(""), DEFAULT_GLYPH);
    }

    #[test]
    fn roster_overrides_win() {
        let mut map = HashMap::new();
        map.insert("ozzy".to_string(), "🐺".to_string());
        map.insert("newbie".to_string(), "🐣".to_string());
        let roster = AgentRoster::new(map);
        assert_eq!(roster.glyph("ozzy"), "🐺");
        assert_eq!(roster.glyph("newbie"), "🐣");
        assert_eq!(roster.glyph("forge"), "🔨");
    }

    #[test]
    fn blank_override_falls_back() {
        let mut map = HashMap::new();
        map.insert("forge".to_string(), "  ".to_string());
        map.insert("ghost".to_string(), "\t".to_string());
        let roster = AgentRoster::new(map);
        assert_eq!(roster.glyph("forge"), "🔨");
        assert_eq!(roster.glyph("ghost"), DEFAULT_GLYPH);
    }

    #[test]
    fn formats_rfc3339_timestamp() {
        assert_eq!(format_timestamp("2026-02-27T12:05:00Z", utc()), "Feb 27, 12:05");
        assert_eq!(format_timestamp("2026-03-01T09:00:00+02:00", utc()), "Mar 1, 07:00");
    }

    #[test]
    fn applies_fixed_offset() {
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(format_timestamp("2026-02-27T23:30:00Z", east), "Feb 28, 01:30");
    }

    #[test]
    fn naive_and_date_only_timestamps_parse_as_utc() {
        assert_eq!(format_timestamp("2026-02-27T12:00:00", utc()), "Feb 27, 12:00");
        assert_eq!(format_timestamp("2026-02-27 08:15", utc()), "Feb 27, 08:15");
        assert_eq!(format_timestamp("2026-02-27", utc()), "Feb 27, 00:00");
    }

    #[test]
    fn invalid_timestamp_renders_marker() {
        assert_eq!(format_timestamp("yesterday-ish", utc()), INVALID_TIME);
        assert_eq!(format_timestamp("", utc()), INVALID_TIME);
        assert_eq!(format_timestamp("2026-13-45T99:00:00Z", utc()), INVALID_TIME);
    }

    #[test]
    fn timeline_keeps_storage_order() {
        let updates = vec![
            update("ozzy", "one", "2026-01-03T00:00:00Z"),
            update("jace", "two", "2026-01-01T00:00:00Z"),
            update("mystery", "three", "bad"),
        ];
        let rows = timeline(&updates, &AgentRoster::default(), utc());
        let messages: Vec<&str> = rows.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, ["one", "two", "three"]);
        assert_eq!(rows[2].time, INVALID_TIME);
        assert_eq!(rows[2].glyph, DEFAULT_GLYPH);
    }
}
