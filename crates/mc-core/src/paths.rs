use crate::error::{McError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const MC_DIR: &str = "mission-control";
pub const PROJECTS_FILE: &str = "mission-control/projects.json";
pub const CONFIG_FILE: &str = "mission-control/config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn mc_dir(root: &Path) -> PathBuf {
    root.join(MC_DIR)
}

pub fn projects_path(root: &Path) -> PathBuf {
    root.join(PROJECTS_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Slug validation
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").expect("slug pattern is valid")
    })
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(McError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_slugs() {
        for slug in ["habit-tracker", "a", "pet-app-2", "x1"] {
            validate_slug(slug).unwrap_or_else(|_| panic!("expected valid: {slug}"));
        }
    }

    #[test]
    fn invalid_slugs() {
        for slug in [
            "",
            "-starts-with-dash",
            "ends-with-dash-",
            "has spaces",
            "UPPER",
            "a_b",
        ] {
            assert!(validate_slug(slug).is_err(), "expected invalid: {slug}");
        }
        assert!(validate_slug(&"a".repeat(65)).is_err());
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/ops");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/ops/mission-control/config.yaml")
        );
        assert_eq!(
            projects_path(root),
            PathBuf::from("/tmp/ops/mission-control/projects.json")
        );
        assert_eq!(mc_dir(root), PathBuf::from("/tmp/ops/mission-control"));
    }
}
