use std::path::{Path, PathBuf};

/// Resolve the Mission Control root directory.
///
/// Priority:
/// 1. `--root` flag / `MC_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `mission-control/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, mc_core::paths::MC_DIR)
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_mission_control_dir_from_subdir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("mission-control")).unwrap();
        let subdir = dir.path().join("apps/deep");
        std::fs::create_dir_all(&subdir).unwrap();
        assert_eq!(
            find_upward(&subdir, "mission-control").as_deref(),
            Some(dir.path())
        );
    }

    #[test]
    fn marker_dir_beats_git() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let inner = dir.path().join("ops");
        std::fs::create_dir_all(inner.join("mission-control")).unwrap();
        assert_eq!(find_upward(&inner, "mission-control").as_deref(), Some(inner.as_path()));
        assert_eq!(find_upward(&inner, ".git").as_deref(), Some(dir.path()));
    }
}
