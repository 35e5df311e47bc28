//! Path resolution guard.
//!
//! Classifies a candidate write target as a blocked system path, an explicitly
//! allowed path, a traversal attempt, or a path inside the project or home
//! directory. Checks run in that order, so `../../etc/passwd` is reported as a
//! system path rather than as traversal.

use std::path::{Component, Path, PathBuf};

/// System prefixes that are never writable. `/var` exempts `/var/folders` and `/var/tmp`.
const BLOCKED_PREFIXES: &[&str] = &[
    "/etc",
    "/usr",
    "/bin",
    "/sbin",
    "/var",
    "/System",
    "/Library",
    "/Applications",
    "/Windows",
    "/Program Files",
    "/Program Files (x86)",
    "/ProgramData",
];

const VAR_EXEMPTIONS: &[&str] = &["/var/folders", "/var/tmp"];

/// Outcome of a path check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDecision {
    pub allowed: bool,
    pub reason: String,
}

impl PathDecision {
    fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

/// Home directory and caller-supplied allowed roots.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    pub home: Option<PathBuf>,
    pub extra_allowed: Vec<PathBuf>,
}

impl PathPolicy {
    /// Temp directories, `~/.claude`, then the extras.
    fn allowed_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![
            PathBuf::from("/tmp"),
            PathBuf::from("/private/tmp"),
            PathBuf::from("/var/tmp"),
            std::env::temp_dir(),
        ];
        if let Some(home) = &self.home {
            roots.push(home.join(".claude"));
        }
        roots.extend(self.extra_allowed.iter().cloned());
        roots
    }
}

/// Lexically normalize: drop `.`, resolve `..` without touching the filesystem.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Comparison key: forward slashes, lower case, drive letter stripped, no trailing slash.
fn key(path: &Path) -> String {
    let mut s = path.to_string_lossy().replace('\\', "/").to_lowercase();
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        s.drain(..2);
    }
    while s.len() > 1 && s.ends_with('/') {
        s.pop();
    }
    s
}

/// True if `path` is `prefix` or lies beneath it. Both must be keys.
fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches(['/', '\\'])),
        _ => PathBuf::from(path),
    }
}

fn contains_traversal(raw: &str) -> bool {
    raw.contains("..")
}

/// Decide whether `path` may be written from `cwd`.
pub fn is_path_allowed(path: &str, cwd: &Path, policy: &PathPolicy) -> PathDecision {
    let home = policy.home.as_deref();
    let expanded = expand_tilde(path, home);
    let cwd_abs = clean(&if cwd.is_absolute() {
        cwd.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(cwd)
    });
    let resolved = clean(&cwd_abs.join(expanded));
    let resolved_key = key(&resolved);

    for blocked in BLOCKED_PREFIXES {
        let blocked_key = blocked.to_lowercase();
        if !is_under(&resolved_key, &blocked_key) {
            continue;
        }
        if blocked_key == "/var" && VAR_EXEMPTIONS.iter().any(|e| is_under(&resolved_key, e)) {
            continue;
        }
        return PathDecision::deny(format!("System path blocked: {blocked}"));
    }

    if policy
        .allowed_roots()
        .iter()
        .any(|root| is_under(&resolved_key, &key(&clean(root))))
    {
        return PathDecision::allow("Allowed path");
    }

    let cwd_key = key(&cwd_abs);
    if contains_traversal(path) {
        if is_under(&resolved_key, &cwd_key) {
            return PathDecision::allow("Under cwd");
        }
        return PathDecision::deny("Path traversal detected");
    }

    if is_under(&resolved_key, &cwd_key) {
        return PathDecision::allow("Under cwd");
    }

    if let Some(home) = home {
        let home_key = key(&clean(home));
        if is_under(&resolved_key, &home_key) {
            if is_under(&cwd_key, &home_key) {
                return PathDecision::allow("Under home");
            }
            return PathDecision::allow("Under home (outside project)");
        }
    }

    PathDecision::deny("Path outside allowed directories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn policy(home: &str) -> PathPolicy {
        PathPolicy {
            home: Some(PathBuf::from(home)),
            extra_allowed: Vec::new(),
        }
    }

    fn check(path: &str, cwd: &str) -> PathDecision {
        is_path_allowed(path, Path::new(cwd), &policy("/home/dev"))
    }

    #[test]
    fn test_system_paths_blocked() {
        let d = is_path_allowed("/etc/passwd", Path::new("/tmp"), &PathPolicy::default());
        assert!(!d.allowed);
        assert!(d.reason.contains("System path blocked"));
        assert_eq!(
            check("/usr/local/bin/tool", "/home/dev/proj").reason,
            "System path blocked: /usr"
        );
        assert!(!check("/SYSTEM/Library/x", "/home/dev/proj").allowed);
        assert!(!check("/var/log/syslog", "/home/dev/proj").allowed);
    }

    #[test]
    fn test_prefix_requires_separator() {
        let d = check("/etcetera/file", "/etcetera");
        assert!(d.allowed);
        assert_eq!(d.reason, "Under cwd");
        assert!(!check("/binaries/x", "/home/dev/proj").reason.contains("System"));
    }

    #[test]
    fn test_var_exemptions() {
        let d = check("/var/tmp/build.log", "/home/dev/proj");
        assert!(d.allowed, "{d:?}");
        assert_eq!(d.reason, "Allowed path");
        assert!(!check("/var/tmpfoo/x", "/home/dev/proj").allowed);
    }

    #[test]
    fn test_traversal_into_system_path_reports_system() {
        let d = check("../../../../etc/passwd", "/home/dev/proj");
        assert_eq!(d.reason, "System path blocked: /etc");
    }

    #[test]
    fn test_temp_dir_allowed() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("test.txt");
        let d = is_path_allowed(target.to_str().unwrap(), dir.path(), &PathPolicy::default());
        assert!(d.allowed, "{:?}", d);
        assert!(check("/tmp/scratch.txt", "/home/dev/proj").allowed);
        assert_eq!(check("/tmp/scratch.txt", "/home/dev/proj").reason, "Allowed path");
    }

    #[test]
    fn test_claude_dir_and_extras() {
        assert_eq!(check("~/.claude/settings.json", "/srv/app").reason, "Allowed path");
        let policy = PathPolicy {
            home: None,
            extra_allowed: vec![PathBuf::from("/opt/shared")],
        };
        let d = is_path_allowed("/opt/shared/notes.md", Path::new("/srv/app"), &policy);
        assert_eq!(d.reason, "Allowed path");
    }

    #[test]
    fn test_relative_under_cwd() {
        let d = check("src/main.rs", "/home/dev/proj");
        assert!(d.allowed);
        assert_eq!(d.reason, "Under cwd");
    }

    #[test]
    fn test_traversal() {
        assert_eq!(check("src/../lib/mod.rs", "/home/dev/proj").reason, "Under cwd");
        let d = check("../other/file.txt", "/home/dev/proj");
        assert!(!d.allowed);
        assert_eq!(d.reason, "Path traversal detected");
    }

    #[test]
    fn test_home() {
        assert_eq!(check("~/notes.txt", "/home/dev/proj").reason, "Under home");
        assert_eq!(check("/home/dev/notes.txt", "/srv/app").reason, "Under home (outside project)");
    }

    #[test]
    fn test_outside() {
        let d = check("/opt/data/file", "/home/dev/proj");
        assert!(!d.allowed);
        assert_eq!(d.reason, "Path outside allowed directories");
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
    }
}
