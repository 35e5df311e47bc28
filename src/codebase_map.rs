//! Once-per-session codebase map.
//!
//! Renders a filtered directory tree the first time a session asks for it and
//! records the session in a [`SessionStore`] so later prompts stay quiet.

use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::state::SessionStore;
use glob::{MatchOptions, Pattern};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Used when no include globs are configured.
pub const DEFAULT_INCLUDE: &[&str] = &[
    "src",
    "src/**",
    "lib",
    "lib/**",
    "cmd",
    "cmd/**",
    "internal",
    "internal/**",
    "tests",
    "tests/**",
    "docs",
    "docs/**",
    "scripts",
    "scripts/**",
    "*.md",
    "*.toml",
    "*.yaml",
    "*.yml",
    "*.json",
    "*.sh",
    "*.py",
    "*.go",
    "*.rs",
    "*.ts",
    "docker-compose*.yml",
];

const RULE_WIDTH: usize = 60;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn glob_matches(pattern: &str, candidate: &str) -> bool {
    Pattern::new(pattern).is_ok_and(|p| p.matches_with(candidate, GLOB_OPTIONS))
}

/// True if the entry at `rel` (slash-separated, relative to the root) is included.
pub fn matches_include(rel: &str, include: &[String]) -> bool {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    include.iter().any(|raw| {
        let pattern = raw.replace('\\', "/");
        if name == pattern || glob_matches(&pattern, rel) || glob_matches(&pattern, name) {
            return true;
        }
        if let Some(dir) = pattern.strip_suffix("/**") {
            return rel == dir || rel.strip_prefix(dir).is_some_and(|r| r.starts_with('/'));
        }
        (pattern.contains('/') || pattern.contains('*'))
            && glob_matches(&format!("**/{pattern}"), rel)
    })
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default()
}

fn sort_key(entry: &DirEntry) -> (bool, String) {
    (!entry.file_type().is_dir(), entry.file_name().to_string_lossy().to_lowercase())
}

/// Render the filtered tree below `root`; empty when nothing matches.
///
/// Directories come before files at each level, then names case-insensitively.
/// Excluded directories are not descended into.
pub fn render_tree(root: &Path, max_depth: usize, include: &[String]) -> String {
    let entries: Vec<(usize, String)> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by(|a, b| sort_key(a).cmp(&sort_key(b)))
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || matches_include(&relative(root, e.path()), include))
        .filter_map(Result::ok)
        .map(|e| (e.depth(), e.file_name().to_string_lossy().into_owned()))
        .collect();

    // One flag per ancestor level: whether more siblings follow it.
    let mut open: Vec<bool> = Vec::new();
    let mut lines = Vec::with_capacity(entries.len());
    for (i, (depth, name)) in entries.iter().enumerate() {
        let last = entries[i + 1..]
            .iter()
            .take_while(|(d, _)| d >= depth)
            .all(|(d, _)| d != depth);
        open.truncate(depth - 1);
        let prefix: String = open
            .iter()
            .map(|&more| if more { "│   " } else { "    " })
            .collect();
        let connector = if last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{connector}{name}"));
        open.push(!last);
    }
    lines.join("\n")
}

/// Options for [`codebase_map`].
#[derive(Debug, Clone, Copy)]
pub struct MapOptions<'a> {
    pub max_depth: usize,
    pub include: &'a [String],
}

/// Attach the codebase map to the first prompt of a session.
pub fn codebase_map(
    input: &ToolInvocation,
    root: &Path,
    options: MapOptions<'_>,
    store: &dyn SessionStore,
) -> Decision {
    if input.stop_hook_active() {
        return Decision::allow();
    }

    let session_id = match input.session_id() {
        "" => "default",
        id => id,
    };

    match store.is_done(session_id) {
        Ok(true) => return Decision::allow(),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "session store unreadable"),
    }

    if !root.is_dir() {
        return Decision::allow();
    }

    let defaults: Vec<String>;
    let include = if options.include.is_empty() {
        defaults = DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect();
        &defaults
    } else {
        options.include
    };
    let max_depth = if options.max_depth == 0 { 3 } else { options.max_depth };

    let tree = render_tree(root, max_depth, include);
    if tree.is_empty() {
        return Decision::allow();
    }

    if let Err(e) = store.mark_done(session_id) {
        tracing::warn!(session_id, error = %e, "failed to record codebase map for session");
    }

    let rule = "=".repeat(RULE_WIDTH);
    Decision::allow_with_message(format!("\n{rule}\nCODEBASE STRUCTURE\n{rule}\n{tree}\n{rule}\n"))
}
