//! Just-in-time context for prompts.
//!
//! Pulls file globs, explicit paths and keywords out of a free-text prompt,
//! resolves them against the project, and returns bounded excerpts. Nothing
//! found means no message; this never fails.

use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::decision::Decision;

pub const MAX_FILE_SIZE: u64 = 100_000;
pub const MAX_FILES: usize = 5;
pub const MAX_GREP_HITS: usize = 10;
pub const HEAD_LINES: usize = 30;
pub const TAIL_LINES: usize = 20;
pub const MAX_KEYWORDS: usize = 2;
const MIN_PROMPT_LEN: usize = 10;
const MAX_SEARCH_FILES: usize = 50;
const PREVIEW_CHARS: usize = 100;

const SEARCH_EXTENSIONS: &[&str] = &["py", "ts", "js", "go", "rs", "md"];
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target"];

static GLOB_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[*?\[\]{}]+[.\w/]*|[\w./]+[*?\[\]{}]+[\w./]*").unwrap()
});
static EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.(py|ts|js|tsx|jsx|md|json|yaml|yml|toml|sh|sql|go|rs|java|rb)\b").unwrap()
});
static PATH_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\.?/)?(?:[\w.-]+/)+[\w.-]*(?:\.\w+)?|[\w.-]+\.(?:py|ts|js|md|json|yaml|yml|go|rs|java|rb)",
    )
    .unwrap()
});
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z]+\b|\b[a-z]+_[a-z_]+\b").unwrap());

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Candidates pulled from a prompt.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Candidates {
    pub patterns: Vec<String>,
    pub paths: Vec<String>,
    pub keywords: Vec<String>,
}

fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, value: String) {
    if seen.insert(value.clone()) {
        out.push(value);
    }
}

/// Glob-like fragments, plus `*.ext` for every extension mentioned.
pub fn extract_patterns(prompt: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for m in GLOB_LIKE.find_iter(prompt) {
        let m = m.as_str().trim();
        if !m.is_empty() {
            push_unique(&mut out, &mut seen, m.to_string());
        }
    }
    for m in EXTENSION.find_iter(prompt) {
        push_unique(&mut out, &mut seen, format!("*{}", m.as_str()));
    }
    out
}

/// Path-like substrings, skipping URLs and tiny fragments.
pub fn extract_paths(prompt: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for m in PATH_LIKE.find_iter(prompt) {
        let m = m.as_str().trim();
        if m.len() > 2 && !m.starts_with("http") {
            push_unique(&mut out, &mut seen, m.to_string());
        }
    }
    out
}

/// Quoted strings, then CamelCase / snake_case identifiers; at most [`MAX_KEYWORDS`].
pub fn extract_keywords(prompt: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for caps in QUOTED.captures_iter(prompt) {
        let kw = caps[1].trim();
        if kw.len() >= 3 {
            push_unique(&mut out, &mut seen, kw.to_string());
        }
    }
    for m in IDENTIFIER.find_iter(prompt) {
        if m.as_str().len() >= 3 {
            push_unique(&mut out, &mut seen, m.as_str().to_string());
        }
    }
    out.truncate(MAX_KEYWORDS);
    out
}

pub fn extract_candidates(prompt: &str) -> Candidates {
    Candidates {
        patterns: extract_patterns(prompt),
        paths: extract_paths(prompt),
        keywords: extract_keywords(prompt),
    }
}

/// Name-ordered regular files under `root`, skipping VCS and dependency dirs.
fn project_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() > 0 && e.file_type().is_dir() && is_skipped(e.file_name())))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
}

fn is_skipped(name: &OsStr) -> bool {
    SKIP_DIRS.iter().any(|s| name == *s)
}

/// True if `path` resolves to somewhere beneath `root`.
fn is_inside(root: &Path, path: &Path) -> bool {
    match (root.canonicalize(), path.canonicalize()) {
        (Ok(root), Ok(path)) => path.starts_with(root),
        _ => false,
    }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Whole file when short, otherwise the first and last lines around an omission marker.
pub fn head_tail(path: &Path) -> String {
    let Ok(bytes) = fs::read(path) else {
        return String::new();
    };
    let text = String::from_utf8_lossy(&bytes);
    let lines: Vec<&str> = text.lines().collect();
    let total = lines.len();
    if total <= HEAD_LINES + TAIL_LINES {
        return lines.join("\n");
    }
    let omitted = total - HEAD_LINES - TAIL_LINES;
    format!(
        "{}\n\n... [{omitted} lines omitted] ...\n\n{}",
        lines[..HEAD_LINES].join("\n"),
        lines[total - TAIL_LINES..].join("\n")
    )
}

fn small_enough(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() < MAX_FILE_SIZE)
}

/// A file excerpt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExcerpt {
    pub path: String,
    pub content: String,
}

/// Keyword hits within one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepResult {
    pub path: String,
    pub hits: Vec<(usize, String)>,
}

fn collect_pattern_matches(root: &Path, patterns: &[String], out: &mut Vec<FileExcerpt>) {
    for raw in patterns {
        if out.len() >= MAX_FILES {
            return;
        }
        let Ok(pattern) = Pattern::new(raw) else {
            continue;
        };
        for path in project_files(root) {
            if out.len() >= MAX_FILES {
                return;
            }
            let rel = relative(root, &path);
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            let matched = pattern.matches_with(&name, GLOB_OPTIONS)
                || pattern.matches_with(&rel, GLOB_OPTIONS);
            let seen = out.iter().any(|f| f.path == rel);
            if matched && !seen && small_enough(&path) {
                let content = head_tail(&path);
                if !content.is_empty() {
                    out.push(FileExcerpt { path: rel, content });
                }
            }
        }
    }
}

fn collect_path_matches(root: &Path, paths: &[String], out: &mut Vec<FileExcerpt>) {
    for p in paths {
        if out.len() >= MAX_FILES {
            return;
        }
        let rel = p.trim_start_matches("./");
        if out.iter().any(|f| f.path == rel) {
            continue;
        }
        let full: PathBuf = root.join(rel.trim_start_matches('/'));
        if !is_inside(root, &full) || !small_enough(&full) {
            continue;
        }
        let content = head_tail(&full);
        if !content.is_empty() {
            out.push(FileExcerpt {
                path: p.clone(),
                content,
            });
        }
    }
}

/// Case-insensitive line hits, at most [`MAX_GREP_HITS`]. Oversized files yield nothing.
pub fn grep_file(path: &Path, needle: &str) -> Vec<(usize, String)> {
    if !small_enough(path) {
        return Vec::new();
    }
    let Ok(bytes) = fs::read(path) else {
        return Vec::new();
    };
    let needle = needle.to_lowercase();
    String::from_utf8_lossy(&bytes)
        .lines()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .take(MAX_GREP_HITS)
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

fn collect_keyword_matches(root: &Path, keywords: &[String]) -> Vec<GrepResult> {
    let files: Vec<PathBuf> = project_files(root)
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SEARCH_EXTENSIONS.contains(&e))
        })
        .filter(|path| small_enough(path))
        .take(MAX_SEARCH_FILES)
        .collect();

    let mut results = Vec::new();
    'keywords: for keyword in keywords {
        for file in &files {
            if results.len() >= MAX_FILES {
                break 'keywords;
            }
            let hits = grep_file(file, keyword);
            if !hits.is_empty() {
                results.push(GrepResult {
                    path: relative(root, file),
                    hits,
                });
            }
        }
    }
    results
}

fn preview(line: &str) -> String {
    let mut chars = line.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Render excerpts and keyword hits as markdown; empty when there is nothing.
pub fn format_context(files: &[FileExcerpt], grep: &[GrepResult]) -> String {
    let mut parts = Vec::new();
    if !files.is_empty() {
        parts.push("# JIT Context: Relevant Files\n".to_string());
        for file in files.iter().take(MAX_FILES) {
            parts.push(format!("## {}\n```\n{}\n```\n", file.path, file.content));
        }
    }
    if !grep.is_empty() {
        parts.push("# JIT Context: Keyword Matches\n".to_string());
        for result in grep.iter().take(MAX_FILES) {
            parts.push(format!("## {}", result.path));
            for (line_no, line) in &result.hits {
                parts.push(format!("  L{line_no}: {}", preview(line)));
            }
            parts.push(String::new());
        }
    }
    parts.join("\n")
}

/// Build context for `prompt` from files under `root`.
pub fn retrieve(prompt: &str, root: &Path) -> String {
    if prompt.len() < MIN_PROMPT_LEN {
        return String::new();
    }
    let candidates = extract_candidates(prompt);

    let mut files = Vec::new();
    collect_pattern_matches(root, &candidates.patterns, &mut files);
    collect_path_matches(root, &candidates.paths, &mut files);

    let grep = if files.is_empty() && !candidates.keywords.is_empty() {
        collect_keyword_matches(root, &candidates.keywords)
    } else {
        Vec::new()
    };

    format_context(&files, &grep)
}

/// Hook entry: attach retrieved context as an advisory message.
pub fn jit_context(prompt: &str, root: &Path) -> Decision {
    let context = retrieve(prompt, root);
    if context.is_empty() {
        return Decision::allow();
    }
    tracing::debug!(bytes = context.len(), "attaching JIT context");
    Decision::allow_with_message(context)
}
