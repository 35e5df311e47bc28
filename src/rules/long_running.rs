//! Dev servers, watchers and other commands that never exit.

use super::{
    Predicate::{Matches, MatchesUnless},
    Rule, RuleTable, Subject,
};
use crate::decision::Decision;
use once_cell::sync::Lazy;

pub static LONG_RUNNING_RULES: &[Rule] = &[
    Rule::new(
        "process.dev_server",
        Matches(r"\b(?:npm|yarn|pnpm)\s+run\s+(?:dev|start|serve|watch)\b"),
        "long-running dev server (use build/test instead)",
    ),
    Rule::new(
        "process.start",
        Matches(r"\b(?:npm|yarn|pnpm)\s+start\b"),
        "long-running process (start)",
    ),
    Rule::new(
        "process.dev_server",
        Matches(r"\b(?:yarn|pnpm)\s+(?:dev|serve|watch)\b"),
        "long-running dev server",
    ),
    Rule::new(
        "process.dev_server",
        Matches(r"\bnpx\s+(?:next|vite|nuxt|remix|astro)\s+dev\b"),
        "long-running dev server",
    ),
    Rule::new("process.nodemon", Matches(r"\bnodemon\b"), "nodemon is a long-running watcher"),
    Rule::new(
        "process.http_server",
        Matches(r"\bpython[23]?\s+-m\s+http\.server\b"),
        "python http.server is long-running",
    ),
    Rule::new(
        "process.python_server",
        Matches(r"\b(?:flask\s+run|uvicorn\s|gunicorn\s)"),
        "long-running Python server",
    ),
    Rule::new(
        "process.go_server",
        Matches(r"\bgo\s+run\b.*server"),
        "looks like a long-running Go server",
    ),
    Rule::new("process.air", Matches(r"^\s*air\s*$"), "air is a long-running Go hot-reloader"),
    Rule::new("process.cargo_watch", Matches(r"\bcargo\s+watch\b"), "cargo watch is long-running"),
    Rule::new(
        "process.file_watcher",
        Matches(r"\b(?:fswatch|inotifywait)\b"),
        "file watcher is long-running",
    ),
    Rule::new(
        "process.tail_follow",
        Matches(r"\btail\s+.*-[a-zA-Z]*f"),
        "tail -f is long-running (use tail -n instead)",
    ),
    Rule::new(
        "process.static_site",
        Matches(r"\b(?:hugo|jekyll|gatsby)\s+(?:server|serve)\b"),
        "long-running static site dev server",
    ),
    Rule::new(
        "process.compose_attached",
        MatchesUnless {
            pattern: r"\bdocker(?:\s+|-)+compose\s+up\b",
            unless: r"\s-d\b|\s--detach\b",
        },
        "docker compose up without -d (add -d for detached)",
    ),
];

static TABLE: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::compile_or_empty("long-running", LONG_RUNNING_RULES));

/// Deny commands that would block the agent indefinitely.
pub fn check_long_running(command: &str) -> Decision {
    match TABLE.first_match(&Subject::command(command)) {
        Some(rule) => Decision::deny(rule.id, format!("Blocked: {}", rule.reason)),
        None => Decision::allow(),
    }
}
