//! Conventional-commit message lint.

use crate::decision::Decision;
use once_cell::sync::Lazy;
use regex::Regex;

static DOUBLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bgit\s+commit\s+.*-m\s+"([^"]*)""#).unwrap());
static SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bgit\s+commit\s+.*-m\s+'([^']*)'").unwrap());
static CONVENTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(feat|fix|chore|docs|refactor|test|ci|perf|style|build|revert)(\(.+\))?!?:\s+.+")
        .unwrap()
});

fn extract_message(command: &str) -> Option<&str> {
    DOUBLE_QUOTED
        .captures(command)
        .or_else(|| SINGLE_QUOTED.captures(command))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Check an inline `git commit -m` message. Commits without `-m` pass.
pub fn check_commit_message(command: &str) -> Decision {
    let Some(message) = extract_message(command) else {
        return Decision::allow();
    };

    if message.is_empty() {
        return Decision::deny("git.commit.empty", "Blocked: empty commit message");
    }

    if !CONVENTIONAL.is_match(message) {
        return Decision::deny(
            "git.commit.format",
            "Blocked: commit message doesn't follow conventional commits format. \
             Expected: type(scope): description (e.g., 'feat: add auth', 'fix(api): handle timeout')",
        );
    }

    Decision::allow()
}
