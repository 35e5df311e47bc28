//! Protected-branch checks for git commands.

use crate::decision::Decision;
use crate::shell::split_commands;
use once_cell::sync::Lazy;
use regex::Regex;

static CHECKOUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bgit\s+(?:checkout|switch)\s+(\S+)").unwrap());
static CHECKOUT_NEW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bgit\s+(?:checkout|switch)\s+-[bB]\s").unwrap());
static COMMIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bgit\s+commit\b").unwrap());
static MERGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bgit\s+merge\b").unwrap());
static REBASE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bgit\s+rebase\b").unwrap());
static READ_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bgit\s+(?:status|log|diff|show|branch|remote|fetch|stash\s+list|tag\s+-l)\b")
        .unwrap()
});

/// Protected branch names plus the branch currently checked out.
#[derive(Debug, Clone, Copy)]
pub struct BranchPolicy<'a> {
    pub protected: &'a [String],
    pub current: &'a str,
}

impl BranchPolicy<'_> {
    fn is_protected(&self, branch: &str) -> bool {
        !branch.is_empty() && self.protected.iter().any(|p| p == branch)
    }
}

/// Check a shell command against the branch policy.
pub fn check_branch(command: &str, policy: &BranchPolicy<'_>) -> Decision {
    if !command.contains("git") {
        return Decision::allow();
    }

    let mutating = COMMIT.is_match(command)
        || MERGE.is_match(command)
        || REBASE.is_match(command)
        || CHECKOUT.is_match(command);
    if READ_ONLY.is_match(command) && !mutating {
        return Decision::allow();
    }

    for segment in split_commands(command) {
        let segment = segment.command.as_str();
        if CHECKOUT_NEW.is_match(segment) {
            continue;
        }
        for caps in CHECKOUT.captures_iter(segment) {
            let target = &caps[1];
            if policy.is_protected(target) {
                return Decision::deny(
                    "git.checkout.protected",
                    format!("Blocked: cannot checkout protected branch '{target}'. Use a feature branch."),
                );
            }
        }
    }

    if policy.is_protected(policy.current) {
        let current = policy.current;
        if COMMIT.is_match(command) {
            return Decision::deny(
                "git.commit.protected",
                format!("Blocked: cannot commit on protected branch '{current}'. Create a feature branch."),
            );
        }
        if MERGE.is_match(command) {
            return Decision::deny(
                "git.merge.protected",
                format!("Blocked: cannot merge on protected branch '{current}'."),
            );
        }
        if REBASE.is_match(command) {
            return Decision::deny(
                "git.rebase.protected",
                format!("Blocked: cannot rebase on protected branch '{current}'."),
            );
        }
    }

    Decision::allow()
}
