//! Session lifecycle checks: workspace state at start, self-review at stop.

use super::{Context, SUBPROCESS_TIMEOUT};
use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::subprocess::CommandRunner;
use std::fs;
use std::path::Path;

const SELF_REVIEW_MARKERS: &[&str] = &[
    "self-review",
    "critical review",
    "implementation complete",
    "testing complete",
    "edge cases considered",
];

const REVIEW_QUESTIONS: &[&str] = &[
    "Have all requested features been fully implemented?",
    "Are error cases and edge conditions properly handled?",
    "Have you tested the implementation with various inputs?",
    "Is the code documented and readable?",
    "Are there any performance or security concerns?",
];

const TYPED_REVIEW_QUESTIONS: &[&str] = &[
    "Are type hints/types properly defined?",
    "Is there adequate test coverage?",
];

/// Stdout of a successful git command, or `None`.
fn git(runner: &dyn CommandRunner, cwd: &Path, args: &[&str]) -> Option<String> {
    match runner.run("git", args, Some(cwd), SUBPROCESS_TIMEOUT) {
        Ok(out) if out.success => Some(out.stdout),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "git unavailable");
            None
        }
    }
}

fn count_lines(runner: &dyn CommandRunner, cwd: &Path, args: &[&str]) -> usize {
    git(runner, cwd, args).map_or(0, |out| out.lines().filter(|l| !l.trim().is_empty()).count())
}

/// Summarize uncommitted work and detached HEAD at session start. Never blocks.
pub(super) fn session_guard(ctx: &Context<'_>) -> Decision {
    let (runner, cwd) = (ctx.runner, ctx.cwd.as_path());

    let inside = git(runner, cwd, &["rev-parse", "--is-inside-work-tree"])
        .is_some_and(|out| out.trim() == "true");
    if !inside {
        return Decision::allow_with_message("Not a git repository");
    }

    let mut warnings = Vec::new();
    let staged = count_lines(runner, cwd, &["diff", "--cached", "--name-only"]);
    if staged > 0 {
        warnings.push(format!("warning: {staged} staged but uncommitted file(s)"));
    }
    let modified = count_lines(runner, cwd, &["diff", "--name-only"]);
    if modified > 0 {
        warnings.push(format!("warning: {modified} modified unstaged file(s)"));
    }
    let untracked = count_lines(runner, cwd, &["ls-files", "--others", "--exclude-standard"]);
    if untracked > 0 {
        warnings.push(format!("warning: {untracked} untracked file(s)"));
    }
    if let Ok(out) = runner.run("git", &["symbolic-ref", "HEAD"], Some(cwd), SUBPROCESS_TIMEOUT)
        && !out.success
    {
        warnings.push("warning: detached HEAD state".to_string());
    }

    if warnings.is_empty() {
        Decision::allow_with_message("workspace clean")
    } else {
        Decision::allow_with_message(warnings.join("; "))
    }
}

/// At stop, suggest review questions when the transcript shows no self-review.
pub(super) fn self_review(input: &ToolInvocation) -> Decision {
    if input.stop_hook_active() {
        return Decision::allow();
    }
    let transcript = input.transcript_path();
    if transcript.is_empty() {
        return Decision::allow();
    }
    let Ok(bytes) = fs::read(transcript) else {
        return Decision::allow();
    };

    let text = String::from_utf8_lossy(&bytes).to_lowercase();
    if SELF_REVIEW_MARKERS.iter().any(|m| text.contains(m)) {
        return Decision::allow();
    }

    let typed = matches!(
        Path::new(input.path()).extension().and_then(|e| e.to_str()),
        Some("py" | "ts" | "js")
    );
    let extra = if typed { TYPED_REVIEW_QUESTIONS } else { &[] };

    let mut message = String::from("No self-review detected in session. Consider reviewing:\n");
    for question in REVIEW_QUESTIONS.iter().chain(extra) {
        message.push_str("  - ");
        message.push_str(question);
        message.push('\n');
    }
    Decision::allow_with_message(message)
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::subprocess::RunError;
    use crate::subprocess::fake::{ScriptedRunner, output};
    use serde_json::json;
    use tempfile::TempDir;

    fn git_repo(line: &str) -> Result<crate::subprocess::RunOutput, RunError> {
        match line {
            "git rev-parse --is-inside-work-tree" => Ok(output(true, "true\n")),
            "git diff --cached --name-only" => Ok(output(true, "a.rs\nb.rs\n")),
            "git diff --name-only" => Ok(output(true, "")),
            "git ls-files --others --exclude-standard" => Ok(output(true, "notes.txt\n")),
            "git symbolic-ref HEAD" => Ok(output(false, "")),
            _ => Err(RunError::NotFound("git".to_string())),
        }
    }

    #[test]
    fn test_session_guard_warnings() {
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(git_repo);
        let ctx = h.context(Path::new("/home/dev/proj"));
        let d = session_guard(&ctx);
        assert!(!d.is_denied());
        assert_eq!(
            d.message(),
            Some(
                "warning: 2 staged but uncommitted file(s); warning: 1 untracked file(s); \
                 warning: detached HEAD state"
            )
        );
    }

    #[test]
    fn test_session_guard_clean_and_outside_repo() {
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(|line| match line {
            "git rev-parse --is-inside-work-tree" => Ok(output(true, "true\n")),
            _ => Ok(output(true, "")),
        });
        let ctx = h.context(Path::new("/home/dev/proj"));
        assert_eq!(session_guard(&ctx).message(), Some("workspace clean"));

        let h = Harness::new();
        let ctx = h.context(Path::new("/home/dev/proj"));
        assert_eq!(session_guard(&ctx).message(), Some("Not a git repository"));
    }

    fn stop(transcript: &Path, file: &str) -> ToolInvocation {
        ToolInvocation::new(
            "",
            json!({ "transcript_path": transcript, "file_path": file }),
        )
    }

    #[test]
    fn test_self_review_marker_found() {
        let dir = TempDir::new().unwrap();
        let transcript = dir.path().join("t.jsonl");
        fs::write(&transcript, "...Implementation complete, edge cases considered.").unwrap();
        assert_eq!(self_review(&stop(&transcript, "")).message(), None);
    }

    #[test]
    fn test_self_review_questions() {
        let dir = TempDir::new().unwrap();
        let transcript = dir.path().join("t.jsonl");
        fs::write(&transcript, "wrote some code").unwrap();

        let plain = self_review(&stop(&transcript, "main.go"));
        let message = plain.message().unwrap();
        assert!(message.starts_with("No self-review detected in session. Consider reviewing:\n"));
        assert_eq!(message.matches("\n  - ").count(), 5);

        let typed = self_review(&stop(&transcript, "app.ts"));
        assert!(typed.message().unwrap().ends_with("  - Is there adequate test coverage?\n"));
    }

    #[test]
    fn test_self_review_skips() {
        let missing = stop(Path::new("/nonexistent/t.jsonl"), "");
        assert_eq!(self_review(&missing).message(), None);
        let active = ToolInvocation::new("", json!({ "stop_hook_active": true }));
        assert_eq!(self_review(&active).message(), None);
    }
}
