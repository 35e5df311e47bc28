//! Shell tool analysis.

use super::{Context, SHELL, SUBPROCESS_TIMEOUT};
use crate::config::Config;
use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::rules::{
    self, BranchPolicy, check_branch, check_commit_message, check_destructive, check_long_running,
    check_network, check_no_sudo, check_typosquat,
};
use crate::subprocess::{CommandRunner, RunError};
use chrono::NaiveDateTime;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The command, if this is a non-empty Shell invocation.
fn shell_command(input: &ToolInvocation) -> Option<&str> {
    if !input.is_tool(&[SHELL]) {
        return None;
    }
    Some(input.command()).filter(|c| !c.is_empty())
}

pub(super) fn validate_shell(input: &ToolInvocation) -> Decision {
    shell_command(input).map_or_else(Decision::allow, check_destructive)
}

pub(super) fn no_sudo(input: &ToolInvocation) -> Decision {
    shell_command(input).map_or_else(Decision::allow, check_no_sudo)
}

pub(super) fn no_long_running(input: &ToolInvocation) -> Decision {
    shell_command(input).map_or_else(Decision::allow, check_long_running)
}

pub(super) fn commit_msg_lint(input: &ToolInvocation) -> Decision {
    shell_command(input).map_or_else(Decision::allow, check_commit_message)
}

pub(super) fn network_fence(input: &ToolInvocation, config: &Config) -> Decision {
    let custom = &config.allowlists.network_fence.allowed_domains;
    shell_command(input).map_or_else(Decision::allow, |cmd| check_network(cmd, custom))
}

pub(super) fn dependency_typosquat(input: &ToolInvocation, config: &Config) -> Decision {
    let allowed = &config.allowlists.dependency_typosquat.allowed_packages;
    shell_command(input).map_or_else(Decision::allow, |cmd| check_typosquat(cmd, allowed))
}

/// Current branch via `git rev-parse`; empty when it cannot be determined.
pub fn current_branch(runner: &dyn CommandRunner, cwd: &Path) -> String {
    match runner.run(
        "git",
        &["rev-parse", "--abbrev-ref", "HEAD"],
        Some(cwd),
        SUBPROCESS_TIMEOUT,
    ) {
        Ok(out) if out.success => out.stdout.trim().to_string(),
        Ok(_) => String::new(),
        Err(e) => {
            tracing::debug!(error = %e, "branch lookup failed");
            String::new()
        }
    }
}

pub(super) fn branch_guard(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let Some(cmd) = shell_command(input) else {
        return Decision::allow();
    };
    if !cmd.contains("git") {
        return Decision::allow();
    }
    let current = current_branch(ctx.runner, &ctx.cwd);
    let policy = BranchPolicy {
        protected: &ctx.config.protected_branches,
        current: &current,
    };
    check_branch(cmd, &policy)
}

/// Deny every Shell command, appending it to `<log_dir>/dry-run.log`.
pub fn dry_run_mode(input: &ToolInvocation, log_dir: Option<&Path>, at: NaiveDateTime) -> Decision {
    let Some(cmd) = shell_command(input) else {
        return Decision::allow();
    };

    if let Some(dir) = log_dir
        && let Err(e) = append_dry_run_log(dir, cmd, at)
    {
        tracing::warn!(dir = %dir.display(), error = %e, "failed to write dry-run log");
    }

    Decision::deny("dry_run", format!("DRY RUN: would execute: {cmd}"))
}

fn append_dry_run_log(dir: &Path, cmd: &str, at: NaiveDateTime) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("dry-run.log"))?;
    writeln!(file, "[{}] DRY RUN blocked: {cmd}", at.format("%Y-%m-%d %H:%M:%S"))
}

/// Whether a command plausibly runs a shell script.
pub fn is_shell_command(cmd: &str) -> bool {
    let cmd = cmd.trim();
    ["sh ", "bash ", "zsh ", "./", "/"]
        .iter()
        .any(|prefix| cmd.starts_with(prefix))
        || cmd.contains(".sh")
        || cmd.contains(".bash")
}

fn is_script_name(word: &str) -> bool {
    word.ends_with(".sh") || word.ends_with(".bash")
}

/// The script a command executes: `./x.sh`, or `<interpreter> x.sh`.
pub fn extract_script_path(cmd: &str, cwd: &Path) -> Option<PathBuf> {
    let mut words = cmd.split_whitespace();
    let first = words.next()?;

    if let Some(script) = first.strip_prefix("./")
        && is_script_name(first)
    {
        return Some(cwd.join(script));
    }

    let second = words.next().filter(|w| is_script_name(w))?;
    let second = Path::new(second);
    Some(if second.is_absolute() {
        second.to_path_buf()
    } else {
        cwd.join(second)
    })
}

fn is_vendored(path: &str) -> bool {
    path.contains("vendor/")
}

pub(super) fn shellcheck(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    if input.is_tool(&[SHELL]) {
        let cmd = input.command();
        if cmd.is_empty() || !is_shell_command(cmd) || cmd.contains("shellcheck") {
            return Decision::allow();
        }
        // Inline commands are not checked; only scripts on disk.
        return match extract_script_path(cmd, &ctx.cwd) {
            Some(script) => check_script(&script, ctx),
            None => Decision::allow(),
        };
    }

    if input.is_tool(&[super::WRITE]) {
        let path = input.path();
        if path.is_empty() || !is_script_name(path) || is_vendored(path) {
            return Decision::allow();
        }
        let script = Path::new(path);
        let script = if script.is_absolute() {
            script.to_path_buf()
        } else {
            ctx.cwd.join(script)
        };
        return check_script(&script, ctx);
    }

    Decision::allow()
}

/// Run shellcheck on an existing file.
fn check_script(script: &Path, ctx: &Context<'_>) -> Decision {
    if !script.is_file() {
        return Decision::allow();
    }
    let shown = script.to_string_lossy();

    let result = ctx.runner.run(
        "shellcheck",
        &[
            "--severity=warning",
            "--enable=all",
            "--exclude=SC1090,SC1091",
            shown.as_ref(),
        ],
        Some(&ctx.cwd),
        SUBPROCESS_TIMEOUT,
    );

    let out = match result {
        Ok(out) => out,
        Err(RunError::TimedOut { .. }) => {
            return Decision::deny(
                "shellcheck.timeout",
                format!(
                    "shellcheck timed out after {} seconds",
                    SUBPROCESS_TIMEOUT.as_secs()
                ),
            );
        }
        Err(e) => {
            tracing::debug!(error = %e, "shellcheck unavailable");
            return Decision::allow();
        }
    };

    if out.success {
        return Decision::allow();
    }

    let output = if out.stderr.is_empty() { &out.stdout } else { &out.stderr };
    let mut reason = format!(
        "shellcheck found issues in {}\n  Hints:\n    - Fix shellcheck warnings before continuing\n    - Run 'shellcheck {shown}' to see details\n    - Common issues: unquoted variables, missing shebang, unsafe operations",
        rules::basename(&shown)
    );
    if !output.is_empty() {
        reason.push_str("\n\n");
        reason.push_str(output);
    }
    Decision::deny("shellcheck.issues", reason)
}
