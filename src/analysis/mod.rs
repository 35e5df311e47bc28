//! Guard dispatch.
//!
//! [`decide`] maps a named guard and one invocation to a [`Decision`]. Every
//! dependency with side effects (state stores, subprocesses, the clock) comes in
//! through [`Context`], so the same call is deterministic under test.

mod events;
mod prompt;
mod session;
mod shell;
mod tooling;
mod write;

pub use events::{HookEvent, decide_event};
pub use prompt::{CONVENTION_FILES, prompt_enricher};
pub use shell::{current_branch, dry_run_mode, extract_script_path, is_shell_command};
pub use tooling::{LINT_TIMEOUT, TYPECHECK_TIMEOUT};
pub use write::path_validation;

use crate::config::Config;
use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::state::{RateStore, SessionStore};
use crate::subprocess::CommandRunner;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Tool name for shell commands.
pub const SHELL: &str = "Shell";
/// Tool name for whole-file writes.
pub const WRITE: &str = "Write";
/// Tools that modify an existing or new file.
pub const FILE_MUTATIONS: &[&str] = &["Write", "Edit", "MultiEdit"];

/// Bound on git and shellcheck runs.
pub const SUBPROCESS_TIMEOUT: Duration = Duration::from_secs(10);

/// A single policy check, addressable by its hook name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    DryRunMode,
    RateLimiter,
    ValidateShell,
    NoSudo,
    BranchGuard,
    NetworkFence,
    NoLongRunning,
    DependencyTyposquat,
    CommitMsgLint,
    ShellCheck,
    ValidateWrite,
    ReadonlyGuard,
    PathValidation,
    FileSizeGuard,
    SecretScanner,
    CheckAny,
    ImportGuard,
    LintOnWrite,
    LintChanged,
    TypecheckChanged,
    TestBuddy,
    CodebaseMap,
    JitContext,
    PromptEnricher,
    SessionGuard,
    SelfReview,
}

impl Guard {
    pub const ALL: &'static [Guard] = &[
        Guard::DryRunMode,
        Guard::RateLimiter,
        Guard::ValidateShell,
        Guard::NoSudo,
        Guard::BranchGuard,
        Guard::NetworkFence,
        Guard::NoLongRunning,
        Guard::DependencyTyposquat,
        Guard::CommitMsgLint,
        Guard::ShellCheck,
        Guard::ValidateWrite,
        Guard::ReadonlyGuard,
        Guard::PathValidation,
        Guard::FileSizeGuard,
        Guard::SecretScanner,
        Guard::CheckAny,
        Guard::ImportGuard,
        Guard::LintOnWrite,
        Guard::LintChanged,
        Guard::TypecheckChanged,
        Guard::TestBuddy,
        Guard::CodebaseMap,
        Guard::JitContext,
        Guard::PromptEnricher,
        Guard::SessionGuard,
        Guard::SelfReview,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Guard::DryRunMode => "dry-run-mode",
            Guard::RateLimiter => "rate-limiter",
            Guard::ValidateShell => "validate-shell",
            Guard::NoSudo => "no-sudo",
            Guard::BranchGuard => "branch-guard",
            Guard::NetworkFence => "network-fence",
            Guard::NoLongRunning => "no-long-running",
            Guard::DependencyTyposquat => "dependency-typosquat",
            Guard::CommitMsgLint => "commit-msg-lint",
            Guard::ShellCheck => "shellcheck",
            Guard::ValidateWrite => "validate-write",
            Guard::ReadonlyGuard => "readonly-guard",
            Guard::PathValidation => "path-validation",
            Guard::FileSizeGuard => "file-size-guard",
            Guard::SecretScanner => "secret-scanner",
            Guard::CheckAny => "check-any",
            Guard::ImportGuard => "import-guard",
            Guard::LintOnWrite => "lint-on-write",
            Guard::LintChanged => "lint-changed",
            Guard::TypecheckChanged => "typecheck-changed",
            Guard::TestBuddy => "test-buddy",
            Guard::CodebaseMap => "codebase-map",
            Guard::JitContext => "jit-context",
            Guard::PromptEnricher => "prompt-enricher",
            Guard::SessionGuard => "session-guard",
            Guard::SelfReview => "self-review",
        }
    }

    pub fn from_name(name: &str) -> Option<Guard> {
        Guard::ALL.iter().copied().find(|g| g.name() == name)
    }
}

/// Everything a guard may consult besides the invocation itself.
pub struct Context<'a> {
    pub config: &'a Config,
    /// Project directory: the invocation's `cwd`, or the process directory.
    pub cwd: PathBuf,
    pub rate_store: &'a dyn RateStore,
    pub session_store: &'a dyn SessionStore,
    pub runner: &'a dyn CommandRunner,
    pub now: DateTime<Utc>,
}

/// Run one guard.
///
/// A disabled guard, or an opt-in guard that is not enabled, allows without
/// looking at the payload.
pub fn decide(guard: Guard, input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let config = ctx.config;
    if config.is_disabled(guard.name()) {
        tracing::debug!(guard = guard.name(), "guard disabled");
        return Decision::allow();
    }

    let decision = match guard {
        Guard::DryRunMode if config.dry_run => shell::dry_run_mode(
            input,
            config.dry_run_dir.as_deref(),
            ctx.now.with_timezone(&chrono::Local).naive_local(),
        ),
        Guard::DryRunMode => Decision::allow(),
        Guard::RateLimiter => {
            crate::rate_limit::check_rate(ctx.rate_store, config.rate_limit, ctx.now)
        }
        Guard::ValidateShell => shell::validate_shell(input),
        Guard::NoSudo if config.no_sudo => shell::no_sudo(input),
        Guard::NoSudo => Decision::allow(),
        Guard::BranchGuard if config.branch_guard => shell::branch_guard(input, ctx),
        Guard::BranchGuard => Decision::allow(),
        Guard::NetworkFence => shell::network_fence(input, config),
        Guard::NoLongRunning => shell::no_long_running(input),
        Guard::DependencyTyposquat => shell::dependency_typosquat(input, config),
        Guard::CommitMsgLint => shell::commit_msg_lint(input),
        Guard::ShellCheck => shell::shellcheck(input, ctx),
        Guard::ValidateWrite => write::validate_write(input),
        Guard::ReadonlyGuard => write::readonly_guard(input),
        Guard::PathValidation => write::path_validation(input, &ctx.cwd, config),
        Guard::FileSizeGuard => write::file_size_guard(input, config.max_file_lines),
        Guard::SecretScanner => write::secret_scanner(input),
        Guard::CheckAny => write::check_any(input),
        Guard::ImportGuard => write::import_guard(input, config),
        Guard::LintOnWrite => write::lint_on_write(input),
        Guard::LintChanged => tooling::lint_changed(input, ctx),
        Guard::TypecheckChanged => tooling::typecheck_changed(input, ctx),
        Guard::TestBuddy => tooling::test_buddy(input, &ctx.cwd),
        Guard::CodebaseMap => prompt::codebase_map(input, ctx),
        Guard::JitContext => prompt::jit_context(input, ctx),
        Guard::PromptEnricher => prompt::prompt_enricher(&ctx.cwd),
        Guard::SessionGuard => session::session_guard(ctx),
        Guard::SelfReview => session::self_review(input),
    };

    if let Some(info) = decision.deny_info() {
        tracing::info!(
            guard = guard.name(),
            rule = %info.rule,
            subject = %input.summary(),
            "denied"
        );
    }
    decision
}
