//! Lifecycle event presets.

use super::{Context, Guard, decide};
use crate::decision::{Advice, Decision};
use crate::input::ToolInvocation;

/// A named point in the agent lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    SessionStart,
    BeforePrompt,
    PreToolUse,
    PostToolUse,
    Stop,
    PreCompact,
    SessionEnd,
}

impl HookEvent {
    pub const ALL: &'static [HookEvent] = &[
        HookEvent::SessionStart,
        HookEvent::BeforePrompt,
        HookEvent::PreToolUse,
        HookEvent::PostToolUse,
        HookEvent::Stop,
        HookEvent::PreCompact,
        HookEvent::SessionEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HookEvent::SessionStart => "session-start",
            HookEvent::BeforePrompt => "before-prompt",
            HookEvent::PreToolUse => "pre-tool-use",
            HookEvent::PostToolUse => "post-tool-use",
            HookEvent::Stop => "stop",
            HookEvent::PreCompact => "pre-compact",
            HookEvent::SessionEnd => "session-end",
        }
    }

    pub fn from_name(name: &str) -> Option<HookEvent> {
        HookEvent::ALL.iter().copied().find(|e| e.name() == name)
    }

    /// Guards run for this event, in order.
    pub fn guards(self) -> &'static [Guard] {
        match self {
            HookEvent::SessionStart => {
                &[Guard::SessionGuard, Guard::CodebaseMap, Guard::PromptEnricher]
            }
            HookEvent::BeforePrompt => {
                &[Guard::CodebaseMap, Guard::JitContext, Guard::PromptEnricher]
            }
            HookEvent::PreToolUse => &[
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
            ],
            HookEvent::PostToolUse => &[
                Guard::SecretScanner,
                Guard::CheckAny,
                Guard::ImportGuard,
                Guard::LintOnWrite,
                Guard::LintChanged,
                Guard::TypecheckChanged,
                Guard::TestBuddy,
            ],
            HookEvent::Stop => &[Guard::SelfReview],
            HookEvent::PreCompact | HookEvent::SessionEnd => &[],
        }
    }

    /// Lifecycle events carry no decision field.
    pub fn is_gating(self) -> bool {
        matches!(
            self,
            HookEvent::BeforePrompt | HookEvent::PreToolUse | HookEvent::PostToolUse
        )
    }
}

/// Run every guard of an event. The first denial wins; advice from the rest is merged.
pub fn decide_event(event: HookEvent, input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let mut messages = Vec::new();
    let mut lint_command = None;

    for guard in event.guards() {
        let decision = decide(*guard, input, ctx);
        let advice = match decision {
            Decision::Deny(_) => return decision,
            Decision::Allow(advice) | Decision::NoOp(advice) => advice,
        };
        if let Some(message) = advice.message.filter(|m| !m.is_empty()) {
            messages.push(message);
        }
        if lint_command.is_none() {
            lint_command = advice.lint_command;
        }
    }

    let merged = Decision::Allow(Advice {
        message: (!messages.is_empty()).then(|| messages.join("\n\n")),
        lint_command,
    });
    if event.is_gating() { merged } else { merged.into_no_op() }
}
