//! Decision types for hook responses.

use serde::Serialize;

/// The result of evaluating a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allow the tool to proceed.
    Allow(Advice),
    /// Block the tool with a reason.
    Deny(DenyInfo),
    /// Informational result for lifecycle hooks that carry no decision field.
    NoOp(Advice),
}

/// Advisory text attached to a non-blocking decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advice {
    /// Message surfaced to the agent.
    pub message: Option<String>,
    /// Command the agent may run to lint the written file.
    pub lint_command: Option<String>,
}

/// Information about why a tool was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenyInfo {
    /// The rule that triggered the block.
    pub rule: String,
    /// Human-readable reason for blocking.
    pub reason: String,
}

impl DenyInfo {
    pub fn new(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

impl Decision {
    /// Exit code for a denial.
    pub const DENY_EXIT: u8 = 2;

    /// Create an allow decision.
    pub fn allow() -> Self {
        Decision::Allow(Advice::default())
    }

    /// Create an allow decision carrying an advisory message.
    pub fn allow_with_message(message: impl Into<String>) -> Self {
        Decision::Allow(Advice {
            message: Some(message.into()),
            lint_command: None,
        })
    }

    /// Create an allow decision suggesting a lint command.
    pub fn allow_with_lint(command: impl Into<String>) -> Self {
        Decision::Allow(Advice {
            message: None,
            lint_command: Some(command.into()),
        })
    }

    /// Create a deny decision.
    pub fn deny(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Decision::Deny(DenyInfo::new(rule, reason))
    }

    /// Create a no-op decision.
    pub fn no_op() -> Self {
        Decision::NoOp(Advice::default())
    }

    /// Check if this is a deny decision.
    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }

    /// Get the deny info if denied.
    pub fn deny_info(&self) -> Option<&DenyInfo> {
        match self {
            Decision::Deny(info) => Some(info),
            _ => None,
        }
    }

    /// Deny reason, or empty for non-denials.
    pub fn reason(&self) -> &str {
        self.deny_info().map(|i| i.reason.as_str()).unwrap_or("")
    }

    /// Advisory data, if any.
    pub fn advice(&self) -> Option<&Advice> {
        match self {
            Decision::Allow(advice) | Decision::NoOp(advice) => Some(advice),
            Decision::Deny(_) => None,
        }
    }

    /// Advisory message, if any.
    pub fn message(&self) -> Option<&str> {
        self.advice().and_then(|a| a.message.as_deref())
    }

    /// Process exit code: deny maps to 2, everything else to 0.
    pub fn exit_code(&self) -> u8 {
        if self.is_denied() { Self::DENY_EXIT } else { 0 }
    }

    /// Convert an allow into a no-op, keeping its advice.
    pub fn into_no_op(self) -> Self {
        match self {
            Decision::Allow(advice) => Decision::NoOp(advice),
            other => other,
        }
    }
}
