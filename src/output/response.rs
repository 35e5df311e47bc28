//! Response formatting for hook output.

use crate::decision::Decision;
use serde::Serialize;

/// JSON written to stdout by every hook.
///
/// `decision` is present for gating hooks and absent for lifecycle ones.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct HookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint_command: Option<String>,
}

impl HookResponse {
    /// The fixed response used whenever input cannot be read or parsed.
    pub fn fail_open() -> Self {
        Self {
            decision: Some("allow"),
            ..Default::default()
        }
    }

    /// Build the response for a decision.
    pub fn from_decision(decision: &Decision) -> Self {
        match decision {
            Decision::Allow(advice) => Self {
                decision: Some("allow"),
                reason: None,
                message: advice.message.clone(),
                lint_command: advice.lint_command.clone(),
            },
            Decision::Deny(info) => Self {
                decision: Some("deny"),
                reason: Some(info.reason.clone()),
                ..Default::default()
            },
            Decision::NoOp(advice) => Self {
                decision: None,
                reason: None,
                message: advice.message.clone(),
                lint_command: advice.lint_command.clone(),
            },
        }
    }

    /// Serialize to a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"decision":"allow"}"#.to_string())
    }
}

/// Format a decision as the JSON line printed on stdout.
pub fn format_response(decision: &Decision) -> String {
    HookResponse::from_decision(decision).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_allow() {
        assert_eq!(format_response(&Decision::allow()), r#"{"decision":"allow"}"#);
    }

    #[test]
    fn test_format_deny() {
        let json = format_response(&Decision::deny("test.rule", "Blocked: test reason"));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["decision"], "deny");
        assert_eq!(parsed["reason"], "Blocked: test reason");
        assert!(parsed.get("message").is_none());
    }

    #[test]
    fn test_format_no_op() {
        assert_eq!(format_response(&Decision::no_op()), "{}");
    }

    #[test]
    fn test_format_lint_command() {
        let json = format_response(&Decision::allow_with_lint("gofmt -w main.go"));
        assert!(json.contains(r#""lint_command":"gofmt -w main.go""#));
        assert!(json.contains(r#""decision":"allow""#));
    }

    #[test]
    fn test_fail_open_shape() {
        assert_eq!(HookResponse::fail_open().to_json(), r#"{"decision":"allow"}"#);
    }
}
