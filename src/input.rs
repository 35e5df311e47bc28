//! Input parsing for agent hook invocations.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur when parsing hook input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One tool invocation (or lifecycle event) as piped to a hook on stdin.
///
/// Field accessors never fail: an absent or mistyped field reads as empty/false.
/// `tool_input` is consulted first, then the same-named top-level field, because
/// lifecycle events carry `session_id`, `cwd` and `prompt` at the top level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInvocation {
    /// The tool being invoked (e.g. "Shell", "Write"). Empty for lifecycle events.
    #[serde(default)]
    pub tool_name: String,

    /// The tool's input parameters as raw JSON.
    #[serde(default)]
    pub tool_input: Value,

    /// Any other top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolInvocation {
    /// Parse from JSON string.
    pub fn parse(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an invocation directly from a tool name and payload.
    pub fn new(tool_name: impl Into<String>, tool_input: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
            extra: Map::new(),
        }
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.tool_input
            .get(name)
            .or_else(|| self.extra.get(name))
    }

    fn str_field(&self, name: &str) -> &str {
        self.field(name).and_then(Value::as_str).unwrap_or("")
    }

    /// `command` (Shell tool).
    pub fn command(&self) -> &str {
        self.str_field("command")
    }

    /// `path`, falling back to `file_path` (Write/Edit/MultiEdit).
    pub fn path(&self) -> &str {
        match self.str_field("path") {
            "" => self.str_field("file_path"),
            p => p,
        }
    }

    /// `contents`, falling back to `content` (Write tool).
    pub fn contents(&self) -> &str {
        match self.str_field("contents") {
            "" => self.str_field("content"),
            c => c,
        }
    }

    /// `pattern` (Grep tool).
    pub fn pattern(&self) -> &str {
        self.str_field("pattern")
    }

    /// `prompt` (before-prompt event).
    pub fn prompt(&self) -> &str {
        self.str_field("prompt")
    }

    /// `session_id`.
    pub fn session_id(&self) -> &str {
        self.str_field("session_id")
    }

    /// `cwd`.
    pub fn cwd(&self) -> &str {
        self.str_field("cwd")
    }

    /// `transcript_path` (stop event).
    pub fn transcript_path(&self) -> &str {
        self.str_field("transcript_path")
    }

    /// `stop_hook_active` (stop event).
    pub fn stop_hook_active(&self) -> bool {
        self.field("stop_hook_active")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// True if the tool is one of `names`.
    pub fn is_tool(&self, names: &[&str]) -> bool {
        names.contains(&self.tool_name.as_str())
    }

    /// Short description for log lines.
    pub fn summary(&self) -> String {
        let subject = match (self.command(), self.path()) {
            ("", "") => "<none>",
            ("", p) => p,
            (c, _) => c,
        };
        let mut summary: String = subject.chars().take(120).collect();
        if summary.len() < subject.len() {
            summary.push_str("...");
        }
        summary
    }
}
