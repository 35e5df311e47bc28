//! Agent hook guards.
//!
//! Short-lived policy checks for an AI coding agent's tool calls. Each hook
//! reads one JSON invocation on stdin, prints one JSON decision on stdout,
//! and exits 0 to proceed or 2 to block. Anything the guards cannot read or
//! understand is allowed.

pub mod analysis;
pub mod codebase_map;
pub mod config;
pub mod decision;
pub mod input;
pub mod jit_context;
pub mod logging;
pub mod output;
pub mod path_guard;
pub mod rate_limit;
pub mod rules;
pub mod shell;
pub mod state;
pub mod subprocess;

pub use analysis::{Context, Guard, HookEvent, decide, decide_event};
pub use config::Config;
pub use decision::Decision;
pub use input::ToolInvocation;
pub use output::format_response;
