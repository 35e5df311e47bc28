//! Prompt and session context.

use super::Context;
use crate::codebase_map::{self, MapOptions};
use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::jit_context::{self, MAX_FILE_SIZE};
use std::fs;
use std::path::Path;

/// Conventions documents, in priority order, relative to the project.
pub const CONVENTION_FILES: &[&str] = &[
    ".cursor/conventions.md",
    ".claude/conventions.md",
    "CONVENTIONS.md",
];

/// Attach the first non-empty conventions document.
pub fn prompt_enricher(cwd: &Path) -> Decision {
    for candidate in CONVENTION_FILES {
        let path = cwd.join(candidate);
        let small = fs::metadata(&path).is_ok_and(|m| m.is_file() && m.len() < MAX_FILE_SIZE);
        if !small {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let content = content.trim();
        if !content.is_empty() {
            return Decision::allow_with_message(format!("[Project Conventions]\n{content}"));
        }
    }
    Decision::allow()
}

pub(super) fn codebase_map(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let options = MapOptions {
        max_depth: ctx.config.map_max_depth,
        include: &ctx.config.map_include,
    };
    codebase_map::codebase_map(input, &ctx.cwd, options, ctx.session_store)
}

pub(super) fn jit_context(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    jit_context::jit_context(input.prompt(), &ctx.cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_non_empty_wins() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".cursor")).unwrap();
        fs::write(dir.path().join(".cursor/conventions.md"), "  \n").unwrap();
        fs::write(dir.path().join("CONVENTIONS.md"), "Use tabs.\n").unwrap();
        let d = prompt_enricher(dir.path());
        assert_eq!(d.message(), Some("[Project Conventions]\nUse tabs."));
    }

    #[test]
    fn test_no_conventions() {
        let dir = TempDir::new().unwrap();
        assert_eq!(prompt_enricher(dir.path()).message(), None);
    }
}
