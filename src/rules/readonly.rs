//! Lock files, build output and vendored dependencies.

use super::{Predicate::Matches, Rule, RuleTable, Subject};
use crate::decision::Decision;
use once_cell::sync::Lazy;

pub static READONLY_RULES: &[Rule] = &[
    Rule::new("readonly.lock", Matches(r"package-lock\.json$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"yarn\.lock$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"pnpm-lock\.yaml$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"poetry\.lock$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"Cargo\.lock$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"uv\.lock$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"Gemfile\.lock$"), "lock file"),
    Rule::new("readonly.lock", Matches(r"composer\.lock$"), "lock file"),
    Rule::new("readonly.generated", Matches(r"\.min\.js$"), "minified file"),
    Rule::new("readonly.generated", Matches(r"\.min\.css$"), "minified file"),
    Rule::new("readonly.generated", Matches(r"\.map$"), "source map"),
    Rule::new("readonly.generated", Matches(r"\.d\.ts$"), "type declarations"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])node_modules(/|\\|$)"), "vendored directory"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])vendor(/|\\|$)"), "vendored directory"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])__pycache__(/|\\|$)"), "generated directory"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])\.git(/|\\|$)"), "git internals"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])dist(/|\\|$)"), "build output"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])build(/|\\|$)"), "build output"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])\.next(/|\\|$)"), "build output"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])\.nuxt(/|\\|$)"), "build output"),
    Rule::new("readonly.dir", Matches(r"(^|[/\\])\.idea(/|\\|$)"), "IDE state"),
    Rule::new("readonly.ide", Matches(r"(^|[/\\])\.vscode[/\\]settings\.json$"), "IDE settings"),
];

static OVERRIDES: &[Rule] = &[
    Rule::new("readonly.override", Matches(r"\.vscode/launch\.json$"), "debug config"),
    Rule::new("readonly.override", Matches(r"\.vscode/tasks\.json$"), "task config"),
];

static TABLE: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::compile_or_empty("readonly", READONLY_RULES));
static OVERRIDE_TABLE: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::compile_or_empty("readonly-overrides", OVERRIDES));

/// Deny edits to files managed by tools rather than people.
pub fn check_readonly(path: &str) -> Decision {
    let normalized = path.replace('\\', "/");
    let subject = Subject::path(&normalized, "");

    if OVERRIDE_TABLE.first_match(&subject).is_some() {
        return Decision::allow();
    }

    match TABLE.first_match(&subject) {
        Some(rule) => Decision::deny(
            rule.id,
            format!(
                "Readonly file protection triggered\n  File: {path}\n  Pattern: {}\n\n\
                 Hint: This file is auto-generated or managed by tools.\n  \
                 - Lock files: Use package manager commands instead\n  \
                 - Generated files: Modify source files instead\n  \
                 - Vendor dirs: Don't modify dependencies directly",
                rule.pattern
            ),
        ),
        None => Decision::allow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocked(path: &str) -> bool {
        check_readonly(path).is_denied()
    }

    #[test]
    fn test_tables_compile() {
        assert_eq!(TABLE.len(), READONLY_RULES.len());
        assert_eq!(OVERRIDE_TABLE.len(), OVERRIDES.len());
    }

    #[test]
    fn test_lock_files() {
        let d = check_readonly("package-lock.json");
        assert!(d.is_denied());
        assert!(d.reason().contains("Lock files"));
        assert!(d.reason().contains("File: package-lock.json"));
        assert!(blocked("web/yarn.lock"));
        assert!(blocked("Cargo.lock"));
    }

    #[test]
    fn test_generated_files() {
        assert!(blocked("public/app.min.js"));
        assert!(blocked("dist/app.js.map"));
        assert!(blocked("types/index.d.ts"));
        assert!(!blocked("src/index.ts"));
    }

    #[test]
    fn test_vendored_directories() {
        assert!(blocked("node_modules/react/index.js"));
        assert!(blocked("/repo/vendor/lib.go"));
        assert!(blocked(".git/config"));
        assert!(blocked("build\\output.txt"));
        assert!(!blocked("src/builder.rs"));
        assert!(!blocked("vendors.md"));
    }

    #[test]
    fn test_vscode_settings_and_overrides() {
        assert!(blocked(".vscode/settings.json"));
        assert!(!blocked(".vscode/launch.json"));
        assert!(!blocked(".vscode/tasks.json"));
    }

    #[test]
    fn test_idempotent() {
        assert_eq!(check_readonly("pnpm-lock.yaml"), check_readonly("pnpm-lock.yaml"));
        assert_eq!(check_readonly("src/lib.rs"), check_readonly("src/lib.rs"));
    }
}
