//! Post-write checks that run project tooling on the written file.
//!
//! Linters and the TypeScript compiler are found through project config files
//! and run through the [`CommandRunner`](crate::subprocess::CommandRunner). A
//! missing tool allows; a tool that hangs past its timeout denies.

use super::{Context, WRITE};
use crate::decision::Decision;
use crate::input::ToolInvocation;
use crate::rules::{self, is_test_file, test_candidates};
use crate::subprocess::{RunError, RunOutput};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LINT_TIMEOUT: Duration = Duration::from_secs(30);
pub const TYPECHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// A linter, the config files that select it, and its arguments before the file.
struct Linter {
    program: &'static str,
    configs: &'static [&'static str],
    args: &'static [&'static str],
}

const LINTERS: &[Linter] = &[
    Linter {
        program: "biome",
        configs: &["biome.json", "biome.jsonc"],
        args: &["check"],
    },
    Linter {
        program: "eslint",
        configs: &[
            ".eslintrc.js",
            ".eslintrc.json",
            ".eslintrc.cjs",
            ".eslintrc.yaml",
            ".eslintrc.yml",
            "eslint.config.js",
            "eslint.config.mjs",
        ],
        args: &[],
    },
    Linter {
        program: "ruff",
        configs: &["ruff.toml", "pyproject.toml"],
        args: &["check", "--fix", "--exit-zero"],
    },
];

/// The written file resolved against the project, if it exists on disk.
fn written_file(input: &ToolInvocation, cwd: &Path) -> Option<PathBuf> {
    if !input.is_tool(&[WRITE]) {
        return None;
    }
    let path = Path::new(input.path());
    if path.as_os_str().is_empty() {
        return None;
    }
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    full.is_file().then_some(full)
}

fn timed_out(message: String) -> Decision {
    Decision::deny("tooling.timeout", message)
}

/// Run the first configured linter that is installed on the written file.
pub(super) fn lint_changed(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let Some(file) = written_file(input, &ctx.cwd) else {
        return Decision::allow();
    };
    let shown = file.to_string_lossy();

    for linter in LINTERS {
        if !linter.configs.iter().any(|c| ctx.cwd.join(c).exists()) {
            continue;
        }
        let mut args = linter.args.to_vec();
        args.push(shown.as_ref());

        let out = match ctx.runner.run(linter.program, &args, Some(&ctx.cwd), LINT_TIMEOUT) {
            Ok(out) => out,
            Err(RunError::NotFound(_)) => continue,
            Err(RunError::TimedOut { .. }) => {
                return timed_out(format!(
                    "{} timed out after {} seconds",
                    linter.program,
                    LINT_TIMEOUT.as_secs()
                ));
            }
            Err(e) => {
                tracing::debug!(error = %e, "linter failed to run");
                return Decision::allow();
            }
        };
        return lint_verdict(linter.program, input.path(), &out);
    }
    Decision::allow()
}

fn lint_verdict(linter: &str, path: &str, out: &RunOutput) -> Decision {
    if out.success {
        return Decision::allow();
    }
    let file = rules::basename(path);
    let mut reason = format!(
        "{linter} found issues in {file} (exit code {})\n  Hints:\n    \
         - Run '{linter} --fix {file}' to auto-fix issues\n    \
         - Review the linter output below for details",
        out.code.unwrap_or(-1)
    );
    if !out.stdout.is_empty() {
        reason.push_str("\n\n");
        reason.push_str(&out.stdout);
    }
    if !out.stderr.is_empty() {
        reason.push('\n');
        reason.push_str(&out.stderr);
    }
    Decision::deny("lint.issues", reason)
}

/// Type-check a written `.ts`/`.tsx` file when the project has a `tsconfig.json`.
pub(super) fn typecheck_changed(input: &ToolInvocation, ctx: &Context<'_>) -> Decision {
    let path = input.path();
    if !(path.ends_with(".ts") || path.ends_with(".tsx")) {
        return Decision::allow();
    }
    let Some(file) = written_file(input, &ctx.cwd) else {
        return Decision::allow();
    };
    if !ctx.cwd.join("tsconfig.json").is_file() {
        return Decision::allow();
    }

    let shown = file.to_string_lossy();
    let result = ctx.runner.run(
        "npx",
        &["tsc", "--noEmit", shown.as_ref()],
        Some(&ctx.cwd),
        TYPECHECK_TIMEOUT,
    );
    let out = match result {
        Ok(out) => out,
        Err(RunError::TimedOut { .. }) => {
            return timed_out(format!(
                "TypeScript type checking timed out after {} seconds",
                TYPECHECK_TIMEOUT.as_secs()
            ));
        }
        Err(e) => {
            tracing::debug!(error = %e, "tsc unavailable");
            return Decision::allow();
        }
    };
    if out.success {
        return Decision::allow();
    }

    let output = if out.stderr.is_empty() { &out.stdout } else { &out.stderr };
    let details = output
        .lines()
        .map(str::trim)
        .find(|line| line.contains("error TS") || line.contains(": error"))
        .unwrap_or("See output below");
    let mut reason = format!(
        "Type errors found in {}\n  Details: {details}\n  Hints:\n    \
         - Fix type errors before continuing\n    \
         - Run 'npm run type-check' to see all errors",
        rules::basename(path)
    );
    if !output.is_empty() {
        reason.push_str("\n\n");
        reason.push_str(output);
    }
    Decision::deny("typecheck.errors", reason)
}

/// Nudge toward a test file when a source file has none beside it.
pub(super) fn test_buddy(input: &ToolInvocation, cwd: &Path) -> Decision {
    if !input.is_tool(&[WRITE]) {
        return Decision::allow();
    }
    let path = input.path();
    if path.is_empty() || is_test_file(path) {
        return Decision::allow();
    }
    let Some(candidates) = test_candidates(path) else {
        return Decision::allow();
    };

    let source = Path::new(path);
    let dir = match source.parent() {
        Some(parent) if source.is_absolute() => parent.to_path_buf(),
        Some(parent) => cwd.join(parent),
        None => cwd.to_path_buf(),
    };
    if candidates.iter().any(|c| dir.join(c).exists()) {
        return Decision::allow();
    }

    Decision::allow_with_message(format!(
        "No test file found for {}. Consider creating {}",
        rules::basename(path),
        candidates[0]
    ))
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use crate::subprocess::fake::{ScriptedRunner, output};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &str) -> ToolInvocation {
        ToolInvocation::new(WRITE, json!({ "path": path, "contents": "" }))
    }

    fn project(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        dir
    }

    #[test]
    fn test_lint_reports_issues() {
        let dir = project(&["biome.json", "src/app.ts"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(|_| {
            Ok(RunOutput {
                success: false,
                code: Some(1),
                stdout: "app.ts:1 noVar".to_string(),
                stderr: "1 error".to_string(),
            })
        });
        let ctx = h.context(dir.path());

        let d = lint_changed(&write("src/app.ts"), &ctx);
        assert!(d.reason().starts_with("biome found issues in app.ts (exit code 1)\n  Hints:"));
        assert!(d.reason().contains("- Run 'biome --fix app.ts' to auto-fix issues"));
        assert!(d.reason().ends_with("\n\napp.ts:1 noVar\n1 error"));
        assert!(h.runner.calls()[0].starts_with("biome check "));
    }

    #[test]
    fn test_lint_falls_through_missing_tools() {
        let dir = project(&["biome.json", "pyproject.toml", "tool.py"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(|line| {
            if line.starts_with("ruff") {
                Ok(output(true, ""))
            } else {
                Err(RunError::NotFound("biome".to_string()))
            }
        });
        let ctx = h.context(dir.path());
        assert!(!lint_changed(&write("tool.py"), &ctx).is_denied());
        let calls = h.runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with("ruff check --fix --exit-zero "));
    }

    #[test]
    fn test_lint_timeout_denies() {
        let dir = project(&[".eslintrc.json", "index.js"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(|_| {
            Err(RunError::TimedOut {
                program: "eslint".to_string(),
                timeout: LINT_TIMEOUT,
            })
        });
        let ctx = h.context(dir.path());
        assert_eq!(
            lint_changed(&write("index.js"), &ctx).reason(),
            "eslint timed out after 30 seconds"
        );
    }

    #[test]
    fn test_lint_needs_config_and_file() {
        let dir = project(&["index.js"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::failing("boom");
        let ctx = h.context(dir.path());
        assert!(!lint_changed(&write("index.js"), &ctx).is_denied());
        assert!(!lint_changed(&write("gone.js"), &ctx).is_denied());
        assert_eq!(h.runner.call_count(), 0);
    }

    #[test]
    fn test_typecheck_reports_first_error() {
        let dir = project(&["tsconfig.json", "src/api.ts"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::failing(
            "src/api.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'.\n",
        );
        let ctx = h.context(dir.path());

        let d = typecheck_changed(&write("src/api.ts"), &ctx);
        assert!(d.reason().starts_with(
            "Type errors found in api.ts\n  Details: src/api.ts(3,7): error TS2322"
        ));
        assert!(d.reason().contains("- Run 'npm run type-check' to see all errors\n\n"));
        assert!(h.runner.calls()[0].starts_with("npx tsc --noEmit "));
    }

    #[test]
    fn test_typecheck_timeout_denies() {
        let dir = project(&["tsconfig.json", "view.tsx"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::new(|_| {
            Err(RunError::TimedOut {
                program: "npx".to_string(),
                timeout: TYPECHECK_TIMEOUT,
            })
        });
        let ctx = h.context(dir.path());
        assert_eq!(
            typecheck_changed(&write("view.tsx"), &ctx).reason(),
            "TypeScript type checking timed out after 60 seconds"
        );
    }

    #[test]
    fn test_typecheck_skips() {
        let dir = project(&["api.ts", "main.py"]);
        let mut h = Harness::new();
        h.runner = ScriptedRunner::failing("error TS1");
        let ctx = h.context(dir.path());
        assert!(!typecheck_changed(&write("api.ts"), &ctx).is_denied());
        assert!(!typecheck_changed(&write("main.py"), &ctx).is_denied());
        assert_eq!(h.runner.call_count(), 0);
    }

    #[test]
    fn test_buddy_nudges_without_test() {
        let dir = project(&["pkg/server.go"]);
        let d = test_buddy(&write("pkg/server.go"), dir.path());
        assert_eq!(
            d.message(),
            Some("No test file found for server.go. Consider creating server_test.go")
        );
    }

    #[test]
    fn test_buddy_quiet_when_covered() {
        let dir = project(&["pkg/server.go", "pkg/server_test.go", "app/models.py"]);
        assert_eq!(test_buddy(&write("pkg/server.go"), dir.path()).message(), None);
        assert_eq!(test_buddy(&write("pkg/server_test.go"), dir.path()).message(), None);
        assert_eq!(test_buddy(&write("notes.md"), dir.path()).message(), None);
        let d = test_buddy(&write("app/models.py"), dir.path());
        assert!(d.message().unwrap().ends_with("Consider creating test_models.py"));
    }
}
