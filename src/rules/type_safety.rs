//! TypeScript `any` detection.

use super::basename;
use crate::decision::Decision;
use once_cell::sync::Lazy;
use regex::RegexSet;
use std::fmt::Write as _;

static ANY_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r":\s*any\b",
        r"\bas\s+any\b",
        r"=\s*any\b",
        r"<any>",
        r"<any,",
        r",\s*any>",
        r"Array<any>",
    ])
    .unwrap_or_else(|_| RegexSet::empty())
});

static TEST_UTILITIES: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([r"expect\.any\(", r"\.any\(\)"]).unwrap_or_else(|_| RegexSet::empty())
});

fn is_typescript(path: &str) -> bool {
    path.ends_with(".ts") || path.ends_with(".tsx")
}

/// Deny `.ts`/`.tsx` contents that use `any`, listing each offending line.
pub fn check_any_types(path: &str, contents: &str) -> Decision {
    if path.is_empty() || contents.is_empty() || !is_typescript(path) {
        return Decision::allow();
    }

    let violations: Vec<(usize, &str)> = contents
        .split('\n')
        .enumerate()
        .filter(|(_, line)| ANY_PATTERNS.is_match(line) && !TEST_UTILITIES.is_match(line))
        .map(|(i, line)| (i + 1, line.trim()))
        .collect();

    if violations.is_empty() {
        return Decision::allow();
    }

    let mut reason = format!(
        "TypeScript 'any' types detected: Found {} occurrence(s) in {}",
        violations.len(),
        basename(path)
    );
    reason.push_str("\n  Hints:");
    reason.push_str("\n    - Replace 'any' with 'unknown' for better type safety");
    reason.push_str("\n    - Use specific types when possible");
    reason.push_str("\n    - Consider using generics for flexible types");
    reason.push_str("\n  Violations:");
    for (line_no, line) in violations {
        let _ = write!(reason, "\n    Line {line_no}: {line}");
    }

    Decision::deny("typescript.any", reason)
}
