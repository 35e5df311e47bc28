//! Credentials embedded in written file contents.

use super::{Predicate::ContentsMatches, Rule, RuleTable, Subject, imports::is_test_file};
use crate::decision::Decision;
use once_cell::sync::Lazy;

pub static SECRET_RULES: &[Rule] = &[
    Rule::new("secret.aws_access_key", ContentsMatches(r"AKIA[0-9A-Z]{16}"), "AWS Access Key"),
    Rule::new(
        "secret.aws_secret_key",
        ContentsMatches(r#"(?i)aws_secret_access_key\s*[=:]\s*"[A-Za-z0-9/+=]{40}""#),
        "AWS Secret Key",
    ),
    Rule::new(
        "secret.github_pat",
        ContentsMatches(r"ghp_[A-Za-z0-9]{20,}"),
        "GitHub Personal Access Token",
    ),
    Rule::new(
        "secret.github_fine_grained",
        ContentsMatches(r"github_pat_[A-Za-z0-9_]{20,}"),
        "GitHub Fine-grained Token",
    ),
    Rule::new("secret.slack", ContentsMatches(r"xox[bpors]-[A-Za-z0-9\-]{10,}"), "Slack Token"),
    Rule::new(
        "secret.stripe",
        ContentsMatches(r"sk_(?:live|test)_[A-Za-z0-9]{20,}"),
        "Stripe Secret Key",
    ),
    Rule::new(
        "secret.sendgrid",
        ContentsMatches(r"SG\.[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}"),
        "SendGrid API Key",
    ),
    Rule::new(
        "secret.private_key",
        ContentsMatches(r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----"),
        "Private Key",
    ),
    Rule::new(
        "secret.jwt",
        ContentsMatches(r"eyJ[A-Za-z0-9_-]{10,}\.eyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_\-]{10,}"),
        "JWT Token",
    ),
    Rule::new(
        "secret.generic.api_key",
        ContentsMatches(r#"(?i)(?:api_key|apikey|api_secret)\s*[=:]\s*"[A-Za-z0-9\-_]{20,}""#),
        "API Key assignment",
    ),
    Rule::new(
        "secret.generic.password",
        ContentsMatches(r#"(?i)(?:password|passwd)\s*[=:]\s*"[^"$]{8,}""#),
        "Hardcoded password",
    ),
    Rule::new(
        "secret.generic.secret",
        ContentsMatches(r#"(?i)(?:secret)\s*[=:]\s*"[A-Za-z0-9\-_]{10,}""#),
        "Hardcoded secret",
    ),
];

static TABLE: Lazy<RuleTable> = Lazy::new(|| RuleTable::compile_or_empty("secrets", SECRET_RULES));

fn is_generic(id: &str) -> bool {
    id.starts_with("secret.generic.")
}

/// Deny written contents that carry tokens or keys.
///
/// Example, template and sample paths are skipped. Test files only skip the
/// generic assignment patterns.
pub fn check_secrets(path: &str, contents: &str) -> Decision {
    if contents.is_empty() {
        return Decision::allow();
    }
    let lower = path.to_lowercase();
    if ["example", "template", "sample"].iter().any(|w| lower.contains(w)) {
        return Decision::allow();
    }
    let is_test = is_test_file(path);

    let subject = Subject::path(path, contents);
    let hit = TABLE
        .matches(&subject)
        .find(|rule| !(is_test && is_generic(rule.id)));
    if let Some(rule) = hit {
        return Decision::deny(
            rule.id,
            format!("Blocked: potential {} detected in {path}", rule.reason),
        );
    }
    Decision::allow()
}
