//! Writes to files that hold credentials.

use super::Predicate::{
    BasenameEquals, BasenameMatches, BasenameMatchesUnless, ContentsContainsAll, Matches,
    MatchesUnless,
};
use super::{Rule, RuleTable, Subject};
use crate::decision::Decision;
use once_cell::sync::Lazy;

pub static SENSITIVE_WRITE_RULES: &[Rule] = &[
    Rule::new(
        "write.env",
        BasenameMatchesUnless {
            pattern: r"^\.env($|\..+)",
            unless: r"(?i)\.(example|sample|template)$",
        },
        "write to env file (may contain secrets)",
    ),
    Rule::new(
        "write.ssh_key",
        MatchesUnless {
            pattern: r"(?:id_rsa|id_ed25519|id_ecdsa|id_dsa|authorized_keys)",
            unless: r"\.pub$",
        },
        "write to SSH key file",
    ),
    Rule::new(
        "write.cert",
        BasenameMatches(r"\.(pem|key|p12|pfx|keystore|jks)$"),
        "write to certificate/key file",
    ),
    Rule::new(
        "write.credentials",
        BasenameMatches(r"(?i)^credentials\.(json|yaml|yml|xml)$"),
        "write to credentials file",
    ),
    Rule::new(
        "write.secrets",
        BasenameMatches(r"(?i)^secrets\.(json|yaml|yml|xml)$"),
        "write to secrets file",
    ),
    Rule::new("write.npmrc", BasenameEquals(".npmrc"), "write to .npmrc (may contain auth tokens)"),
    Rule::new(
        "write.pypirc",
        BasenameEquals(".pypirc"),
        "write to .pypirc (may contain auth tokens)",
    ),
    Rule::new("write.kubeconfig", Matches(r"\.kube/config$"), "write to kubeconfig"),
    Rule::new(
        "write.service_account",
        ContentsContainsAll(&["\"type\"", "service_account"]),
        "file appears to contain a service account key",
    ),
    Rule::new("write.htpasswd", BasenameEquals(".htpasswd"), "write to .htpasswd"),
    Rule::new(
        "write.tfvars",
        BasenameMatches(r"\.tfvars$"),
        "write to .tfvars file (may contain secrets)",
    ),
];

static TABLE: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::compile_or_empty("sensitive-write", SENSITIVE_WRITE_RULES));

/// Deny writes to credential-bearing files.
pub fn check_sensitive_write(path: &str, contents: &str) -> Decision {
    let normalized = path.replace('\\', "/");
    match TABLE.first_match(&Subject::path(&normalized, contents)) {
        Some(rule) => Decision::deny(rule.id, format!("Blocked: {}", rule.reason)),
        None => Decision::allow(),
    }
}
