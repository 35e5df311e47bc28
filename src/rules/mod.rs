//! Rule tables: ordered predicate → deny-reason descriptors.
//!
//! Every table is plain data. A [`Rule`] names a predicate kind plus its
//! parameters; [`RuleTable::compile`] turns a static slice of rules into
//! compiled regexes, and [`RuleTable::first_match`] walks them in order.

mod branch;
mod commit_msg;
mod destructive;
mod file_size;
mod imports;
mod lint;
mod long_running;
mod network;
mod no_sudo;
mod readonly;
mod secrets;
mod sensitive_write;
mod test_buddy;
mod type_safety;
mod typosquat;

pub use branch::{BranchPolicy, check_branch};
pub use commit_msg::check_commit_message;
pub use destructive::{DESTRUCTIVE_RULES, check_destructive};
pub use file_size::check_file_size;
pub use imports::{DEFAULT_BANNED_IMPORTS, check_imports, is_test_file};
pub use lint::lint_command_for;
pub use long_running::{LONG_RUNNING_RULES, check_long_running};
pub use network::{
    DEFAULT_ALLOWED_HOSTS, check_network, extract_hostname, is_host_allowed,
};
pub use no_sudo::check_no_sudo;
pub use readonly::{READONLY_RULES, check_readonly};
pub use secrets::{SECRET_RULES, check_secrets};
pub use sensitive_write::{SENSITIVE_WRITE_RULES, check_sensitive_write};
pub use test_buddy::test_candidates;
pub use type_safety::check_any_types;
pub use typosquat::check_typosquat;

use regex::Regex;
use std::path::Path;

/// What a rule tests, and against which part of the subject.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Regex over the subject text (command or normalized path).
    Matches(&'static str),
    /// Regex over the text, suppressed when the second regex also matches.
    MatchesUnless {
        pattern: &'static str,
        unless: &'static str,
    },
    /// Regex over the file name only.
    BasenameMatches(&'static str),
    /// Regex over the file name, suppressed by a second regex on the file name.
    BasenameMatchesUnless {
        pattern: &'static str,
        unless: &'static str,
    },
    /// File name equals a literal.
    BasenameEquals(&'static str),
    /// Regex over the contents.
    ContentsMatches(&'static str),
    /// Contents contain every listed substring.
    ContentsContainsAll(&'static [&'static str]),
}

/// A single table entry.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub predicate: Predicate,
    pub reason: &'static str,
}

impl Rule {
    pub const fn new(id: &'static str, predicate: Predicate, reason: &'static str) -> Self {
        Self {
            id,
            predicate,
            reason,
        }
    }
}

/// The text a table is evaluated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subject<'a> {
    pub text: &'a str,
    pub basename: &'a str,
    pub contents: &'a str,
}

impl<'a> Subject<'a> {
    /// A shell command.
    pub fn command(command: &'a str) -> Self {
        Self {
            text: command,
            ..Default::default()
        }
    }

    /// A write target, with optional contents.
    pub fn path(path: &'a str, contents: &'a str) -> Self {
        Self {
            text: path,
            basename: basename(path),
            contents,
        }
    }
}

/// Final path component, or the whole string if it has none.
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

#[derive(Debug)]
enum Compiled {
    Text(Regex, Option<Regex>),
    Basename(Regex, Option<Regex>),
    BasenameEquals(&'static str),
    Contents(Regex),
    ContentsContainsAll(&'static [&'static str]),
}

/// A rule with its patterns compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub id: &'static str,
    pub reason: &'static str,
    /// Source of the primary pattern, for messages that cite it.
    pub pattern: &'static str,
    check: Compiled,
}

impl CompiledRule {
    fn compile(rule: &Rule) -> Result<Self, regex::Error> {
        let (pattern, check) = match rule.predicate {
            Predicate::Matches(p) => (p, Compiled::Text(Regex::new(p)?, None)),
            Predicate::MatchesUnless { pattern, unless } => (
                pattern,
                Compiled::Text(Regex::new(pattern)?, Some(Regex::new(unless)?)),
            ),
            Predicate::BasenameMatches(p) => (p, Compiled::Basename(Regex::new(p)?, None)),
            Predicate::BasenameMatchesUnless { pattern, unless } => (
                pattern,
                Compiled::Basename(Regex::new(pattern)?, Some(Regex::new(unless)?)),
            ),
            Predicate::BasenameEquals(name) => (name, Compiled::BasenameEquals(name)),
            Predicate::ContentsMatches(p) => (p, Compiled::Contents(Regex::new(p)?)),
            Predicate::ContentsContainsAll(parts) => ("", Compiled::ContentsContainsAll(parts)),
        };
        Ok(Self {
            id: rule.id,
            reason: rule.reason,
            pattern,
            check,
        })
    }

    /// Evaluate this rule against a subject.
    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        fn hit(re: &Regex, unless: &Option<Regex>, s: &str) -> bool {
            re.is_match(s) && !unless.as_ref().is_some_and(|u| u.is_match(s))
        }
        match &self.check {
            Compiled::Text(re, unless) => hit(re, unless, subject.text),
            Compiled::Basename(re, unless) => hit(re, unless, subject.basename),
            Compiled::BasenameEquals(name) => subject.basename == *name,
            Compiled::Contents(re) => re.is_match(subject.contents),
            Compiled::ContentsContainsAll(parts) => {
                !subject.contents.is_empty() && parts.iter().all(|p| subject.contents.contains(p))
            }
        }
    }
}

/// An ordered, compiled rule list.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: Vec<CompiledRule>,
}

impl RuleTable {
    /// Compile every rule; any bad pattern fails the whole table.
    pub fn compile(rules: &[Rule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Compile, or fall back to an empty table (which allows everything).
    pub fn compile_or_empty(name: &str, rules: &[Rule]) -> Self {
        Self::compile(rules).unwrap_or_else(|e| {
            tracing::error!(table = name, error = %e, "rule table failed to compile");
            Self::default()
        })
    }

    /// First rule that matches, in table order.
    pub fn first_match(&self, subject: &Subject<'_>) -> Option<&CompiledRule> {
        self.matches(subject).next()
    }

    /// Every matching rule, in table order.
    pub fn matches<'t, 's>(
        &'t self,
        subject: &'s Subject<'s>,
    ) -> impl Iterator<Item = &'t CompiledRule> {
        self.rules.iter().filter(move |rule| rule.matches(subject))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[Rule] = &[
        Rule::new(
            "t.env",
            Predicate::BasenameMatchesUnless {
                pattern: r"^\.env",
                unless: r"\.example$",
            },
            "env",
        ),
        Rule::new("t.rc", Predicate::BasenameEquals(".npmrc"), "npmrc"),
        Rule::new(
            "t.sa",
            Predicate::ContentsContainsAll(&["\"type\"", "service_account"]),
            "sa",
        ),
        Rule::new("t.any", Predicate::Matches(r"danger"), "text"),
    ];

    #[test]
    fn test_first_match_wins() {
        let table = RuleTable::compile(TABLE).unwrap();
        let hit = table.first_match(&Subject::path("danger/.npmrc", "")).unwrap();
        assert_eq!(hit.id, "t.rc");
    }

    #[test]
    fn test_unless_suppresses() {
        let table = RuleTable::compile(TABLE).unwrap();
        assert!(table.first_match(&Subject::path(".env.example", "")).is_none());
        assert_eq!(table.first_match(&Subject::path("a/.env", "")).unwrap().id, "t.env");
    }

    #[test]
    fn test_contents_predicate() {
        let table = RuleTable::compile(TABLE).unwrap();
        let subject = Subject::path("key.json", r#"{"type": "service_account"}"#);
        assert_eq!(table.first_match(&subject).unwrap().id, "t.sa");
        assert!(table.first_match(&Subject::path("key.json", r#"{"type": 1}"#)).is_none());
    }

    #[test]
    fn test_bad_pattern_compiles_to_empty() {
        let bad = [Rule::new("bad", Predicate::Matches("("), "x")];
        assert!(RuleTable::compile(&bad).is_err());
        assert!(RuleTable::compile_or_empty("bad", &bad).is_empty());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
    }
}
