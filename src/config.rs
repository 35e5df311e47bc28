//! Configuration assembled from environment variables and the allow-lists document.
//!
//! The top-level hooks configuration is rendered into environment variables by an
//! external generator; this module only reads the result.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read allow-lists file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse allow-lists JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse allow-lists TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

const DEFAULT_RATE_LIMIT: usize = 30;
const DEFAULT_MAX_FILE_LINES: usize = 500;
const DEFAULT_MAP_DEPTH: usize = 3;

/// Network fence allow-list section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkFenceAllow {
    pub allowed_domains: Vec<String>,
}

/// Typosquat allow-list section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TyposquatAllow {
    pub allowed_packages: Vec<String>,
}

/// Import guard allow-list section, keyed by file extension (".py").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportGuardAllow {
    pub allowed_patterns: BTreeMap<String, Vec<String>>,
}

/// Caller-supplied exceptions that suppress otherwise-matching rules.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Allowlists {
    pub network_fence: NetworkFenceAllow,
    pub dependency_typosquat: TyposquatAllow,
    pub import_guard: ImportGuardAllow,
}

impl Allowlists {
    /// Load from a JSON or TOML document (chosen by extension).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Ok(toml::from_str(content)?)
        } else {
            Ok(serde_json::from_str(content)?)
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// Guard names that short-circuit to allow.
    pub disabled: BTreeSet<String>,
    /// Rate limiter ceiling per trailing minute.
    pub rate_limit: usize,
    /// Directory holding the rate limiter state file.
    pub rate_dir: PathBuf,
    /// Directory holding per-session markers.
    pub session_dir: PathBuf,
    /// File-size guard ceiling.
    pub max_file_lines: usize,
    /// Codebase map recursion depth.
    pub map_max_depth: usize,
    /// Codebase map include globs; empty means the built-in set.
    pub map_include: Vec<String>,
    /// Branches the branch guard protects.
    pub protected_branches: Vec<String>,
    /// Branch guard is opt-in.
    pub branch_guard: bool,
    /// No-sudo guard is opt-in.
    pub no_sudo: bool,
    /// Dry-run mode blocks every shell command.
    pub dry_run: bool,
    /// Where dry-run mode records blocked commands.
    pub dry_run_dir: Option<PathBuf>,
    /// Extra directories the path guard always allows.
    pub path_allowed: Vec<PathBuf>,
    /// Home directory, if known.
    pub home: Option<PathBuf>,
    /// Loaded allow-lists.
    pub allowlists: Allowlists,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir();
        let base = home.clone().unwrap_or_else(|| PathBuf::from("."));
        Self {
            disabled: BTreeSet::new(),
            rate_limit: DEFAULT_RATE_LIMIT,
            rate_dir: base.join(".cursor/rate"),
            session_dir: base.join(".cursor/sessions"),
            max_file_lines: DEFAULT_MAX_FILE_LINES,
            map_max_depth: DEFAULT_MAP_DEPTH,
            map_include: Vec::new(),
            protected_branches: vec!["main".to_string(), "master".to_string()],
            branch_guard: false,
            no_sudo: false,
            dry_run: false,
            dry_run_dir: None,
            path_allowed: Vec::new(),
            home,
            allowlists: Allowlists::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env(cwd: &Path) -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), cwd)
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("HOOK_DISABLED") {
            config.disabled = split_list(&v, ',').into_iter().collect();
        }
        if let Some(n) = var("HOOK_RATE_LIMIT").and_then(|v| parse_number("HOOK_RATE_LIMIT", &v)) {
            config.rate_limit = n;
        }
        if let Some(dir) = var("HOOK_RATE_DIR") {
            config.rate_dir = PathBuf::from(dir);
        }
        if let Some(dir) = var("HOOK_SESSION_DIR") {
            config.session_dir = PathBuf::from(dir);
        }
        if let Some(n) =
            var("HOOK_MAX_FILE_LINES").and_then(|v| parse_number("HOOK_MAX_FILE_LINES", &v))
        {
            config.max_file_lines = n;
        }
        if let Some(n) = var("HOOK_CODEBASE_MAP_MAX_DEPTH")
            .and_then(|v| parse_number("HOOK_CODEBASE_MAP_MAX_DEPTH", &v))
            .filter(|n| *n > 0)
        {
            config.map_max_depth = n;
        }
        if let Some(v) = var("HOOK_CODEBASE_MAP_INCLUDE") {
            config.map_include = split_list(&v, ',');
        }
        if let Some(v) = var("HOOK_PROTECTED_BRANCHES") {
            config.protected_branches = split_list(&v, ',');
        }
        config.branch_guard = var("HOOK_BRANCH_GUARD").is_some_and(|v| is_truthy(&v));
        config.no_sudo = var("HOOK_NO_SUDO").is_some_and(|v| is_truthy(&v));
        config.dry_run = var("HOOKS_DRY_RUN").is_some_and(|v| v.trim() == "1");
        config.dry_run_dir = var("HOOK_DRY_RUN_DIR").map(PathBuf::from);
        if let Some(v) = var("HOOK_PATH_VALIDATION_ALLOWED") {
            config.path_allowed = split_list(&v, ':').into_iter().map(PathBuf::from).collect();
        }

        let allowlists_path = var("HOOK_ALLOWLISTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.join(".cursor/hooks-allowlists.json"));
        if allowlists_path.exists() {
            match Allowlists::load(&allowlists_path) {
                Ok(lists) => config.allowlists = lists,
                Err(e) => tracing::warn!(
                    path = %allowlists_path.display(),
                    error = %e,
                    "ignoring allow-lists file"
                ),
            }
        }

        config
    }

    /// Check whether a guard has been disabled by name.
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.contains(name)
    }
}

fn split_list(value: &str, sep: char) -> Vec<String> {
    value
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number(key: &str, value: &str) -> Option<usize> {
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value, "ignoring non-numeric setting");
            None
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes")
}
