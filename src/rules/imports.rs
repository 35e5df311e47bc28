//! Banned imports and calls per file extension.

use super::basename;
use crate::decision::Decision;
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in banned substrings, keyed by extension.
pub const DEFAULT_BANNED_IMPORTS: &[(&str, &[&str])] = &[
    (".go", &["os/exec", "reflect", "fmt.Println"]),
    (".py", &["os.system", "eval(", "exec("]),
    (".js", &["eval("]),
];

/// Test sources by naming convention (`_test.`, `.test.`, `.spec.`, `test_` prefix).
pub fn is_test_file(path: &str) -> bool {
    let name = basename(path).to_lowercase();
    name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.starts_with("test_")
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}

/// Deny contents that use a banned pattern for the file's extension.
pub fn check_imports(
    path: &str,
    contents: &str,
    allowed: &BTreeMap<String, Vec<String>>,
) -> Decision {
    if path.is_empty() || contents.is_empty() {
        return Decision::allow();
    }
    let Some(ext) = extension(path) else {
        return Decision::allow();
    };
    let Some((_, banned)) = DEFAULT_BANNED_IMPORTS.iter().find(|(e, _)| *e == ext) else {
        return Decision::allow();
    };
    if is_test_file(path) {
        return Decision::allow();
    }

    let exceptions = allowed.get(&ext).map(Vec::as_slice).unwrap_or_default();
    let hit = banned
        .iter()
        .filter(|pattern| !exceptions.iter().any(|a| a == *pattern))
        .find(|pattern| contents.contains(*pattern));

    match hit {
        Some(pattern) => Decision::deny(
            "imports.banned",
            format!("Blocked: banned pattern '{pattern}' found in {}", basename(path)),
        ),
        None => Decision::allow(),
    }
}
