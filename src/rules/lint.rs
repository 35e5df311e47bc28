//! Formatter suggestions for written files.

use std::path::Path;

const LINT_COMMANDS: &[(&str, &str)] = &[
    ("go", "gofmt -w"),
    ("py", "ruff check --fix"),
    ("js", "eslint --fix"),
    ("jsx", "eslint --fix"),
    ("ts", "eslint --fix"),
    ("tsx", "eslint --fix"),
    ("rs", "rustfmt"),
    ("sh", "shfmt -w"),
    ("bash", "shfmt -w"),
    ("tf", "terraform fmt"),
];

/// Command that formats `path`, if its extension is known.
pub fn lint_command_for(path: &str) -> Option<String> {
    let ext = Path::new(path).extension()?.to_str()?;
    LINT_COMMANDS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, tool)| format!("{tool} {path}"))
}
