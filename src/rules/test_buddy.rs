//! Expected test-file names for source files.

use super::basename;
use std::path::Path;

/// Candidate test-file names next to a source file, most conventional first.
///
/// `None` for extensions without a test convention.
pub fn test_candidates(path: &str) -> Option<Vec<String>> {
    let base = basename(path);
    let ext = Path::new(base).extension()?.to_str()?;
    let stem = base.strip_suffix(ext)?.strip_suffix('.')?;
    let names = match ext {
        "go" => vec![format!("{stem}_test.go")],
        "py" => vec![format!("test_{stem}.py"), format!("{stem}_test.py")],
        "js" | "ts" | "jsx" | "tsx" => {
            vec![format!("{stem}.test.{ext}"), format!("{stem}.spec.{ext}")]
        }
        "rs" => vec![format!("{stem}_test.rs")],
        _ => return None,
    };
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_per_language() {
        assert_eq!(test_candidates("cmd/server.go"), Some(vec!["server_test.go".to_string()]));
        assert_eq!(
            test_candidates("app/models.py"),
            Some(vec!["test_models.py".to_string(), "models_test.py".to_string()])
        );
        assert_eq!(
            test_candidates("src/Button.tsx"),
            Some(vec!["Button.test.tsx".to_string(), "Button.spec.tsx".to_string()])
        );
    }

    #[test]
    fn test_untestable_extensions() {
        assert_eq!(test_candidates("README.md"), None);
        assert_eq!(test_candidates("Makefile"), None);
    }
}
