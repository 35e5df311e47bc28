//! Maximum line count for written files.

use crate::decision::Decision;

/// Deny writes whose contents exceed `max_lines`.
pub fn check_file_size(contents: &str, max_lines: usize) -> Decision {
    if contents.is_empty() {
        return Decision::allow();
    }
    let lines = contents.matches('\n').count() + 1;
    if lines > max_lines {
        return Decision::deny(
            "write.file_size",
            format!("Blocked: file would be {lines} lines (limit: {max_lines}). Break it into smaller files."),
        );
    }
    Decision::allow()
}
