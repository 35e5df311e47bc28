//! Split shell commands on operators (&&, ||, |, ;, &).

/// Shell operators that separate commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// && - run next if previous succeeds
    And,
    /// || - run next if previous fails
    Or,
    /// | - pipe stdout to next command
    Pipe,
    /// ; - run sequentially
    Semicolon,
    /// & - run in background
    Background,
}

/// A segment of a shell command.
#[derive(Debug, Clone)]
pub struct CommandSegment {
    /// The command text.
    pub command: String,
    /// The operator that follows this segment (None for last segment).
    pub operator: Option<Operator>,
}

fn push_segment(
    segments: &mut Vec<CommandSegment>,
    current: &mut String,
    operator: Option<Operator>,
) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(CommandSegment {
            command: trimmed.to_string(),
            operator,
        });
    }
    current.clear();
}

/// Split a command line into segments on shell operators.
///
/// Respects quoting and escapes. `&` directly after a redirect (`2>&1`) stays
/// part of the segment.
pub fn split_commands(input: &str) -> Vec<CommandSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if !in_single_quote => {
                escape_next = true;
                current.push(c);
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                current.push(c);
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                current.push(c);
            }
            _ if in_single_quote || in_double_quote => current.push(c),
            '&' if chars.next_if_eq(&'&').is_some() => {
                push_segment(&mut segments, &mut current, Some(Operator::And));
            }
            '&' if current.ends_with(['>', '<']) => current.push(c),
            '&' => push_segment(&mut segments, &mut current, Some(Operator::Background)),
            '|' if chars.next_if_eq(&'|').is_some() => {
                push_segment(&mut segments, &mut current, Some(Operator::Or));
            }
            '|' => push_segment(&mut segments, &mut current, Some(Operator::Pipe)),
            ';' | '\n' => push_segment(&mut segments, &mut current, Some(Operator::Semicolon)),
            _ => current.push(c),
        }
    }

    push_segment(&mut segments, &mut current, None);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_command() {
        let segments = split_commands("ls -la");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].command, "ls -la");
        assert_eq!(segments[0].operator, None);
    }

    #[test]
    fn test_and_operator() {
        let segments = split_commands("cd /tmp && ls");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].command, "cd /tmp");
        assert_eq!(segments[0].operator, Some(Operator::And));
        assert_eq!(segments[1].command, "ls");
    }

    #[test]
    fn test_or_and_pipe() {
        let segments = split_commands("test -f file || cat file | grep x");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].operator, Some(Operator::Or));
        assert_eq!(segments[1].operator, Some(Operator::Pipe));
    }

    #[test]
    fn test_semicolon_and_newline() {
        let segments = split_commands("echo a; echo b\necho c");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].operator, Some(Operator::Semicolon));
    }

    #[test]
    fn test_background() {
        let segments = split_commands("sleep 5 & echo done");
        assert_eq!(segments[0].operator, Some(Operator::Background));
    }

    #[test]
    fn test_redirect_ampersand_kept() {
        let segments = split_commands("make 2>&1 | tee build.log");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].command, "make 2>&1");
    }

    #[test]
    fn test_quoted_operators() {
        let segments = split_commands("echo '&&' && ls");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].command, "echo '&&'");
        let segments = split_commands("echo \"a | b\" ; ls");
        assert_eq!(segments[0].command, "echo \"a | b\"");
    }

    #[test]
    fn test_escaped_operator() {
        let segments = split_commands("echo a \\&\\& b");
        assert_eq!(segments.len(), 1);
    }
}
