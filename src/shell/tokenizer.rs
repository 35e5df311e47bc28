//! Word-level tokenization of a single command segment.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    /// `>`, `>>`, `>&`, `<`, `<<`, `<<<`.
    Redirect(String),
    /// `NAME=value` prefix.
    Assignment(String, String),
}

/// Split one command segment into tokens.
///
/// Quotes group characters and are dropped; a backslash escapes the next
/// character (kept verbatim inside double quotes). Redirect operators become
/// their own tokens even without surrounding spaces.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') | (Some('"'), '"') => quote = None,
            (Some('\''), _) => current.push(c),
            (Some(_), '\\') => {
                current.push(c);
                current.extend(chars.next());
            }
            (Some(_), _) => current.push(c),
            (None, '\\') => current.extend(chars.next()),
            (None, '\'' | '"') => quote = Some(c),
            (None, c) if c.is_whitespace() => flush(&mut tokens, &mut current),
            (None, '>') => {
                flush(&mut tokens, &mut current);
                let mut op = String::from(c);
                op.extend(chars.next_if_eq(&'>'));
                op.extend(chars.next_if_eq(&'&'));
                tokens.push(Token::Redirect(op));
            }
            (None, '<') => {
                flush(&mut tokens, &mut current);
                let mut op = String::from(c);
                if let Some(second) = chars.next_if_eq(&'<') {
                    op.push(second);
                    op.extend(chars.next_if_eq(&'<'));
                }
                tokens.push(Token::Redirect(op));
            }
            (None, _) => current.push(c),
        }
    }

    flush(&mut tokens, &mut current);
    tokens
}

fn flush(tokens: &mut Vec<Token>, current: &mut String) {
    if !current.is_empty() {
        tokens.push(classify(current));
        current.clear();
    }
}

/// `NAME=value` with a valid identifier is an assignment; anything else is a word.
fn classify(raw: &str) -> Token {
    match raw.split_once('=') {
        Some((name, value)) if is_identifier(name) => {
            Token::Assignment(name.to_string(), value.to_string())
        }
        _ => Token::Word(raw.to_string()),
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// First plain word, skipping leading assignments.
pub fn command_name(tokens: &[Token]) -> Option<&str> {
    tokens.iter().find_map(|t| match t {
        Token::Word(w) => Some(w.as_str()),
        _ => None,
    })
}

/// Plain words only, in order; assignments and redirects are dropped.
pub fn words(tokens: &[Token]) -> Vec<&str> {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_tokenize() {
        let tokens = tokenize("ls -la /tmp");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::Word("ls".to_string()));
        assert_eq!(tokens[1], Token::Word("-la".to_string()));
    }

    #[test]
    fn test_quoted_string() {
        let tokens = tokenize("echo 'hello world'");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::Word("hello world".to_string()));
    }

    #[test]
    fn test_double_quoted() {
        let tokens = tokenize("echo \"hello world\"");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::Word("hello world".to_string()));
    }

    #[test]
    fn test_escaped_space() {
        let tokens = tokenize("echo hello\\ world");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], Token::Word("hello world".to_string()));
    }

    #[test]
    fn test_assignment() {
        let tokens = tokenize("FOO=bar echo $FOO");
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            Token::Assignment("FOO".to_string(), "bar".to_string())
        );
    }

    #[test]
    fn test_redirect() {
        let tokens = tokenize("cat file > output");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2], Token::Redirect(">".to_string()));
    }

    #[test]
    fn test_append_redirect() {
        let tokens = tokenize("echo hello >> file");
        assert!(tokens.iter().any(|t| *t == Token::Redirect(">>".to_string())));
    }

    #[test]
    fn test_command_name() {
        let tokens = tokenize("FOO=bar sudo ls -la");
        assert_eq!(command_name(&tokens), Some("sudo"));
    }

    #[test]
    fn test_words() {
        let tokens = tokenize("NODE_ENV=prod npm install lod-ash > log.txt");
        assert_eq!(words(&tokens), vec!["npm", "install", "lod-ash", "log.txt"]);
    }

    #[test]
    fn test_heredoc_redirect() {
        let tokens = tokenize("cat <<< word");
        assert_eq!(tokens[1], Token::Redirect("<<<".to_string()));
    }
}
