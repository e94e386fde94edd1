//! Def-file tokenizer
//!
//! Splits entity definition text into whitespace/brace-delimited tokens.
//! Braces are always tokens of their own, `"`-quoted strings keep embedded
//! whitespace, and `//` line comments and `/* */` block comments are
//! skipped. The actual def files are located and read by an external
//! collaborator; this core only consumes the token stream.

use thiserror::Error;

/// Errors raised for structurally broken definition blocks
///
/// These abort the current block only; the registry logs the error and
/// carries on with the next definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefParseError {
    /// The token stream ended inside a definition block
    #[error("unexpected end of tokens (unclosed block?)")]
    UnexpectedEnd,

    /// A specific token was required but something else was found
    #[error("expected token '{expected}', found '{found}'")]
    UnexpectedToken {
        /// The token that was required at this point
        expected: String,
        /// The token actually encountered
        found: String,
    },
}

/// Tokenizer over def-file text
#[derive(Debug)]
pub struct DefTokenizer<'a> {
    remaining: &'a str,
}

impl<'a> DefTokenizer<'a> {
    /// Create a tokenizer over the given text
    pub fn new(text: &'a str) -> Self {
        Self { remaining: text }
    }

    /// Return the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Option<String> {
        self.skip_whitespace_and_comments();

        let mut chars = self.remaining.char_indices();
        let (_, first) = chars.next()?;

        // Braces separate even when not surrounded by whitespace
        if first == '{' || first == '}' {
            self.remaining = &self.remaining[first.len_utf8()..];
            return Some(first.to_string());
        }

        if first == '"' {
            return Some(self.read_quoted());
        }

        let mut end = self.remaining.len();
        for (idx, c) in self.remaining.char_indices() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                end = idx;
                break;
            }
        }

        let token = &self.remaining[..end];
        self.remaining = &self.remaining[end..];
        Some(token.to_string())
    }

    /// Return the next token or fail with [`DefParseError::UnexpectedEnd`]
    pub fn expect_token(&mut self) -> Result<String, DefParseError> {
        self.next_token().ok_or(DefParseError::UnexpectedEnd)
    }

    /// Consume the next token and fail unless it equals `expected`
    pub fn assert_next(&mut self, expected: &str) -> Result<(), DefParseError> {
        let found = self.expect_token()?;
        if found == expected {
            Ok(())
        } else {
            Err(DefParseError::UnexpectedToken {
                expected: expected.to_string(),
                found,
            })
        }
    }

    fn read_quoted(&mut self) -> String {
        // Skip the opening quote
        self.remaining = &self.remaining[1..];

        let end = self.remaining.find('"').unwrap_or(self.remaining.len());
        let token = &self.remaining[..end];

        self.remaining = if end < self.remaining.len() {
            &self.remaining[end + 1..]
        } else {
            ""
        };

        token.to_string()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            self.remaining = self.remaining.trim_start();

            if let Some(rest) = self.remaining.strip_prefix("//") {
                self.remaining = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
            } else if let Some(rest) = self.remaining.strip_prefix("/*") {
                self.remaining = rest.find("*/").map_or("", |idx| &rest[idx + 2..]);
            } else {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_tokens(text: &str) -> Vec<String> {
        let mut tok = DefTokenizer::new(text);
        let mut tokens = Vec::new();
        while let Some(t) = tok.next_token() {
            tokens.push(t);
        }
        tokens
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            all_tokens("{ inherit light_base }"),
            vec!["{", "inherit", "light_base", "}"]
        );
    }

    #[test]
    fn test_braces_split_without_whitespace() {
        assert_eq!(all_tokens("{key value}"), vec!["{", "key", "value", "}"]);
    }

    #[test]
    fn test_quoted_strings_keep_whitespace() {
        assert_eq!(
            all_tokens(r#""editor_usage" "A light source.""#),
            vec!["editor_usage", "A light source."]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "// header comment\n{ key /* inline */ value }\n";
        assert_eq!(all_tokens(text), vec!["{", "key", "value", "}"]);
    }

    #[test]
    fn test_assert_next() {
        let mut tok = DefTokenizer::new("( value");
        let err = tok.assert_next("{").unwrap_err();
        assert_eq!(
            err,
            DefParseError::UnexpectedToken {
                expected: "{".to_string(),
                found: "(".to_string(),
            }
        );
    }

    #[test]
    fn test_unexpected_end() {
        let mut tok = DefTokenizer::new("   ");
        assert_eq!(tok.expect_token().unwrap_err(), DefParseError::UnexpectedEnd);
    }
}
