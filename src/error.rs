//! Shared error utilities used across the translation pipeline.
//!
//! The pipeline stops at the first fault, so there are only two pipeline
//! errors: the tokenizer found no pattern at some offset, or the parser found
//! a token it did not expect. `render` formats either one against the source
//! line it came from, pointing at the offending byte with a caret.

use std::fmt;
use std::path::PathBuf;

use snafu::Snafu;

use crate::tokenizer::{Token, TokenKind, describe_token};

pub type TranspileResult<T> = Result<T, TranspileError>;

/// What the parser required when it gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
  /// Any token of this kind.
  Kind(TokenKind),
  /// A token of this kind spelled exactly like this.
  Lexeme(TokenKind, &'static str),
  Statement,
  Factor,
  Parameter,
  /// One of the operator lexemes the grammar knows about.
  Operator,
  /// The contextual `end` that closes a block in the explicit block style.
  BlockEnd,
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Kind(kind) => write!(f, "{kind}"),
      Self::Lexeme(_, lexeme) => write!(f, "\"{lexeme}\""),
      Self::Statement => f.write_str("a statement"),
      Self::Factor => f.write_str("a number, identifier or \"(\""),
      Self::Parameter => f.write_str("a parameter name or number"),
      Self::Operator => f.write_str("a known operator"),
      Self::BlockEnd => f.write_str("\"end\""),
    }
  }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranspileError {
  #[snafu(display("no token matches at offset {position}"))]
  Lex { position: usize },

  #[snafu(display("expected {expected}, but got {}", describe_token(found.as_ref())))]
  Parse {
    expected: Expected,
    found: Option<Token>,
  },
}

impl TranspileError {
  /// Byte offset in `source` the error points at. Running out of tokens
  /// points just past the last non-whitespace character.
  pub fn location(&self, source: &str) -> usize {
    match self {
      Self::Lex { position } => *position,
      Self::Parse {
        found: Some(token), ..
      } => token.loc,
      Self::Parse { found: None, .. } => source.trim_end().len(),
    }
  }

  /// Format the error against the source it came from:
  ///
  /// ```text
  /// 2:5: x = @
  ///          ^ no token matches at offset 10
  /// ```
  pub fn render(&self, source: &str) -> String {
    let loc = self.location(source).min(source.len());
    let line_start = source[..loc].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[loc..].find('\n').map_or(source.len(), |i| loc + i);
    let line = source[line_start..line_end].trim_end_matches('\r');
    let line_no = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..loc].chars().count() + 1;

    let prefix = format!("{line_no}:{column}: ");
    let marker = format!("{}^", " ".repeat(prefix.len() + column - 1));
    format!("{prefix}{line}\n{marker} {self}")
  }
}

/// Failures while loading [`crate::config::Options`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
  #[snafu(display("could not read config file {}", path.display()))]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[snafu(display("invalid config: {source}"))]
  Decode { source: toml::de::Error },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lex_error_points_at_offending_byte() {
    let source = "x = 1 @";
    let err = TranspileError::Lex { position: 6 };
    assert_eq!(
      err.render(source),
      "1:7: x = 1 @\n           ^ no token matches at offset 6"
    );
  }

  #[test]
  fn end_of_input_points_past_last_visible_character() {
    let source = "x =\n\n";
    let err = TranspileError::Parse {
      expected: Expected::Factor,
      found: None,
    };
    assert_eq!(
      err.render(source),
      "1:4: x =\n        ^ expected a number, identifier or \"(\", but got end of input"
    );
  }

  #[test]
  fn parse_error_reports_line_and_column() {
    let source = "x = 1\ny = )";
    let err = TranspileError::Parse {
      expected: Expected::Factor,
      found: Some(Token::new(TokenKind::Delimiter, ")", 10)),
    };
    let rendered = err.render(source);
    let mut lines = rendered.lines();
    assert_eq!(lines.next(), Some("2:5: y = )"));
    assert_eq!(
      lines.next(),
      Some("         ^ expected a number, identifier or \"(\", but got \")\"")
    );
  }

  #[test]
  fn parse_error_at_end_of_input_points_past_last_char() {
    let source = "x =";
    let err = TranspileError::Parse {
      expected: Expected::Factor,
      found: None,
    };
    assert_eq!(err.location(source), 3);
    assert!(err.render(source).ends_with("but got end of input"));
  }

  #[test]
  fn expected_lexeme_is_quoted() {
    let expected = Expected::Lexeme(TokenKind::Delimiter, ":");
    assert_eq!(expected.to_string(), "\":\"");
    assert_eq!(Expected::Kind(TokenKind::Identifier).to_string(), "identifier");
  }
}
