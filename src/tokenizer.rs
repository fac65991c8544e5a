//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! At every offset the patterns are tried in a fixed order and the first one
//! that matches wins: keyword, identifier, number, operator run, delimiter,
//! whitespace. Keywords come before identifiers so `if` is never lexed as a
//! name. Operator characters are taken as one greedy run, which makes `<=` a
//! single token but also lexes `+-` as one; rejecting such runs is left to the
//! parser.

use std::fmt;

use crate::error::{LexSnafu, TranspileResult};

/// Reserved words. `and`/`or` are keywords even though they act as operators.
pub const KEYWORDS: [&str; 8] = [
  "if", "else", "elif", "while", "def", "return", "and", "or",
];

const OPERATOR_CHARS: &[u8] = b"+-/*=<>!";
const DELIMITERS: &[u8] = b"():,;";

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Keyword,
  Identifier,
  Number,
  Operator,
  Delimiter,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Keyword => "keyword",
      Self::Identifier => "identifier",
      Self::Number => "number",
      Self::Operator => "operator",
      Self::Delimiter => "delimiter",
    })
  }
}

/// A lexeme together with its kind and the byte offset it started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub lexeme: String,
  pub loc: usize,
}

impl Token {
  pub fn new(kind: TokenKind, lexeme: impl Into<String>, loc: usize) -> Self {
    Self {
      kind,
      lexeme: lexeme.into(),
      loc,
    }
  }

  /// True if this token has the given kind and is spelled exactly `lexeme`.
  pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
    self.kind == kind && self.lexeme == lexeme
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind, self.lexeme)
  }
}

/// Lex the whole input. Whitespace is dropped; nothing marks the end of the
/// sequence other than the end of the vector.
pub fn tokenize(input: &str) -> TranspileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let mut i = 0;

  while let Some(c) = input[i..].chars().next() {
    let rest = &input[i..];

    if c.is_whitespace() {
      i += rest
        .char_indices()
        .find(|(_, ch)| !ch.is_whitespace())
        .map_or(rest.len(), |(idx, _)| idx);
      continue;
    }

    if c.is_ascii_alphanumeric() || c == '_' {
      let len = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
      let kind = classify_word(&rest[..len], &rest[len..]);
      let Some(kind) = kind else {
        return LexSnafu { position: i }.fail();
      };
      tokens.push(Token::new(kind, &rest[..len], i));
      i += len;
      continue;
    }

    if c.is_ascii() && OPERATOR_CHARS.contains(&(c as u8)) {
      let len = rest
        .bytes()
        .take_while(|b| OPERATOR_CHARS.contains(b))
        .count();
      tokens.push(Token::new(TokenKind::Operator, &rest[..len], i));
      i += len;
      continue;
    }

    if c.is_ascii() && DELIMITERS.contains(&(c as u8)) {
      tokens.push(Token::new(TokenKind::Delimiter, &rest[..1], i));
      i += 1;
      continue;
    }

    return LexSnafu { position: i }.fail();
  }

  Ok(tokens)
}

/// Decide what a maximal run of ASCII word characters is. A word glued to a
/// following non-ASCII letter or digit is not a whole word and matches no
/// pattern, and neither does a run that starts with a digit but is not all
/// digits (`12ab`).
fn classify_word(word: &str, after: &str) -> Option<TokenKind> {
  if after.chars().next().is_some_and(char::is_alphanumeric) {
    return None;
  }
  if KEYWORDS.contains(&word) {
    return Some(TokenKind::Keyword);
  }
  let first = word.bytes().next()?;
  if first.is_ascii_alphabetic() || first == b'_' {
    Some(TokenKind::Identifier)
  } else if word.bytes().all(|b| b.is_ascii_digit()) {
    Some(TokenKind::Number)
  } else {
    None
  }
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>) -> String {
  match token {
    Some(t) => format!("\"{}\"", t.lexeme),
    None => "end of input".to_string(),
  }
}
