//! Dialect options for the parser.
//!
//! The defaults are a flat left-to-right condition fold and the keyword block
//! rule, under which a block that would be empty is an error rather than
//! silently ending. The alternatives are opt-in, either through a TOML file:
//!
//! ```toml
//! precedence = "standard"
//! blocks = "explicit"
//! ```
//!
//! or through the matching command-line flags.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use snafu::ResultExt;

use crate::error::{ConfigError, DecodeSnafu, ReadSnafu};

/// How comparison and logical operators group inside a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
  /// One level, folded strictly left to right: `a and b == c` is
  /// `(a and b) == c`.
  #[default]
  Flat,
  /// Comparisons bind tighter than `and`, which binds tighter than `or`.
  Standard,
}

/// Where a block ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockStyle {
  /// A block stops in front of the next keyword. A `return` is taken into
  /// the block and closes it.
  #[default]
  Keyword,
  /// Blocks may nest freely. `elif`, `else` and `end` close a block, and
  /// every compound statement is terminated by one `end`.
  Explicit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
  pub precedence: Precedence,
  pub blocks: BlockStyle,
}

impl Options {
  pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
    toml::from_str(text).context(DecodeSnafu)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).context(ReadSnafu { path })?;
    Self::from_toml_str(&text)
  }
}

impl FromStr for Precedence {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "flat" => Ok(Self::Flat),
      "standard" => Ok(Self::Standard),
      other => Err(format!(
        "unknown precedence \"{other}\", expected \"flat\" or \"standard\""
      )),
    }
  }
}

impl fmt::Display for Precedence {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Flat => "flat",
      Self::Standard => "standard",
    })
  }
}

impl FromStr for BlockStyle {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "keyword" => Ok(Self::Keyword),
      "explicit" => Ok(Self::Explicit),
      other => Err(format!(
        "unknown block style \"{other}\", expected \"keyword\" or \"explicit\""
      )),
    }
  }
}

impl fmt::Display for BlockStyle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Keyword => "keyword",
      Self::Explicit => "explicit",
    })
  }
}
