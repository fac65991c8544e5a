//! Crate root: wires together the translation pipeline.
//!
//! The stages are small and run strictly one after the other:
//! - `tokenizer` performs lexical analysis and produces a flat token vector.
//! - `parser` owns all syntactic knowledge and returns an `ast::Program`.
//! - `codegen` walks the tree and writes C-family source text.
//! - `config` holds the dialect options the parser honours.
//! - `error` centralises the error types and their diagnostics.
//!
//! Nothing survives between calls: every run owns its tokens and its tree, so
//! separate runs can proceed in parallel.

pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod tokenizer;

use tracing::debug;

pub use codegen::emit;
pub use config::{BlockStyle, Options, Precedence};
pub use error::{ConfigError, Expected, TranspileError, TranspileResult};
pub use parser::{parse, parse_with};
pub use tokenizer::{Token, TokenKind, tokenize};

/// Translate a source string with the default options.
pub fn transpile(source: &str) -> TranspileResult<String> {
  transpile_with(source, &Options::default())
}

/// Translate a source string: tokenize, parse, emit.
pub fn transpile_with(source: &str, options: &Options) -> TranspileResult<String> {
  let tokens = tokenize(source)?;
  debug!(tokens = tokens.len(), "tokenized source");

  let program = parse_with(tokens, options)?;
  debug!(
    statements = program.statements.len(),
    precedence = %options.precedence,
    blocks = %options.blocks,
    "parsed program"
  );

  let output = emit(&program);
  debug!(bytes = output.len(), "emitted program");
  Ok(output)
}
