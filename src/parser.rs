//! Recursive-descent parser producing a `Program`.
//!
//! Each grammar rule is one function taking the cursor by `&mut`, so the
//! parse state is an explicit value rather than anything shared. There is one
//! token of lookahead (two to tell a call statement from an assignment), no
//! backtracking, and the first mismatch aborts the whole parse.
//!
//! Two rules depend on [`Options`]: how a condition groups its operators and
//! where a block ends. Everything else is fixed.

use tracing::trace;

use crate::ast::{BinaryOp, Block, Call, ElifClause, Expr, FunctionDef, IfChain, Program, Stmt};
use crate::config::{BlockStyle, Options, Precedence};
use crate::error::{Expected, ParseSnafu, TranspileError, TranspileResult};
use crate::tokenizer::{Token, TokenKind};

/// Every operator lexeme the grammar uses somewhere. The tokenizer lexes any
/// run of operator characters, so anything outside this set (`+-`, `=<`,
/// `===`) is rejected as soon as the parser looks at it.
const OPERATORS: [&str; 11] = ["+", "-", "*", "/", "=", "==", "!=", "<", "<=", ">", ">="];

/// Operators of the single level a flat condition folds over.
const FLAT_CONDITION: [BinaryOp; 8] = [
  BinaryOp::Eq,
  BinaryOp::Ne,
  BinaryOp::Lt,
  BinaryOp::Le,
  BinaryOp::Gt,
  BinaryOp::Ge,
  BinaryOp::And,
  BinaryOp::Or,
];

/// Closes a block in the explicit block style. Not a keyword: it only means
/// anything at statement position.
const BLOCK_END: &str = "end";

/// Parse a whole program with the default options.
pub fn parse(tokens: Vec<Token>) -> TranspileResult<Program> {
  parse_with(tokens, &Options::default())
}

pub fn parse_with(tokens: Vec<Token>, options: &Options) -> TranspileResult<Program> {
  let mut stream = TokenStream::new(tokens, *options);
  let mut statements = Vec::new();

  while !stream.is_eof() {
    statements.push(parse_stmt(&mut stream)?);
  }

  Ok(Program { statements })
}

/// Dispatch on the first token of the statement.
fn parse_stmt(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  let stmt = if stream.at(TokenKind::Keyword, "if") {
    parse_if(stream)?
  } else if stream.at(TokenKind::Keyword, "while") {
    parse_while(stream)?
  } else if stream.at(TokenKind::Keyword, "def") {
    parse_def(stream)?
  } else if stream.at(TokenKind::Keyword, "return") {
    parse_return(stream)?
  } else if stream.at_kind(TokenKind::Identifier) && !stream.at_block_end() {
    if stream.call_follows() {
      Stmt::Call(parse_call(stream)?)
    } else {
      parse_assignment(stream)?
    }
  } else {
    return Err(stream.error(Expected::Statement));
  };

  trace!(kind = stmt.kind(), "parsed statement");
  Ok(stmt)
}

fn parse_if(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  stream.skip(TokenKind::Keyword, "if")?;
  let condition = parse_condition(stream)?;
  stream.skip(TokenKind::Delimiter, ":")?;
  let then_block = parse_block(stream)?;

  let mut elif_clauses = Vec::new();
  while stream.equal(TokenKind::Keyword, "elif") {
    let condition = parse_condition(stream)?;
    stream.skip(TokenKind::Delimiter, ":")?;
    let block = parse_block(stream)?;
    elif_clauses.push(ElifClause { condition, block });
  }

  let else_block = if stream.equal(TokenKind::Keyword, "else") {
    stream.skip(TokenKind::Delimiter, ":")?;
    Some(parse_block(stream)?)
  } else {
    None
  };

  stream.close_compound()?;
  Ok(Stmt::If(IfChain {
    condition,
    then_block,
    elif_clauses,
    else_block,
  }))
}

fn parse_while(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  stream.skip(TokenKind::Keyword, "while")?;
  let condition = parse_condition(stream)?;
  stream.skip(TokenKind::Delimiter, ":")?;
  let body = parse_block(stream)?;
  stream.close_compound()?;
  Ok(Stmt::While { condition, body })
}

fn parse_def(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  stream.skip(TokenKind::Keyword, "def")?;
  let name = stream.get_ident()?;
  stream.skip(TokenKind::Delimiter, "(")?;

  let mut params = Vec::new();
  if !stream.equal(TokenKind::Delimiter, ")") {
    params.push(stream.get_param()?);
    while stream.equal(TokenKind::Delimiter, ",") {
      params.push(stream.get_param()?);
    }
    stream.skip(TokenKind::Delimiter, ")")?;
  }

  stream.skip(TokenKind::Delimiter, ":")?;
  let body = parse_block(stream)?;
  stream.close_compound()?;
  Ok(Stmt::FunctionDef(FunctionDef { name, params, body }))
}

fn parse_return(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  stream.skip(TokenKind::Keyword, "return")?;
  Ok(Stmt::Return(parse_expr(stream)?))
}

fn parse_assignment(stream: &mut TokenStream) -> TranspileResult<Stmt> {
  let target = stream.get_ident()?;
  stream.skip(TokenKind::Operator, "=")?;
  let value = parse_expr(stream)?;
  Ok(Stmt::Assignment { target, value })
}

/// `IDENT '(' ArgList? ')'`, shared by call statements and call factors.
fn parse_call(stream: &mut TokenStream) -> TranspileResult<Call> {
  let callee = stream.get_ident()?;
  stream.skip(TokenKind::Delimiter, "(")?;

  let mut args = Vec::new();
  if !stream.equal(TokenKind::Delimiter, ")") {
    args.push(parse_expr(stream)?);
    while stream.equal(TokenKind::Delimiter, ",") {
      args.push(parse_expr(stream)?);
    }
    stream.skip(TokenKind::Delimiter, ")")?;
  }

  Ok(Call { callee, args })
}

fn parse_block(stream: &mut TokenStream) -> TranspileResult<Block> {
  let mut statements = Vec::new();

  match stream.options.blocks {
    BlockStyle::Keyword => {
      // Any keyword ends the block; a `return` is taken in first.
      while let Some(token) = stream.peek() {
        if token.kind == TokenKind::Keyword {
          if token.lexeme == "return" {
            statements.push(parse_return(stream)?);
          }
          break;
        }
        statements.push(parse_stmt(stream)?);
      }
    }
    BlockStyle::Explicit => {
      while !stream.at(TokenKind::Keyword, "elif")
        && !stream.at(TokenKind::Keyword, "else")
        && !stream.at_block_end()
      {
        if stream.is_eof() {
          return Err(stream.error(Expected::BlockEnd));
        }
        statements.push(parse_stmt(stream)?);
      }
    }
  }

  if statements.is_empty() {
    return Err(stream.error(Expected::Statement));
  }
  Ok(Block { statements })
}

fn parse_condition(stream: &mut TokenStream) -> TranspileResult<Expr> {
  match stream.options.precedence {
    Precedence::Flat => parse_binary_chain(stream, &FLAT_CONDITION, parse_expr),
    Precedence::Standard => parse_or(stream),
  }
}

fn parse_or(stream: &mut TokenStream) -> TranspileResult<Expr> {
  parse_binary_chain(stream, &[BinaryOp::Or], parse_and)
}

fn parse_and(stream: &mut TokenStream) -> TranspileResult<Expr> {
  parse_binary_chain(stream, &[BinaryOp::And], parse_comparison)
}

fn parse_comparison(stream: &mut TokenStream) -> TranspileResult<Expr> {
  parse_binary_chain(stream, &BinaryOp::COMPARISON, parse_expr)
}

fn parse_expr(stream: &mut TokenStream) -> TranspileResult<Expr> {
  parse_binary_chain(stream, &BinaryOp::ADDITIVE, parse_term)
}

fn parse_term(stream: &mut TokenStream) -> TranspileResult<Expr> {
  parse_binary_chain(stream, &BinaryOp::MULTIPLICATIVE, parse_factor)
}

/// `operand (op operand)*` for `op` in `ops`, folded to the left.
fn parse_binary_chain(
  stream: &mut TokenStream,
  ops: &[BinaryOp],
  operand: fn(&mut TokenStream) -> TranspileResult<Expr>,
) -> TranspileResult<Expr> {
  let mut node = operand(stream)?;

  while let Some(op) = stream.binary_op(ops)? {
    stream.advance();
    let rhs = operand(stream)?;
    node = Expr::binary(node, op, rhs);
  }

  Ok(node)
}

fn parse_factor(stream: &mut TokenStream) -> TranspileResult<Expr> {
  if stream.equal(TokenKind::Delimiter, "(") {
    let node = parse_expr(stream)?;
    stream.skip(TokenKind::Delimiter, ")")?;
    return Ok(node);
  }

  if stream.at_kind(TokenKind::Number) {
    return Ok(Expr::literal(stream.get_number()?));
  }

  if stream.at_kind(TokenKind::Identifier) {
    if stream.call_follows() {
      return Ok(Expr::Call(parse_call(stream)?));
    }
    return Ok(Expr::variable(stream.get_ident()?));
  }

  Err(stream.error(Expected::Factor))
}

/// Cursor over the token vector plus the options the parse runs under.
struct TokenStream {
  tokens: Vec<Token>,
  pos: usize,
  options: Options,
}

impl TokenStream {
  fn new(tokens: Vec<Token>, options: Options) -> Self {
    Self {
      tokens,
      pos: 0,
      options,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  fn advance(&mut self) {
    self.pos += 1;
  }

  fn is_eof(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  fn at(&self, kind: TokenKind, lexeme: &str) -> bool {
    self.peek().is_some_and(|token| token.is(kind, lexeme))
  }

  fn at_kind(&self, kind: TokenKind) -> bool {
    self.peek().is_some_and(|token| token.kind == kind)
  }

  /// Identifier followed by `(`: a call rather than an assignment or variable.
  fn call_follows(&self) -> bool {
    self
      .tokens
      .get(self.pos + 1)
      .is_some_and(|token| token.is(TokenKind::Delimiter, "("))
  }

  fn at_block_end(&self) -> bool {
    self.options.blocks == BlockStyle::Explicit && self.at(TokenKind::Identifier, BLOCK_END)
  }

  /// Consume the current token if it is exactly `lexeme` of `kind`.
  fn equal(&mut self, kind: TokenKind, lexeme: &str) -> bool {
    if self.at(kind, lexeme) {
      self.advance();
      return true;
    }
    false
  }

  fn skip(&mut self, kind: TokenKind, lexeme: &'static str) -> TranspileResult<()> {
    if self.equal(kind, lexeme) {
      Ok(())
    } else {
      Err(self.error(Expected::Lexeme(kind, lexeme)))
    }
  }

  /// In the explicit block style every compound statement ends with `end`.
  fn close_compound(&mut self) -> TranspileResult<()> {
    if self.options.blocks == BlockStyle::Keyword {
      return Ok(());
    }
    if self.at_block_end() {
      self.advance();
      Ok(())
    } else {
      Err(self.error(Expected::BlockEnd))
    }
  }

  /// Peek at a binary operator from `ops`. A lexeme outside the grammar's
  /// operator set is an error here; a known operator of another level just
  /// ends the chain.
  fn binary_op(&self, ops: &[BinaryOp]) -> TranspileResult<Option<BinaryOp>> {
    let Some(token) = self.peek() else {
      return Ok(None);
    };

    match token.kind {
      TokenKind::Operator if !OPERATORS.contains(&token.lexeme.as_str()) => {
        Err(self.error(Expected::Operator))
      }
      TokenKind::Operator | TokenKind::Keyword => Ok(
        BinaryOp::from_lexeme(&token.lexeme).filter(|op| ops.contains(op)),
      ),
      _ => Ok(None),
    }
  }

  fn get_ident(&mut self) -> TranspileResult<String> {
    self.take(TokenKind::Identifier, Expected::Kind(TokenKind::Identifier))
  }

  /// Parameters are names or numbers, kept as written.
  fn get_param(&mut self) -> TranspileResult<String> {
    if self.at_kind(TokenKind::Number) {
      return self.take(TokenKind::Number, Expected::Parameter);
    }
    self.take(TokenKind::Identifier, Expected::Parameter)
  }

  fn get_number(&mut self) -> TranspileResult<String> {
    self.take(TokenKind::Number, Expected::Kind(TokenKind::Number))
  }

  fn take(&mut self, kind: TokenKind, expected: Expected) -> TranspileResult<String> {
    match self.peek() {
      Some(token) if token.kind == kind => {
        let lexeme = token.lexeme.clone();
        self.advance();
        Ok(lexeme)
      }
      _ => Err(self.error(expected)),
    }
  }

  fn error(&self, expected: Expected) -> TranspileError {
    ParseSnafu {
      expected,
      found: self.peek().cloned(),
    }
    .build()
  }
}
