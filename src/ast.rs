//! Syntax tree shared by the parser and the emitter.
//!
//! Every construct has exactly one representation. Nodes own their children,
//! are built once by the parser and only read afterwards.

use std::fmt;

/// Binary operators. The textual form of each is exactly the source lexeme,
/// which is also what the emitter writes back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  And,
  Or,
}

impl BinaryOp {
  pub const ADDITIVE: [Self; 2] = [Self::Add, Self::Sub];
  pub const MULTIPLICATIVE: [Self; 2] = [Self::Mul, Self::Div];
  pub const COMPARISON: [Self; 6] = [Self::Eq, Self::Ne, Self::Lt, Self::Le, Self::Gt, Self::Ge];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Add => "+",
      Self::Sub => "-",
      Self::Mul => "*",
      Self::Div => "/",
      Self::Eq => "==",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
      Self::And => "and",
      Self::Or => "or",
    }
  }

  pub fn from_lexeme(lexeme: &str) -> Option<Self> {
    let op = match lexeme {
      "+" => Self::Add,
      "-" => Self::Sub,
      "*" => Self::Mul,
      "/" => Self::Div,
      "==" => Self::Eq,
      "!=" => Self::Ne,
      "<" => Self::Lt,
      "<=" => Self::Le,
      ">" => Self::Gt,
      ">=" => Self::Ge,
      "and" => Self::And,
      "or" => Self::Or,
      _ => return None,
    };
    Some(op)
  }
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  /// Decimal digits without leading zeros. Kept as text so a literal of any
  /// size survives translation unchanged.
  Literal(String),
  Variable(String),
  Call(Call),
  Binary {
    lhs: Box<Expr>,
    op: BinaryOp,
    rhs: Box<Expr>,
  },
}

impl Expr {
  pub fn literal(value: impl ToString) -> Self {
    let digits = value.to_string();
    match digits.trim_start_matches('0') {
      "" => Self::Literal("0".to_string()),
      trimmed => Self::Literal(trimmed.to_string()),
    }
  }

  pub fn variable(name: impl Into<String>) -> Self {
    Self::Variable(name.into())
  }

  pub fn binary(lhs: Expr, op: BinaryOp, rhs: Expr) -> Self {
    Self::Binary {
      lhs: Box::new(lhs),
      op,
      rhs: Box::new(rhs),
    }
  }
}

/// A call, used both as a statement and inside expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
  pub callee: String,
  pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
  pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
  pub name: String,
  pub params: Vec<String>,
  pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElifClause {
  pub condition: Expr,
  pub block: Block,
}

/// `if` with its `elif` clauses in source order and an optional `else`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfChain {
  pub condition: Expr,
  pub then_block: Block,
  pub elif_clauses: Vec<ElifClause>,
  pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
  FunctionDef(FunctionDef),
  Return(Expr),
  Assignment { target: String, value: Expr },
  Call(Call),
  If(IfChain),
  While { condition: Expr, body: Block },
}

impl Stmt {
  /// Short name of the statement form, for logging.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::FunctionDef(_) => "def",
      Self::Return(_) => "return",
      Self::Assignment { .. } => "assignment",
      Self::Call(_) => "call",
      Self::If(_) => "if",
      Self::While { .. } => "while",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  pub statements: Vec<Stmt>,
}
