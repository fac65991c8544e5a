//! Code generation: lower the parsed AST into C-family source text.
//!
//! The emitter is a plain recursive walk that appends to one output buffer.
//! Every node kind has exactly one rule, and nothing is carried from one
//! subtree to the next. Binary expressions are always fully parenthesised, so
//! the grouping the parser chose survives regardless of the target's own
//! precedence rules.

use crate::ast::{Block, Call, Expr, IfChain, Program, Stmt};

/// Emit the program, one top-level statement per line.
pub fn emit(program: &Program) -> String {
  let mut out = String::new();
  emit_stmts(&program.statements, &mut out);
  out
}

fn emit_stmts(stmts: &[Stmt], out: &mut String) {
  for (i, stmt) in stmts.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    emit_stmt(stmt, out);
  }
}

fn emit_stmt(stmt: &Stmt, out: &mut String) {
  match stmt {
    Stmt::Assignment { target, value } => {
      out.push_str(target);
      out.push_str(" = ");
      emit_expr(value, out);
      out.push(';');
    }
    Stmt::Return(value) => {
      out.push_str("return ");
      emit_expr(value, out);
      out.push(';');
    }
    Stmt::Call(call) => {
      emit_call(call, out);
      out.push(';');
    }
    Stmt::FunctionDef(def) => {
      out.push_str("function ");
      out.push_str(&def.name);
      out.push('(');
      out.push_str(&def.params.join(", "));
      out.push_str(") ");
      emit_block(&def.body, out);
    }
    Stmt::If(chain) => emit_if(chain, out),
    Stmt::While { condition, body } => {
      out.push_str("while ");
      emit_condition(condition, out);
      out.push(' ');
      emit_block(body, out);
    }
  }
}

/// `if (..) {..}`, then every `elif` in order as `else if`, then `else`.
fn emit_if(chain: &IfChain, out: &mut String) {
  out.push_str("if ");
  emit_condition(&chain.condition, out);
  out.push(' ');
  emit_block(&chain.then_block, out);

  for clause in &chain.elif_clauses {
    out.push_str(" else if ");
    emit_condition(&clause.condition, out);
    out.push(' ');
    emit_block(&clause.block, out);
  }

  if let Some(block) = &chain.else_block {
    out.push_str(" else ");
    emit_block(block, out);
  }
}

fn emit_condition(condition: &Expr, out: &mut String) {
  out.push('(');
  emit_expr(condition, out);
  out.push(')');
}

fn emit_block(block: &Block, out: &mut String) {
  if block.statements.is_empty() {
    out.push_str("{ }");
    return;
  }
  out.push_str("{ ");
  emit_stmts(&block.statements, out);
  out.push_str(" }");
}

fn emit_call(call: &Call, out: &mut String) {
  out.push_str(&call.callee);
  out.push('(');
  for (i, arg) in call.args.iter().enumerate() {
    if i > 0 {
      out.push_str(", ");
    }
    emit_expr(arg, out);
  }
  out.push(')');
}

fn emit_expr(expr: &Expr, out: &mut String) {
  match expr {
    Expr::Literal(digits) => out.push_str(digits),
    Expr::Variable(name) => out.push_str(name),
    Expr::Call(call) => emit_call(call, out),
    Expr::Binary { lhs, op, rhs } => {
      out.push('(');
      emit_expr(lhs, out);
      out.push(' ');
      out.push_str(op.as_str());
      out.push(' ');
      emit_expr(rhs, out);
      out.push(')');
    }
  }
}
