//! Syntax tree consumed by the evaluator.
//!
//! The tree is boxed rather than arena-flattened: closures keep their body
//! alive after the program that defined them is gone, and detached closures
//! carry it to worker threads. Block bodies are therefore `Arc<[Stmt]>`,
//! which is cheap to clone and `Send + Sync`.

mod expr;
mod operators;
mod stmt;

use std::sync::Arc;

pub use expr::Expr;
pub use operators::BinaryOp;
pub use stmt::{FieldDecl, IfStmt, Stmt};

/// A shared statement list: function bodies, loop bodies, branches.
pub type Block = Arc<[Stmt]>;

/// A complete program: the root of every evaluation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Program { stmts }
    }
}

impl FromIterator<Stmt> for Program {
    fn from_iter<I: IntoIterator<Item = Stmt>>(iter: I) -> Self {
        Program {
            stmts: iter.into_iter().collect(),
        }
    }
}
