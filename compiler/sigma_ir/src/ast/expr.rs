//! Expression nodes.

use std::sync::Arc;

use super::{BinaryOp, Block};
use crate::Name;

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal: `42`, `3.5`
    Number(f64),
    /// String literal: `"text"`
    Str(String),
    /// Boolean literal: `true`, `false`
    Bool(bool),
    /// Variable reference.
    Ident(Name),
    /// `left op right`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `-operand`
    Negate(Box<Expr>),
    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `target.a.b` (path is never empty)
    Member { target: Box<Expr>, path: Vec<Name> },
    /// `target[i][j]` (path is never empty)
    Index { target: Box<Expr>, path: Vec<Expr> },
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `(params) => { body }`
    Closure { params: Arc<[Name]>, body: Block },
    /// `Name(args...)` for a declared struct.
    StructLit { name: Name, args: Vec<Expr> },
    /// `{ field: value, ... }`
    Object(Vec<(Name, Expr)>),
    /// `target++` / `target--`, yielding the updated value.
    Increment { target: Box<Expr>, amount: f64 },
}

impl Expr {
    pub fn ident(name: Name) -> Self {
        Expr::Ident(name)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::Str(text.into())
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(operand: Expr) -> Self {
        Expr::Negate(Box::new(operand))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// `target.path[0].path[1]...`
    pub fn member(target: Expr, path: impl Into<Vec<Name>>) -> Self {
        Expr::Member {
            target: Box::new(target),
            path: path.into(),
        }
    }

    /// Member call: `target.method(args...)`.
    pub fn method_call(target: Expr, method: Name, args: Vec<Expr>) -> Self {
        Expr::call(Expr::member(target, vec![method]), args)
    }

    pub fn index(target: Expr, path: Vec<Expr>) -> Self {
        Expr::Index {
            target: Box::new(target),
            path,
        }
    }

    pub fn closure(params: impl Into<Arc<[Name]>>, body: Vec<super::Stmt>) -> Self {
        Expr::Closure {
            params: params.into(),
            body: body.into(),
        }
    }

    pub fn struct_lit(name: Name, args: Vec<Expr>) -> Self {
        Expr::StructLit { name, args }
    }

    pub fn increment(target: Expr) -> Self {
        Expr::Increment {
            target: Box::new(target),
            amount: 1.0,
        }
    }

    pub fn decrement(target: Expr) -> Self {
        Expr::Increment {
            target: Box::new(target),
            amount: -1.0,
        }
    }

    /// Whether this expression denotes a storage location.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            Expr::Ident(_) | Expr::Member { .. } | Expr::Index { .. }
        )
    }
}
