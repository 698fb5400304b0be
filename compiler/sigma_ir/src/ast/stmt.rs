//! Statement nodes.

use super::{BinaryOp, Block, Expr};
use crate::Name;

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// An expression evaluated for its effect (or as the program result).
    Expr(Expr),
    /// `var name = value;` / `const name = value;`
    VarDecl {
        name: Name,
        value: Expr,
        is_const: bool,
    },
    /// `name = value;`
    Assign { target: Name, value: Expr },
    /// `target.a.b = value;`
    MemberAssign {
        target: Expr,
        path: Vec<Name>,
        value: Expr,
    },
    /// `target[i][j] = value;`
    IndexAssign {
        target: Expr,
        path: Vec<Expr>,
        value: Expr,
    },
    /// `place op= value;` where `place` is an identifier, member or index expression.
    CompoundAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    If(IfStmt),
    While { cond: Expr, body: Block },
    /// `for (init; cond; step;) { body }`
    For {
        init: Option<Box<Stmt>>,
        cond: Expr,
        step: Option<Box<Stmt>>,
        body: Block,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    /// `struct Name { field, field = default, ... }`
    StructDecl { name: Name, fields: Vec<FieldDecl> },
}

/// `if`/`else if`/`else` chain.
#[derive(Clone, Debug, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_branch: Block,
    pub else_ifs: Vec<(Expr, Block)>,
    pub else_branch: Option<Block>,
}

/// A struct field declaration with an optional default expression.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub name: Name,
    pub default: Option<Expr>,
}

impl Stmt {
    pub fn var(name: Name, value: Expr) -> Self {
        Stmt::VarDecl {
            name,
            value,
            is_const: false,
        }
    }

    pub fn constant(name: Name, value: Expr) -> Self {
        Stmt::VarDecl {
            name,
            value,
            is_const: true,
        }
    }

    pub fn assign(target: Name, value: Expr) -> Self {
        Stmt::Assign { target, value }
    }

    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn ret(value: Expr) -> Self {
        Stmt::Return(Some(value))
    }

    pub fn if_then(cond: Expr, then_branch: Vec<Stmt>) -> Self {
        Stmt::If(IfStmt {
            cond,
            then_branch: then_branch.into(),
            else_ifs: Vec::new(),
            else_branch: None,
        })
    }

    pub fn while_loop(cond: Expr, body: Vec<Stmt>) -> Self {
        Stmt::While {
            cond,
            body: body.into(),
        }
    }

    pub fn for_loop(init: Stmt, cond: Expr, step: Stmt, body: Vec<Stmt>) -> Self {
        Stmt::For {
            init: Some(Box::new(init)),
            cond,
            step: Some(Box::new(step)),
            body: body.into(),
        }
    }
}

impl IfStmt {
    #[must_use]
    pub fn else_if(mut self, cond: Expr, body: Vec<Stmt>) -> Self {
        self.else_ifs.push((cond, body.into()));
        self
    }

    #[must_use]
    pub fn otherwise(mut self, body: Vec<Stmt>) -> Self {
        self.else_branch = Some(body.into());
        self
    }
}

impl FieldDecl {
    pub fn new(name: Name) -> Self {
        FieldDecl {
            name,
            default: None,
        }
    }

    pub fn with_default(name: Name, default: Expr) -> Self {
        FieldDecl {
            name,
            default: Some(default),
        }
    }
}
