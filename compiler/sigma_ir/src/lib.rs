//! Sigma IR - syntax tree and identifier types for the Sigma runtime.
//!
//! This crate contains the data the evaluator consumes:
//! - `Name` for interned identifiers
//! - `StringInterner` / `SharedInterner` for thread-safe interning
//! - AST nodes (`Program`, `Stmt`, `Expr`, `BinaryOp`)
//!
//! The parser that produces these trees lives outside this workspace; hosts
//! and tests build them directly with the constructors on `Expr` and `Stmt`.
//!
//! # Design Philosophy
//!
//! - **Intern identifiers**: every variable, field and member name is a `Name(u32)`
//! - **Share bodies**: block bodies are `Arc<[Stmt]>` so closures can carry
//!   their body to worker threads without copying the tree

pub mod ast;
mod interner;
mod name;

pub use ast::{BinaryOp, Block, Expr, FieldDecl, IfStmt, Program, Stmt};
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use name::Name;
