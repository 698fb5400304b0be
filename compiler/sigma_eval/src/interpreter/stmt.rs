//! Statement execution: declarations, assignments, conditionals and loops.

use std::sync::Arc;

use sigma_ir::{Expr, IfStmt, Stmt};
use sigma_stack::ensure_sufficient_stack;

use super::{ControlSignal, ExecResult, Interpreter};
use crate::errors::{invalid_control_flow, non_boolean_condition, EvalError};
use crate::value::Value;

impl Interpreter {
    /// Execute `block` in the current frame, stopping at the first signal.
    pub(crate) fn exec_block(&mut self, block: &[Stmt]) -> ExecResult {
        for stmt in block {
            if let Some(signal) = self.exec_stmt(stmt)? {
                return Ok(Some(signal));
            }
        }
        Ok(None)
    }

    /// Execute `block` in a fresh child frame.
    pub(crate) fn exec_scoped_block(&mut self, block: &[Stmt]) -> ExecResult {
        self.with_env_scope(|scoped| scoped.exec_block(block))
    }

    /// Execute one statement. Temporaries it roots are released when it
    /// finishes.
    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        ensure_sufficient_stack(|| self.holding(|interp| interp.exec_stmt_inner(stmt)))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> ExecResult {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval_expr(expr)?;
            }
            Stmt::VarDecl {
                name,
                value,
                is_const,
            } => {
                let value = self.eval_value(value, "variable initializer")?;
                let bound = self.bind_copy(value)?;
                self.env.declare(*name, bound, *is_const);
            }
            Stmt::Assign { target, value } => {
                let value = self.eval_value(value, "assignment")?;
                self.assign_name(*target, value)?;
            }
            Stmt::MemberAssign {
                target,
                path,
                value,
            } => {
                let value = self.eval_value(value, "assignment")?;
                self.assign_member(target, path, value)?;
            }
            Stmt::IndexAssign {
                target,
                path,
                value,
            } => {
                let value = self.eval_value(value, "assignment")?;
                self.assign_index(target, path, value)?;
            }
            Stmt::CompoundAssign { target, op, value } => {
                let current = self.eval_value(target, "compound assignment")?;
                let operand = self.eval_value(value, "compound assignment")?;
                let result = self.binary_values(current, operand, *op)?;
                self.hold(result);
                self.assign_place(target, result)?;
            }
            Stmt::If(if_stmt) => return self.exec_if(if_stmt),
            Stmt::While { cond, body } => return self.exec_while(cond, body),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => return self.exec_for(init.as_deref(), cond, step.as_deref(), body),
            Stmt::Break => return Ok(Some(ControlSignal::Break)),
            Stmt::Continue => return Ok(Some(ControlSignal::Continue)),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => None,
                };
                return Ok(Some(ControlSignal::Return(value)));
            }
            Stmt::StructDecl { name, fields } => {
                self.structs
                    .write()
                    .register(*name, Arc::from(fields.as_slice()));
            }
        }
        Ok(None)
    }

    /// Evaluate a loop or branch condition, which must be a bool.
    pub(crate) fn eval_condition(
        &mut self,
        cond: &Expr,
        construct: &'static str,
    ) -> Result<bool, EvalError> {
        self.holding(|interp| {
            let Some(gc) = interp.eval_expr(cond)? else {
                return Err(non_boolean_condition(construct));
            };
            interp
                .with_value(gc, Value::as_bool)?
                .ok_or_else(|| non_boolean_condition(construct))
        })
    }

    fn exec_if(&mut self, stmt: &IfStmt) -> ExecResult {
        if self.eval_condition(&stmt.cond, "if statement")? {
            return self.exec_scoped_block(&stmt.then_branch);
        }
        for (cond, body) in &stmt.else_ifs {
            if self.eval_condition(cond, "elseif statement")? {
                return self.exec_scoped_block(body);
            }
        }
        match &stmt.else_branch {
            Some(body) => self.exec_scoped_block(body),
            None => Ok(None),
        }
    }

    /// `while`: one body frame, cleared after every iteration.
    fn exec_while(&mut self, cond: &Expr, body: &[Stmt]) -> ExecResult {
        self.with_env_scope(|scoped| {
            while scoped.eval_condition(cond, "while statement")? {
                let signal = scoped.exec_block(body);
                scoped.env.clear_current();
                match signal? {
                    None | Some(ControlSignal::Continue) => {}
                    Some(ControlSignal::Break) => break,
                    Some(ret @ ControlSignal::Return(_)) => return Ok(Some(ret)),
                }
            }
            Ok(None)
        })
    }

    /// `for`: `init` runs in an outer frame that lives for the whole loop;
    /// the body frame is cleared after every iteration, before `step`.
    fn exec_for(
        &mut self,
        init: Option<&Stmt>,
        cond: &Expr,
        step: Option<&Stmt>,
        body: &[Stmt],
    ) -> ExecResult {
        self.with_env_scope(|outer| {
            if let Some(init) = init {
                reject_signal(outer.exec_stmt(init)?)?;
            }
            outer.with_env_scope(|scoped| {
                while scoped.eval_condition(cond, "for statement")? {
                    let signal = scoped.exec_block(body);
                    scoped.env.clear_current();
                    match signal? {
                        None | Some(ControlSignal::Continue) => {}
                        Some(ControlSignal::Break) => break,
                        Some(ret @ ControlSignal::Return(_)) => return Ok(Some(ret)),
                    }
                    if let Some(step) = step {
                        reject_signal(scoped.exec_stmt(step)?)?;
                        scoped.env.clear_current();
                    }
                }
                Ok(None)
            })
        })
    }
}

/// `init`/`step` clauses cannot leave the loop.
fn reject_signal(signal: Option<ControlSignal>) -> Result<(), EvalError> {
    match signal {
        None => Ok(()),
        Some(signal) => Err(invalid_control_flow(signal.keyword())),
    }
}
