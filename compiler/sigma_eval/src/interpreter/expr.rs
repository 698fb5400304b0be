//! Expression evaluation.

use sigma_heap::Gc;
use sigma_ir::{BinaryOp, Expr, Name};
use sigma_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::errors::{
    index_out_of_bounds, member_not_found, no_value, non_numeric_index, not_an_object,
    not_indexable, undefined_variable, unknown_struct, wrong_arg_count, EvalError,
};
use crate::operators::evaluate_binary;
use crate::unary_operators::{increment, negate};
use crate::value::{ClosureValue, Fields, Value};
use crate::EvalResult;

impl Interpreter {
    /// Evaluate an expression. Calls to functions that return nothing
    /// produce `Ok(None)`.
    ///
    /// The result stays rooted until the enclosing statement finishes.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
        let result = ensure_sufficient_stack(|| self.eval_expr_inner(expr))?;
        self.temporaries.extend(result);
        Ok(result)
    }

    /// Evaluate an expression that must produce a value.
    pub(crate) fn eval_value(
        &mut self,
        expr: &Expr,
        context: &'static str,
    ) -> Result<Gc, EvalError> {
        self.eval_expr(expr)?.ok_or_else(|| no_value(context))
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> EvalResult {
        let gc = match expr {
            Expr::Number(n) => self.alloc(Value::Number(*n)),
            Expr::Str(s) => self.alloc(Value::Str(s.clone())),
            Expr::Bool(b) => self.alloc(Value::Bool(*b)),
            Expr::Ident(name) => self.lookup_name(*name)?,
            Expr::Binary { op, left, right } => {
                let left = self.eval_value(left, "left operand")?;
                let right = self.eval_value(right, "right operand")?;
                self.binary_values(left, right, *op)?
            }
            Expr::Negate(operand) => {
                let operand = self.eval_value(operand, "negation")?;
                let negated = self.with_value(operand, negate)??;
                self.alloc(negated)
            }
            Expr::Call { callee, args } => return self.eval_call(callee, args),
            Expr::Member { target, path } => {
                let target = self.eval_value(target, "member access")?;
                self.member_path(target, path)?
            }
            Expr::Index { target, path } => {
                let target = self.eval_value(target, "index access")?;
                self.index_path(target, path)?
            }
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    let element = self.eval_value(element, "array element")?;
                    let copy = self.bind_copy(element)?;
                    items.push(self.hold(copy));
                }
                self.alloc(Value::Array(items))
            }
            Expr::Closure { params, body } => self.alloc(Value::Closure(ClosureValue {
                params: params.clone(),
                body: body.clone(),
                captured: self.env.snapshot(),
            })),
            Expr::StructLit { name, args } => self.construct_struct(*name, args)?,
            Expr::Object(entries) => {
                let mut fields = Fields::default();
                for (name, value) in entries {
                    let value = self.eval_value(value, "object field")?;
                    let copy = self.bind_copy(value)?;
                    fields.insert(*name, self.hold(copy));
                }
                self.alloc(Value::Struct(fields))
            }
            Expr::Increment { target, amount } => {
                let current = self.eval_value(target, "increment")?;
                let updated = self.with_value(current, |value| increment(value, *amount))??;
                let updated = self.alloc(updated);
                self.hold(updated);
                self.assign_place(target, updated)?;
                updated
            }
        };
        Ok(Some(gc))
    }

    /// Resolve an identifier. Fields of the implicit `this` receiver win
    /// over scope bindings.
    fn lookup_name(&self, name: Name) -> Result<Gc, EvalError> {
        if let Some(receiver) = self.receiver_with_field(name)? {
            return self.field(receiver, name);
        }
        self.env
            .lookup(name)
            .map(|binding| binding.value)
            .ok_or_else(|| undefined_variable(self.name_str(name)))
    }

    /// The bound `this`, if it is a struct that has a field `name`.
    pub(crate) fn receiver_with_field(&self, name: Name) -> Result<Option<Gc>, EvalError> {
        if name == Name::THIS {
            return Ok(None);
        }
        let Some(this) = self.env.lookup(Name::THIS) else {
            return Ok(None);
        };
        let has_field = self.with_value(this.value, |value| match value {
            Value::Struct(fields) => fields.contains_key(&name),
            _ => false,
        })?;
        Ok(has_field.then_some(this.value))
    }

    /// Apply `op` to two arena values and allocate the result.
    pub(crate) fn binary_values(
        &self,
        left: Gc,
        right: Gc,
        op: BinaryOp,
    ) -> Result<Gc, EvalError> {
        let result = {
            let heap = self.heap.lock();
            evaluate_binary(heap.get(left)?, heap.get(right)?, op)?
        };
        Ok(self.alloc(result))
    }

    /// Field `name` of the struct behind `target`.
    pub(crate) fn field(&self, target: Gc, name: Name) -> Result<Gc, EvalError> {
        let found = self.with_value(target, |value| match value {
            Value::Struct(fields) => Ok(fields.get(&name).copied()),
            other => Err(other.type_name()),
        })?;
        match found {
            Ok(Some(field)) => Ok(field),
            Ok(None) => Err(member_not_found(self.name_str(name))),
            Err(type_name) => Err(not_an_object(type_name)),
        }
    }

    pub(crate) fn member_path(&self, target: Gc, path: &[Name]) -> Result<Gc, EvalError> {
        path.iter()
            .try_fold(target, |current, name| self.field(current, *name))
    }

    pub(crate) fn index_path(&mut self, target: Gc, path: &[Expr]) -> Result<Gc, EvalError> {
        let mut current = target;
        for index in path {
            let index = self.eval_index(index)?;
            current = self.element(current, index)?;
            self.hold(current);
        }
        Ok(current)
    }

    /// Evaluate an index expression and truncate it toward zero. NaN and
    /// infinities are rejected.
    pub(crate) fn eval_index(&mut self, expr: &Expr) -> Result<i64, EvalError> {
        let index = self.eval_value(expr, "index")?;
        let number = self
            .with_value(index, |value| value.as_number().ok_or(value.type_name()))?
            .map_err(non_numeric_index)?;
        if number.is_nan() {
            return Err(non_numeric_index("NaN"));
        }
        if number.is_infinite() {
            return Err(non_numeric_index("infinite number"));
        }
        Ok(truncate_index(number))
    }

    /// Element `index` of an array, or a fresh one-character string for
    /// string targets.
    fn element(&self, target: Gc, index: i64) -> Result<Gc, EvalError> {
        let found = self.with_value(target, |value| match value {
            Value::Array(items) => {
                let slot = checked_index(index, items.len())?;
                Ok(Indexed::Slot(items[slot]))
            }
            Value::Str(s) => {
                let len = s.chars().count();
                let slot = checked_index(index, len)?;
                s.chars()
                    .nth(slot)
                    .map(Indexed::Char)
                    .ok_or_else(|| index_out_of_bounds(index, len))
            }
            other => Err(not_indexable(other.type_name())),
        })??;
        Ok(match found {
            Indexed::Slot(element) => element,
            Indexed::Char(ch) => self.alloc(Value::Str(ch.to_string())),
        })
    }

    /// Instantiate a declared struct: positional arguments first, then
    /// each remaining field's default, in declaration order.
    fn construct_struct(&mut self, name: Name, args: &[Expr]) -> Result<Gc, EvalError> {
        let decl = self.structs.read().get(name);
        let decl = decl.ok_or_else(|| unknown_struct(self.name_str(name)))?;
        if args.len() > decl.len() {
            return Err(wrong_arg_count(self.name_str(name), decl.len(), args.len()));
        }

        let mut fields = Fields::default();
        for (field, arg) in decl.iter().zip(args) {
            let value = self.eval_value(arg, "struct field")?;
            let copy = self.bind_copy(value)?;
            fields.insert(field.name, self.hold(copy));
        }
        for field in decl.iter().skip(args.len()) {
            let value = match &field.default {
                Some(default) => {
                    let value = self.eval_value(default, "field default")?;
                    self.bind_copy(value)?
                }
                None => self.alloc(Value::Number(0.0)),
            };
            fields.insert(field.name, self.hold(value));
        }
        Ok(self.alloc(Value::Struct(fields)))
    }
}

enum Indexed {
    Slot(Gc),
    Char(char),
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "indices truncate toward zero and saturate"
)]
fn truncate_index(n: f64) -> i64 {
    n as i64
}

/// `index` as a slot in `0..len`.
pub(crate) fn checked_index(index: i64, len: usize) -> Result<usize, EvalError> {
    usize::try_from(index)
        .ok()
        .filter(|slot| *slot < len)
        .ok_or_else(|| index_out_of_bounds(index, len))
}
