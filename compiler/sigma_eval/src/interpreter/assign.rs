//! Assignment to names, struct fields and indexed elements.
//!
//! Every target goes through [`Interpreter::write_slot`]:
//! - a Reference slot writes through to the slot it aliases;
//! - a copy-kind slot receiving a value of the same kind is overwritten in
//!   place, so every alias of it observes the update;
//! - anything else is rebound to a copy of the new value.

use sigma_heap::Gc;
use sigma_ir::{Expr, Name};

use super::expr::checked_index;
use super::Interpreter;
use crate::environment::AssignError;
use crate::errors::{
    const_violation, invalid_assignment_target, invalid_set_value, not_an_object, not_indexable,
    undefined_variable, EvalError,
};
use crate::value::{self, Value};

enum SlotWrite {
    Through(Gc),
    InPlace,
    Rebind,
}

enum IndexTarget {
    Element(usize, Gc),
    Char(usize),
}

impl Interpreter {
    /// Write `value` into `slot`. Returns the handle the owner must rebind
    /// to, or `None` when the slot was updated in place.
    pub(crate) fn write_slot(&self, slot: Gc, value: Gc) -> Result<Option<Gc>, EvalError> {
        let mut heap = self.heap.lock();
        let write = {
            let current = heap.get(slot)?;
            let new = heap.get(value)?;
            match current {
                Value::Reference(target) if !matches!(new, Value::Reference(_)) => {
                    SlotWrite::Through(*target)
                }
                _ if current.is_copy() && current.same_kind(new) => SlotWrite::InPlace,
                _ => SlotWrite::Rebind,
            }
        };
        match write {
            SlotWrite::Through(target) => {
                let content = heap.get(value)?.clone();
                heap.replace(target, content)?;
                Ok(None)
            }
            SlotWrite::InPlace => {
                value::set_value(&mut heap, slot, value)?;
                Ok(None)
            }
            SlotWrite::Rebind => Ok(Some(value::bind_copy(&mut heap, value)?)),
        }
    }

    /// `name = value`.
    pub(crate) fn assign_name(&mut self, name: Name, value: Gc) -> Result<(), EvalError> {
        if let Some(receiver) = self.receiver_with_field(name)? {
            return self.store_field(receiver, name, value);
        }

        let binding = self
            .env
            .lookup(name)
            .ok_or_else(|| undefined_variable(self.name_str(name)))?;
        if binding.is_const {
            return Err(const_violation(self.name_str(name)));
        }
        if let Some(rebound) = self.write_slot(binding.value, value)? {
            self.env
                .reassign(name, rebound)
                .map_err(|err| match err {
                    AssignError::Const => const_violation(self.name_str(name)),
                    AssignError::Undefined => undefined_variable(self.name_str(name)),
                })?;
        }
        Ok(())
    }

    /// `target.path = value`.
    pub(crate) fn assign_member(
        &mut self,
        target: &Expr,
        path: &[Name],
        value: Gc,
    ) -> Result<(), EvalError> {
        let (field, prefix) = path
            .split_last()
            .ok_or_else(invalid_assignment_target)?;
        let object = self.eval_value(target, "member assignment")?;
        let owner = self.member_path(object, prefix)?;
        self.store_field(owner, *field, value)
    }

    /// `target[path] = value`.
    pub(crate) fn assign_index(
        &mut self,
        target: &Expr,
        path: &[Expr],
        value: Gc,
    ) -> Result<(), EvalError> {
        let (last, prefix) = path
            .split_last()
            .ok_or_else(invalid_assignment_target)?;
        let container = self.eval_value(target, "index assignment")?;
        let owner = self.index_path(container, prefix)?;
        let index = self.eval_index(last)?;
        self.store_element(owner, index, value)
    }

    /// Assign to any place expression; used by compound assignment and
    /// increments.
    pub(crate) fn assign_place(&mut self, target: &Expr, value: Gc) -> Result<(), EvalError> {
        match target {
            Expr::Ident(name) => self.assign_name(*name, value),
            Expr::Member { target, path } => self.assign_member(target, path, value),
            Expr::Index { target, path } => self.assign_index(target, path, value),
            _ => Err(invalid_assignment_target()),
        }
    }

    /// Store into field `name` of `object`, adding the field if absent.
    pub(crate) fn store_field(&self, object: Gc, name: Name, value: Gc) -> Result<(), EvalError> {
        let existing = self
            .with_value(object, |current| match current {
                Value::Struct(fields) => Ok(fields.get(&name).copied()),
                other => Err(other.type_name()),
            })?
            .map_err(not_an_object)?;

        let stored = match existing {
            Some(slot) => match self.write_slot(slot, value)? {
                Some(rebound) => rebound,
                None => return Ok(()),
            },
            None => self.bind_copy(value)?,
        };
        self.with_value_mut(object, |current| {
            if let Value::Struct(fields) = current {
                fields.insert(name, stored);
            }
        })
    }

    fn store_element(&self, owner: Gc, index: i64, value: Gc) -> Result<(), EvalError> {
        let target = self.with_value(owner, |current| match current {
            Value::Array(items) => {
                let slot = checked_index(index, items.len())?;
                Ok(IndexTarget::Element(slot, items[slot]))
            }
            Value::Str(s) => Ok(IndexTarget::Char(checked_index(index, s.chars().count())?)),
            other => Err(not_indexable(other.type_name())),
        })??;

        match target {
            IndexTarget::Element(slot, element) => {
                if let Some(rebound) = self.write_slot(element, value)? {
                    self.with_value_mut(owner, |current| {
                        if let Value::Array(items) = current {
                            if let Some(item) = items.get_mut(slot) {
                                *item = rebound;
                            }
                        }
                    })?;
                }
                Ok(())
            }
            IndexTarget::Char(slot) => {
                let replacement = self
                    .with_value(value, |new| match new {
                        Value::Str(s) => s.chars().next().ok_or("empty string"),
                        other => Err(other.type_name()),
                    })?
                    .map_err(|source| invalid_set_value("string character", source))?;
                self.with_value_mut(owner, |current| {
                    if let Value::Str(s) = current {
                        *s = s
                            .chars()
                            .enumerate()
                            .map(|(i, ch)| if i == slot { replacement } else { ch })
                            .collect();
                    }
                })
            }
        }
    }
}
