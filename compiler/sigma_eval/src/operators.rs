//! Binary operator implementations.
//!
//! Dispatch is a direct match on the operand kinds. Only three pairs are
//! defined (number/number, bool/bool, string/string); every other pair is
//! a type mismatch.

use std::cmp::Ordering;

use sigma_ir::BinaryOp;

use crate::errors::{
    binary_type_mismatch, invalid_binary_op, modulo_by_zero, shift_out_of_range, EvalError,
};
use crate::value::Value;

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => eval_number_binary(*a, *b, op),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(*a, *b, op),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(a, b, op),
        _ => Err(binary_type_mismatch(
            op,
            left.type_name(),
            right.type_name(),
        )),
    }
}

/// Truncate toward zero to a 32-bit integer. Out-of-range values saturate.
#[inline]
#[allow(clippy::cast_possible_truncation, reason = "truncation is the operator semantics")]
fn truncate(n: f64) -> i32 {
    n as i32
}

/// Integer operators shared by numbers and booleans.
fn eval_integer_binary(a: i32, b: i32, op: BinaryOp) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOp::Mod => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            a.wrapping_rem(b)
        }
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::Shl | BinaryOp::Shr => {
            let amount = u32::try_from(b)
                .ok()
                .filter(|amount| *amount < 32)
                .ok_or_else(|| shift_out_of_range(b))?;
            if op == BinaryOp::Shl {
                a << amount
            } else {
                a >> amount
            }
        }
        _ => return Err(invalid_binary_op(op, "number")),
    };
    Ok(Value::Number(f64::from(result)))
}

fn compare(ordering: Option<Ordering>, op: BinaryOp) -> bool {
    match op {
        BinaryOp::Eq => ordering == Some(Ordering::Equal),
        BinaryOp::NotEq => ordering != Some(Ordering::Equal),
        BinaryOp::Lt => ordering == Some(Ordering::Less),
        BinaryOp::LtEq => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt => ordering == Some(Ordering::Greater),
        BinaryOp::GtEq => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => false,
    }
}

/// IEEE arithmetic, integer bit operations, comparisons.
fn eval_number_binary(a: f64, b: f64, op: BinaryOp) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => Ok(Value::Number(a + b)),
        BinaryOp::Sub => Ok(Value::Number(a - b)),
        BinaryOp::Mul => Ok(Value::Number(a * b)),
        BinaryOp::Div => Ok(Value::Number(a / b)),
        op if op.truncates_operands() => eval_integer_binary(truncate(a), truncate(b), op),
        op if op.is_comparison() => Ok(Value::Bool(compare(a.partial_cmp(&b), op))),
        _ => Err(invalid_binary_op(op, "number")),
    }
}

/// Booleans compare as `false < true`; bit operators treat them as 0 and 1.
fn eval_bool_binary(a: bool, b: bool, op: BinaryOp) -> Result<Value, EvalError> {
    match op {
        BinaryOp::And => Ok(Value::Bool(a && b)),
        BinaryOp::Or => Ok(Value::Bool(a || b)),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::Shl | BinaryOp::Shr => {
            eval_integer_binary(i32::from(a), i32::from(b), op)
        }
        op if op.is_comparison() => Ok(Value::Bool(compare(Some(a.cmp(&b)), op))),
        _ => Err(invalid_binary_op(op, "bool")),
    }
}

/// Concatenation and lexicographic comparison.
fn eval_string_binary(a: &str, b: &str, op: BinaryOp) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::Str(joined))
        }
        op if op.is_comparison() => Ok(Value::Bool(compare(Some(a.cmp(b)), op))),
        _ => Err(invalid_binary_op(op, "string")),
    }
}
