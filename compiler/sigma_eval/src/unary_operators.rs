//! Numeric-only unary operations: negation and increment.

use crate::errors::{invalid_operand, EvalError};
use crate::value::Value;

/// `-value`. Only numbers negate.
pub fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        other => Err(invalid_operand("negate", other.type_name())),
    }
}

/// `value + amount`, the desugared form of `++` and `--`.
pub fn increment(value: &Value, amount: f64) -> Result<Value, EvalError> {
    match value {
        Value::Number(n) => Ok(Value::Number(n + amount)),
        other => Err(invalid_operand("increment", other.type_name())),
    }
}
