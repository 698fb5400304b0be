//! Evaluation errors.
//!
//! Every failure inside the evaluator, including failures raised by native
//! functions, is an [`EvalError`]. The error aborts the current top-level
//! evaluation and unwinds to the host; scripts cannot catch it.
//!
//! `EvalErrorKind` carries the structured category. Factory functions
//! (e.g. `undefined_variable()`) are the construction API and fill in both
//! `kind` and `message`.

use std::fmt;

use sigma_heap::{Gc, HeapError};
use sigma_ir::BinaryOp;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Lookup
    UndefinedVariable {
        name: String,
    },
    MemberNotFound {
        member: String,
    },
    NotAnObject {
        type_name: &'static str,
    },
    UnknownStruct {
        name: String,
    },
    IndexOutOfBounds {
        index: i64,
        len: usize,
    },
    NotIndexable {
        type_name: &'static str,
    },
    NonNumericIndex {
        type_name: &'static str,
    },

    // Type
    BinaryTypeMismatch {
        op: BinaryOp,
        left: &'static str,
        right: &'static str,
    },
    InvalidBinaryOp {
        op: BinaryOp,
        type_name: &'static str,
    },
    InvalidOperand {
        operation: &'static str,
        type_name: &'static str,
    },
    ModuloByZero,
    ShiftOutOfRange {
        amount: i32,
    },
    NotCallable {
        type_name: &'static str,
    },
    NonBooleanCondition {
        construct: &'static str,
    },
    WrongArgType {
        function: String,
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
    MissingArgument {
        function: String,
        index: usize,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NoValue {
        context: &'static str,
    },

    // Mutation
    ConstViolation {
        name: String,
    },
    InvalidSetValue {
        target: &'static str,
        source: &'static str,
    },
    InvalidAssignmentTarget,

    // Control flow
    InvalidControlFlow {
        signal: &'static str,
    },
    StackOverflow {
        depth: usize,
    },

    // Resources
    StaleHandle {
        handle: Gc,
    },
    CollectionInTask,
    Io {
        message: String,
    },
    Native {
        function: String,
        message: String,
    },

    /// Catch-all for host-raised errors without a category.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Lookup
            Self::UndefinedVariable { name } => write!(f, "variable {name} not found"),
            Self::MemberNotFound { member } => write!(f, "member {member} not found in an object"),
            Self::NotAnObject { type_name } => {
                write!(f, "operator . must be used on an object, got {type_name}")
            }
            Self::UnknownStruct { name } => write!(f, "no struct with name {name}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "out of bounds array index {index} (length {len})")
            }
            Self::NotIndexable { type_name } => {
                write!(f, "operator [] must be used on an array or string, got {type_name}")
            }
            Self::NonNumericIndex { type_name } => {
                write!(f, "operator [] expects a number, got {type_name}")
            }

            // Type
            Self::BinaryTypeMismatch { op, left, right } => write!(
                f,
                "binary operator `{}` not implemented for {left} and {right}",
                op.as_symbol()
            ),
            Self::InvalidBinaryOp { op, type_name } => write!(
                f,
                "operator `{}` cannot be applied to {type_name}",
                op.as_symbol()
            ),
            Self::InvalidOperand {
                operation,
                type_name,
            } => write!(f, "can't {operation} a non-number value ({type_name})"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::ShiftOutOfRange { amount } => {
                write!(f, "shift amount {amount} out of range 0..32")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::NonBooleanCondition { construct } => {
                write!(f, "{construct} expression must result in a boolean value")
            }
            Self::WrongArgType {
                function,
                index,
                expected,
                got,
            } => write!(
                f,
                "{function} expects argument {index} to be of type {expected}, got {got}"
            ),
            Self::MissingArgument { function, index } => {
                write!(f, "{function} is missing argument {index}")
            }
            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                write!(f, "{name} expects {expected} {arg_word}, got {got}")
            }
            Self::NoValue { context } => write!(f, "{context} produced no value"),

            // Mutation
            Self::ConstViolation { name } => {
                write!(f, "can't reinitialize {name}: variable is marked as const")
            }
            Self::InvalidSetValue { target, source } => {
                write!(f, "cannot overwrite a {target} value in place with a {source}")
            }
            Self::InvalidAssignmentTarget => write!(f, "invalid assignment target"),

            // Control flow
            Self::InvalidControlFlow { signal } => {
                write!(f, "`{signal}` used outside of an enclosing construct")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            // Resources
            Self::StaleHandle { handle } => {
                write!(f, "value {handle} was reclaimed by the collector")
            }
            Self::CollectionInTask => write!(f, "cannot sweep from inside a detached task"),
            Self::Io { message } => write!(f, "{message}"),
            Self::Native { function, message } => write!(f, "{function}: {message}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()` for factory-made errors.
    pub message: String,
}

impl EvalError {
    /// Create an uncategorized error from a message.
    ///
    /// Prefer a factory function when a structured kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError { kind, message }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

impl From<HeapError> for EvalError {
    fn from(err: HeapError) -> Self {
        match err {
            HeapError::StaleHandle(handle) => {
                EvalError::from_kind(EvalErrorKind::StaleHandle { handle })
            }
            HeapError::CollectionInMutator => EvalError::from_kind(EvalErrorKind::CollectionInTask),
        }
    }
}

// Lookup Errors

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn member_not_found(member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MemberNotFound {
        member: member.to_string(),
    })
}

#[cold]
pub fn not_an_object(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAnObject { type_name })
}

#[cold]
pub fn unknown_struct(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownStruct {
        name: name.to_string(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn not_indexable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIndexable { type_name })
}

#[cold]
pub fn non_numeric_index(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonNumericIndex { type_name })
}

// Type Errors

#[cold]
pub fn binary_type_mismatch(op: BinaryOp, left: &'static str, right: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch { op, left, right })
}

#[cold]
pub fn invalid_binary_op(op: BinaryOp, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp { op, type_name })
}

/// A numeric-only operation (`negate`, `increment`) applied to another kind.
#[cold]
pub fn invalid_operand(operation: &'static str, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperand {
        operation,
        type_name,
    })
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

#[cold]
pub fn shift_out_of_range(amount: i32) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ShiftOutOfRange { amount })
}

#[cold]
pub fn not_callable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

/// `construct` names the statement, e.g. "if statement".
#[cold]
pub fn non_boolean_condition(construct: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonBooleanCondition { construct })
}

#[cold]
pub fn wrong_arg_type(
    function: &str,
    index: usize,
    expected: &'static str,
    got: &'static str,
) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongArgType {
        function: function.to_string(),
        index,
        expected,
        got,
    })
}

#[cold]
pub fn missing_argument(function: &str, index: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        function: function.to_string(),
        index,
    })
}

#[cold]
pub fn wrong_arg_count(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn no_value(context: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoValue { context })
}

// Mutation Errors

#[cold]
pub fn const_violation(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstViolation {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_set_value(target: &'static str, source: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidSetValue { target, source })
}

#[cold]
pub fn invalid_assignment_target() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidAssignmentTarget)
}

// Control Flow Errors

#[cold]
pub fn invalid_control_flow(signal: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidControlFlow { signal })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Resource Errors

#[cold]
pub fn io_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Io {
        message: message.into(),
    })
}

#[cold]
pub fn file_not_found(path: &str) -> EvalError {
    io_error(format!("file {path} doesn't exist"))
}

#[cold]
pub fn native_error(function: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Native {
        function: function.to_string(),
        message: message.into(),
    })
}
