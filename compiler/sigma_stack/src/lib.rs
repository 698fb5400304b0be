//! Stack growth for the tree-walking evaluator.
//!
//! Script code nests arbitrarily: deeply parenthesised expressions, long
//! `else if` chains and recursive closures all recurse on the native stack.
//! Worker threads also start with smaller stacks than the main thread.
//! Every recursive evaluation entry point goes through
//! [`ensure_sufficient_stack`], which moves onto a freshly allocated stack
//! segment when the current one runs low.
//!
//! On WASM the function is a passthrough; the host engine owns the stack.

/// Remaining stack below which a new segment is allocated (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn eval_expr(&mut self, expr: &Expr) -> EvalResult {
///     ensure_sufficient_stack(|| self.eval_expr_inner(expr))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM version - call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack space in bytes, when the platform can report it.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
    }

    #[test]
    fn passes_result_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn deep_recursion_on_main_thread() {
        assert_eq!(depth(200_000), 200_000);
    }

    #[test]
    fn deep_recursion_on_small_thread_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| depth(50_000));
        let result = handle.ok().and_then(|h| h.join().ok());
        assert_eq!(result, Some(50_000));
    }
}
