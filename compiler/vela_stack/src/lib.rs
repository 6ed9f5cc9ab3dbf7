//! Stack growth for the recursive phases.
//!
//! The parser, planner and compiler all recurse over the syntax tree, and
//! generated closures recurse over nested expressions at run time. A
//! script nesting a few thousand parentheses would overflow a default
//! thread stack, so each recursive entry point runs inside
//! [`ensure_sufficient_stack`].

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { 1 + nest(depth - 1) })
    }

    #[test]
    fn deep_recursion_completes() {
        assert_eq!(nest(200_000), 200_000);
    }
}
