//! Stack growth for the recursive parts of the pipeline.
//!
//! Parsing and evaluation recurse once per nesting level of the source (and
//! evaluation once more per function call), so deep but valid input can run
//! past the thread's stack. Wrapping those recursive entry points in
//! [`ensure_sufficient_stack`] moves execution onto a freshly allocated
//! segment whenever the remaining stack drops below the red zone.

/// Below this much remaining stack, a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
