//! Crate-local error types and the composable-body failure boundary.
//!
//! `run_composable_body` is grounded on `compose-core`'s
//! `ErrorBoundary(fallback, content)`, which wraps `content()` in
//! `catch_unwind(AssertUnwindSafe(...))` and downcasts the panic payload
//! to a message. Here the boundary is a free function returning a
//! `Result` rather than a function that itself renders a fallback view
//! (there is no view type in this crate) — the caller (the renderer, in
//! `summon-html`) decides what a failed composable renders as.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("composable body panicked: {0}")]
    BodyPanicked(String),
    #[error("remember/register_effect called outside of any open composer scope")]
    NoOpenScope,
}

/// Runs `f`, catching any panic it raises and turning it into
/// `Err(ComposeError::BodyPanicked)` instead of unwinding past the
/// caller. Used around every top-level composable invocation so one
/// broken subtree cannot take down an entire render.
pub fn run_composable_body<R>(f: impl FnOnce() -> R) -> Result<R, ComposeError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        ComposeError::BodyPanicked(panic_message(&payload))
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    }
}

impl From<crate::composer::ScopeAbort> for ComposeError {
    fn from(abort: crate::composer::ScopeAbort) -> Self {
        match abort {
            crate::composer::ScopeAbort::Panicked(message) => ComposeError::BodyPanicked(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_body_passes_through() {
        let result = run_composable_body(|| 1 + 1);
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn panicking_body_is_contained() {
        let result = run_composable_body(|| -> i32 { panic!("boom") });
        match result {
            Err(ComposeError::BodyPanicked(msg)) => assert_eq!(msg, "boom"),
            other => panic!("expected BodyPanicked, got {other:?}"),
        }
    }
}
