//! The context registry (C5): a stack of `(TypeId, value)` frames scoped
//! to the current thread/task, replacing any notion of a global mutable
//! singleton.
//!
//! Grounded on `locals.rs`'s `LOCALS_STACK` thread-local and its
//! `with_locals_frame` push/pop-guard pattern, generalized from a fixed
//! set of theming locals (`Theme`, `Density`, `UiScale`, ...) — a
//! Non-goal here — to an arbitrary `provide::<T>`/`current::<T>()` pair
//! any caller can use for any `'static` type, which is what a generic
//! composition-local context needs to be. `summon-html`'s renderer
//! installs itself into this registry so nested composables can reach
//! "the renderer for this render" without a parameter threaded through
//! every call.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

thread_local! {
    static FRAMES: RefCell<Vec<HashMap<TypeId, Rc<dyn Any>>>> = RefCell::new(Vec::new());
}

struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

fn push_frame() -> FrameGuard {
    FRAMES.with(|frames| frames.borrow_mut().push(HashMap::new()));
    FrameGuard
}

fn set_in_top_frame(type_id: TypeId, value: Rc<dyn Any>) {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        match frames.last_mut() {
            Some(top) => {
                top.insert(type_id, value);
            }
            None => {
                let mut frame = HashMap::new();
                frame.insert(type_id, value);
                frames.push(frame);
            }
        }
    });
}

/// Runs `f` with `value` visible to [`current`] for the duration of the
/// call, for this thread/task only. Shadows (does not replace) any
/// outer value of the same type: once `f` returns, the previous value
/// (if any) is visible again.
pub fn provide<T: 'static, R>(value: T, f: impl FnOnce() -> R) -> R {
    let _guard = push_frame();
    set_in_top_frame(TypeId::of::<T>(), Rc::new(value));
    f()
}

/// Returns the innermost value of type `T` provided by an enclosing
/// [`provide`] call on this thread/task, or `None` if there is none.
pub fn current<T: Clone + 'static>() -> Option<T> {
    FRAMES.with(|frames| {
        for frame in frames.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>())
                && let Some(t) = v.downcast_ref::<T>()
            {
                return Some(t.clone());
            }
        }
        None
    })
}

/// Returns the innermost `Rc<T>` without cloning `T` itself. Useful when
/// `T` is expensive to clone or intentionally shared (e.g. a renderer
/// handle).
pub fn current_rc<T: 'static>() -> Option<Rc<T>> {
    FRAMES.with(|frames| {
        for frame in frames.borrow().iter().rev() {
            if let Some(v) = frame.get(&TypeId::of::<T>()) {
                let v = v.clone();
                if let Ok(t) = v.downcast::<T>() {
                    return Some(t);
                }
            }
        }
        None
    })
}

/// Runs `f` with an `Rc<T>` visible to [`current_rc`]/[`current`] (via a
/// clone of `*value`, when `T: Clone`) for the duration of the call.
pub fn provide_rc<T: 'static, R>(value: Rc<T>, f: impl FnOnce() -> R) -> R {
    let _guard = push_frame();
    set_in_top_frame(TypeId::of::<T>(), value);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_by_default() {
        assert_eq!(current::<i32>(), None);
    }

    #[test]
    fn provide_is_visible_inside_and_gone_outside() {
        assert_eq!(current::<i32>(), None);
        let seen = provide(7i32, || current::<i32>());
        assert_eq!(seen, Some(7));
        assert_eq!(current::<i32>(), None);
    }

    #[test]
    fn nested_provide_shadows_then_restores() {
        provide("outer".to_string(), || {
            assert_eq!(current::<String>(), Some("outer".to_string()));
            provide("inner".to_string(), || {
                assert_eq!(current::<String>(), Some("inner".to_string()));
            });
            assert_eq!(current::<String>(), Some("outer".to_string()));
        });
    }

    #[test]
    fn distinct_types_do_not_collide() {
        provide(1i32, || {
            provide("x".to_string(), || {
                assert_eq!(current::<i32>(), Some(1));
                assert_eq!(current::<String>(), Some("x".to_string()));
            });
        });
    }
}
