//! State cells (C1): the reactive primitive composables read and write.
//!
//! A cell remembers which scopes read it since its last write (its
//! "readers"). Writing a structurally-equal value is a no-op: no readers
//! are invalidated and no recomposition is scheduled. Writing a changed
//! value snapshots the reader set, clears it, and hands the snapshot to
//! the recomposer's invalidation queue — readers are re-registered the
//! next time (if ever) their scope re-reads the cell during recomposition.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::recomposer;
use crate::scope::{current_scope_id, ScopeId};

struct Inner<T> {
    value: T,
    readers: HashSet<ScopeId>,
}

/// A mutable, reactive cell of `T`.
///
/// Cloning an `S<T>` clones the handle, not the value — all clones share
/// the same underlying cell, matching the teacher's `Signal<T>` handle
/// semantics.
pub struct S<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for S<T> {
    fn clone(&self) -> Self {
        S {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> S<T> {
    fn new(value: T) -> Self {
        S {
            inner: Rc::new(RefCell::new(Inner {
                value,
                readers: HashSet::new(),
            })),
        }
    }

    /// Reads the current value, registering the calling scope as a
    /// reader. Outside any scope (e.g. called from plain Rust code) the
    /// read is untracked: nobody is invalidated because nobody is
    /// listening.
    pub fn read(&self) -> T
    where
        T: Clone,
    {
        if let Some(id) = current_scope_id() {
            self.inner.borrow_mut().readers.insert(id);
        }
        self.inner.borrow().value.clone()
    }

    /// Reads the current value without registering a reader. Useful for
    /// diagnostics or one-shot snapshots that should not subscribe to
    /// future invalidations.
    pub fn peek(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().value.clone()
    }

    /// Writes `next`. If `next` is structurally equal to the current
    /// value (`PartialEq`), this is a complete no-op: no reader is
    /// touched and no recomposition is scheduled.
    pub fn write(&self, next: T)
    where
        T: PartialEq,
    {
        let readers = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == next {
                return;
            }
            inner.value = next;
            std::mem::take(&mut inner.readers)
        };
        for reader in readers {
            recomposer::invalidate(reader);
        }
    }

    /// Reads then writes via `f`, using the same equality gate as
    /// [`S::write`].
    pub fn update(&self, f: impl FnOnce(&T) -> T)
    where
        T: PartialEq,
    {
        let next = f(&self.inner.borrow().value);
        self.write(next);
    }

    /// Number of scopes currently registered as readers. Exposed for
    /// tests and diagnostics, not part of the reactive contract.
    pub fn reader_count(&self) -> usize {
        self.inner.borrow().readers.len()
    }
}

/// Creates a new state cell holding `initial`.
pub fn state<T: 'static>(initial: T) -> S<T> {
    S::new(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;

    #[test]
    fn write_equal_value_is_a_no_op() {
        let cell = state(1i32);
        let scope = Scope::new();
        scope.clone().run(|| {
            let _ = cell.read();
        });
        assert_eq!(cell.reader_count(), 1);
        cell.write(1);
        // equal value: reader set untouched
        assert_eq!(cell.reader_count(), 1);
    }

    #[test]
    fn write_changed_value_clears_readers() {
        let cell = state(1i32);
        let scope = Scope::new();
        scope.run(|| {
            let _ = cell.read();
        });
        assert_eq!(cell.reader_count(), 1);
        cell.write(2);
        assert_eq!(cell.reader_count(), 0);
        assert_eq!(cell.peek(), 2);
    }

    #[test]
    fn untracked_read_outside_scope_registers_nothing() {
        let cell = state("a".to_string());
        assert_eq!(cell.read(), "a");
        assert_eq!(cell.reader_count(), 0);
    }
}
