use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a composition scope across the lifetime of a composer.
///
/// State cells record the `ScopeId` of whichever scope read them, not the
/// `Scope` itself, so invalidation never has to keep a scope alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

fn next_scope_id() -> ScopeId {
    ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
}

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = RefCell::new(None);
}

/// A node in the composition's disposal tree.
///
/// Every composable invocation runs inside a `Scope`. Disposing a scope
/// cascades depth-first into its children, then runs its own disposers in
/// the order they were registered (last-registered-effect's cleanup does
/// not imply first-run; see `summon_core::effects`).
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    id: ScopeId,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ScopeInner {
                id: next_scope_id(),
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    /// Runs `f` with `self` installed as the current scope, restoring the
    /// previous current scope afterwards even if `f` unwinds.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let guard = ScopeGuard::install(self);
        let result = f();
        drop(guard);
        result
    }

    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Disposes this scope: children first (depth-first), then this
    /// scope's own disposers, then evicts this scope's bookkeeping from
    /// the composer's slot table and the recomposer's rerun/dirty sets.
    /// Consumes the handle so a disposed scope cannot be re-entered.
    ///
    /// Without the eviction step a long-running SSR thread that disposes
    /// a fresh child scope per request would grow the composer's
    /// thread-local slot map without bound — every render's slots would
    /// sit there forever since `close_scope` only evicts slots unused
    /// *within a still-open* scope, never a scope that no longer exists.
    pub fn dispose(self) {
        let id = self.inner.id;
        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in children {
            child.dispose();
        }
        let disposers = std::mem::take(&mut *self.inner.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
        crate::composer::evict_scope(id);
        crate::recomposer::forget_scope(id);
    }
}

struct ScopeGuard(Option<Weak<ScopeInner>>);

impl ScopeGuard {
    fn install(scope: &Scope) -> Self {
        CURRENT_SCOPE.with(|current| {
            let prev = current.borrow().clone();
            *current.borrow_mut() = Some(Rc::downgrade(&scope.inner));
            ScopeGuard(prev)
        })
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CURRENT_SCOPE.with(|current| {
            *current.borrow_mut() = self.0.take();
        });
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

pub fn current_scope_id() -> Option<ScopeId> {
    current_scope().map(|s| s.id())
}

/// Registers a disposer that runs when the current scope is disposed.
///
/// With no current scope (composing outside any root), the cleanup leaks:
/// there is nothing to hang it on, so it never runs.
pub fn scoped_effect<F>(f: F)
where
    F: FnOnce() -> Box<dyn FnOnce()> + 'static,
{
    if let Some(scope) = current_scope() {
        let cleanup = f();
        scope.add_disposer(cleanup);
    } else {
        log::warn!("scoped_effect registered with no current scope; cleanup will leak");
        let _ = f();
    }
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        // A scope dropped without an explicit `dispose()` call (e.g. the
        // root scope at process exit) still runs cleanups, but children
        // dropped this way do not get the depth-first ordering guarantee
        // `dispose()` provides. Callers that need ordered teardown must
        // call `dispose()` explicitly.
        let children = std::mem::take(&mut *self.children.borrow_mut());
        drop(children);
        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        for disposer in disposers {
            disposer();
        }
        crate::composer::evict_scope(self.id);
        crate::recomposer::forget_scope(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn ids_are_unique_and_stable() {
        let a = Scope::new();
        let b = Scope::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
    }

    #[test]
    fn run_installs_and_restores_current_scope() {
        let a = Scope::new();
        assert!(current_scope().is_none());
        a.run(|| {
            assert_eq!(current_scope().map(|s| s.id()), Some(a.id()));
        });
        assert!(current_scope().is_none());
    }

    #[test]
    fn bare_drop_does_not_cascade_ordering() {
        let ran = Rc::new(Cell::new(false));
        let scope = Scope::new();
        let ran2 = ran.clone();
        scope.add_disposer(move || ran2.set(true));
        drop(scope);
        assert!(ran.get(), "disposers still run on bare drop");
    }

    #[test]
    fn explicit_dispose_runs_children_before_parent() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = Scope::new();
        let child = parent.child();
        let o1 = order.clone();
        child.add_disposer(move || o1.borrow_mut().push("child"));
        let o2 = order.clone();
        parent.add_disposer(move || o2.borrow_mut().push("parent"));
        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
    }
}
