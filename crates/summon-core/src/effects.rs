//! The effect scheduler (C4): `launch_effect`, `disposable_effect` and
//! `side_effect`, plus the minimal [`Executor`] abstraction launch
//! effects run on.
//!
//! Grounded on `effects.rs`'s `Dispose`/`effect`/`on_unmount` and
//! `effects_ext.rs`'s key-gated `launched_effect`/`disposable_effect`/
//! `side_effect` trio, rebuilt so the key comparison actually compares
//! the key's value (the teacher's `effects_ext.rs` compared
//! `std::ptr::addr_of!(&key)`, which compares the address of a local
//! stack slot and is not a key-change check at all) and so cancellation
//! ties into [`crate::scope::Scope`] disposal rather than being a no-op.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use crate::scope::current_scope;

/// A single deferred cleanup action, returned by an effect setup and run
/// when that effect is torn down.
pub struct Dispose(Box<dyn FnOnce()>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Dispose(Box::new(f))
    }

    pub fn run(self) {
        (self.0)()
    }

    pub fn noop() -> Self {
        Dispose::new(|| {})
    }
}

/// Something that can run a boxed future to completion without the
/// caller needing to know how. The default, [`InlineExecutor`], is
/// enough to demonstrate scheduling and cancellation without pulling in
/// a full async runtime; a host application can supply its own.
pub trait Executor {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()>>>) -> TaskHandle;
}

/// A handle to a spawned task. Dropping it does not cancel the task —
/// call [`TaskHandle::cancel`] explicitly, which is what
/// `launch_effect`'s key-change/disposal path does.
#[derive(Clone)]
pub struct TaskHandle {
    cancelled: Rc<AtomicBool>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

struct PendingTask {
    future: RefCell<Pin<Box<dyn Future<Output = ()>>>>,
    cancelled: Rc<AtomicBool>,
}

/// A single-threaded, cooperative executor: tasks only make progress
/// when [`InlineExecutor::poll_pending`] is called. SSR never calls it
/// (per §4.4, a server render does not wait on launch-effects), so on
/// the server a launch-effect's future is spawned but simply never
/// polled past its first `Pending` before the render root is disposed.
pub struct InlineExecutor {
    tasks: RefCell<Vec<Rc<PendingTask>>>,
}

impl Default for InlineExecutor {
    fn default() -> Self {
        Self {
            tasks: RefCell::new(Vec::new()),
        }
    }
}

impl Executor for InlineExecutor {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()>>>) -> TaskHandle {
        let cancelled = Rc::new(AtomicBool::new(false));
        self.tasks.borrow_mut().push(Rc::new(PendingTask {
            future: RefCell::new(future),
            cancelled: cancelled.clone(),
        }));
        TaskHandle { cancelled }
    }
}

impl InlineExecutor {
    /// Polls every pending task once. Completed and cancelled tasks are
    /// dropped from the queue; tasks that returned `Pending` stay for
    /// the next call.
    pub fn poll_pending(&self) {
        let tasks: Vec<Rc<PendingTask>> = self.tasks.borrow().clone();
        let mut done = Vec::new();
        for (idx, task) in tasks.iter().enumerate() {
            if task.cancelled.load(Ordering::Relaxed) {
                done.push(idx);
                continue;
            }
            let waker = noop_waker();
            let mut cx = Context::from_waker(&waker);
            let poll = task.future.borrow_mut().as_mut().poll(&mut cx);
            if matches!(poll, Poll::Ready(())) {
                done.push(idx);
            }
        }
        let mut tasks = self.tasks.borrow_mut();
        for idx in done.into_iter().rev() {
            tasks.remove(idx);
        }
    }
}

fn noop_waker() -> Waker {
    fn clone(_: *const ()) -> RawWaker {
        raw()
    }
    fn wake(_: *const ()) {}
    fn wake_by_ref(_: *const ()) {}
    fn drop(_: *const ()) {}
    fn raw() -> RawWaker {
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, wake, wake_by_ref, drop);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }
    unsafe { Waker::from_raw(raw()) }
}

thread_local! {
    static DEFAULT_EXECUTOR: InlineExecutor = InlineExecutor::default();
}

/// Advances the thread-local default executor by one round. Call this
/// from the host's event loop / request-handling loop after a
/// recomposition tick that may have launched new effects.
pub fn poll_pending() {
    DEFAULT_EXECUTOR.with(InlineExecutor::poll_pending);
}

fn spawn_on_default(future: Pin<Box<dyn Future<Output = ()>>>) -> TaskHandle {
    DEFAULT_EXECUTOR.with(|exec| exec.spawn(future))
}

/// Spawns `make_future()` the first time this call site runs with a new
/// `key`, cancelling whatever it spawned for the previous key. Disposed
/// along with the enclosing scope: scope disposal cancels the
/// outstanding task even if `key` never changed again.
#[track_caller]
pub fn launch_effect<K, F>(key: K, make_future: impl FnOnce() -> F)
where
    K: PartialEq + Clone + 'static,
    F: Future<Output = ()> + 'static,
{
    let slot: Rc<RefCell<Option<(K, TaskHandle)>>> = crate::composer::remember(|| Rc::new(RefCell::new(None)));
    let mut slot_ref = slot.borrow_mut();
    let changed = match &*slot_ref {
        Some((last_key, _)) => *last_key != key,
        None => true,
    };
    if !changed {
        return;
    }
    if let Some((_, handle)) = slot_ref.take() {
        handle.cancel();
    }
    let future: Pin<Box<dyn Future<Output = ()>>> = Box::pin(make_future());
    let handle = spawn_on_default(future);
    if let Some(scope) = current_scope() {
        let cancel_handle = handle.clone();
        scope.add_disposer(move || cancel_handle.cancel());
    }
    *slot_ref = Some((key, handle));
}

/// Runs `setup()` the first time this call site runs with a new `key`,
/// first running whatever [`Dispose`] the previous `setup()` returned.
/// The current `Dispose` also runs when the enclosing scope is
/// disposed, even if `key` never changes again.
#[track_caller]
pub fn disposable_effect<K>(key: K, setup: impl FnOnce() -> Dispose + 'static)
where
    K: PartialEq + Clone + 'static,
{
    let slot: Rc<RefCell<Option<K>>> = crate::composer::remember(|| Rc::new(RefCell::new(None)));
    let changed = slot.borrow().as_ref() != Some(&key);
    if !changed {
        return;
    }
    *slot.borrow_mut() = Some(key);
    let dispose = setup();
    if let Some(scope) = current_scope() {
        scope.add_disposer(move || dispose.run());
    } else {
        log::warn!("disposable_effect registered with no current scope; cleanup will leak");
        dispose.run();
    }
}

/// Runs `f` unconditionally, every time this call site is composed. No
/// cleanup, no key gating — the teacher's `side_effect` behavior carried
/// through unchanged, since §4.4 specifies it the same way.
pub fn side_effect(f: impl FnOnce()) {
    f();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Scope;
    use std::cell::Cell;

    #[test]
    fn disposable_effect_runs_setup_once_per_key() {
        let scope = Scope::new();
        let setups = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let s = setups.clone();
            crate::composer::compose(&scope, || {
                disposable_effect("stable-key", move || {
                    s.set(s.get() + 1);
                    Dispose::noop()
                });
            })
            .unwrap();
        }
        assert_eq!(setups.get(), 1);
    }

    #[test]
    fn disposable_effect_reruns_setup_on_key_change() {
        let scope = Scope::new();
        let setups = Rc::new(Cell::new(0));
        for key in ["a", "a", "b"] {
            let s = setups.clone();
            crate::composer::compose(&scope, || {
                disposable_effect(key, move || {
                    s.set(s.get() + 1);
                    Dispose::noop()
                });
            })
            .unwrap();
        }
        assert_eq!(setups.get(), 2);
    }

    #[test]
    fn disposable_effect_cleanup_runs_on_scope_dispose() {
        let scope = Scope::new();
        let cleaned = Rc::new(Cell::new(false));
        let c = cleaned.clone();
        crate::composer::compose(&scope, || {
            disposable_effect(1i32, move || Dispose::new(move || c.set(true)));
        })
        .unwrap();
        assert!(!cleaned.get());
        scope.dispose();
        assert!(cleaned.get());
    }

    #[test]
    fn side_effect_runs_every_time() {
        let count = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let c = count.clone();
            side_effect(move || c.set(c.get() + 1));
        }
        assert_eq!(count.get(), 3);
    }
}
