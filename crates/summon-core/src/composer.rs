//! The composer (C2): the slot table that gives every `remember` call a
//! stable, positional identity across recompositions.
//!
//! Grounded on `runtime.rs`'s `Composer { slots, cursor, keyed_slots }`
//! and its cursor-based `remember`, generalized per the call-site-identity
//! invariant: a slot's key is `(call-site identity, invocation index
//! within its parent scope)`, not a bare monotonic cursor. A bare cursor
//! is only stable if composables are never called conditionally or in a
//! loop of varying length; call-site identity plus a per-call-site
//! invocation counter survives both.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::scope::ScopeId;

/// Identifies *where in the source* a composable was invoked from, not
/// *which value* it produced. Two calls to the same `remember` call site
/// hash equal; this satisfies the `hash(a) == hash(b) => a identifies the
/// same slot` invariant because a `Location` is immutable per call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSiteId(u64);

impl CallSiteId {
    #[track_caller]
    pub fn here() -> Self {
        let loc = std::panic::Location::caller();
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        loc.file().hash(&mut hasher);
        loc.line().hash(&mut hasher);
        loc.column().hash(&mut hasher);
        CallSiteId(hasher.finish())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SlotId {
    scope: ScopeId,
    call_site: CallSiteId,
    invocation: u32,
}

struct Slot {
    value: Box<dyn Any>,
    type_name: &'static str,
}

struct Frame {
    scope: ScopeId,
    /// How many times each call site has been hit so far this pass,
    /// within this frame. Reset at `open_scope`, read at every
    /// `remember` to assign the next slot's `invocation` index.
    counts: HashMap<CallSiteId, u32>,
    used: std::collections::HashSet<SlotId>,
}

pub struct Composer {
    slots: HashMap<SlotId, Slot>,
    frames: Vec<Frame>,
}

impl Composer {
    fn new() -> Self {
        Composer {
            slots: HashMap::new(),
            frames: Vec::new(),
        }
    }

    fn current_frame(&mut self) -> &mut Frame {
        self.frames
            .last_mut()
            .expect("remember/register_effect called with no open composer scope")
    }

    fn next_slot_id(&mut self, call_site: CallSiteId) -> SlotId {
        let scope = self.current_frame().scope;
        let frame = self.current_frame();
        let invocation = frame.counts.entry(call_site).or_insert(0);
        let id = SlotId {
            scope,
            call_site,
            invocation: *invocation,
        };
        *invocation += 1;
        self.current_frame().used.insert(id);
        id
    }
}

thread_local! {
    static COMPOSER: RefCell<Composer> = RefCell::new(Composer::new());
}

/// Begins composing `scope`: pushes a fresh invocation-counter frame.
/// Must be paired with [`close_scope`] even if the composable body
/// panics — callers use [`crate::error::run_composable_body`] for that.
pub fn open_scope(scope: ScopeId) {
    COMPOSER.with(|c| {
        c.borrow_mut().frames.push(Frame {
            scope,
            counts: HashMap::new(),
            used: std::collections::HashSet::new(),
        })
    });
}

/// Ends composition of the scope opened by the matching [`open_scope`],
/// evicting any slot belonging to that scope that was not touched this
/// pass (the composable stopped calling `remember` at that call site —
/// commonly because of a conditional branch or a shrunk loop).
pub fn close_scope() {
    let frame = COMPOSER.with(|c| c.borrow_mut().frames.pop());
    let Some(frame) = frame else {
        log::warn!("close_scope called with no matching open_scope");
        return;
    };
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        c.slots
            .retain(|id, _| id.scope != frame.scope || frame.used.contains(id));
    });
}

/// Evicts every slot that belongs to `scope`, regardless of whether it
/// was used this pass. Called when a scope is disposed entirely (the
/// composable that owned it will never run again).
pub fn evict_scope(scope: ScopeId) {
    COMPOSER.with(|c| c.borrow_mut().slots.retain(|id, _| id.scope != scope));
}

/// The outcome of composing one scope when its body panics: checked as
/// data at the scope boundary (§9) rather than left to unwind past it.
/// `compose` catches the panic right here, so a failure in one scope's
/// body never propagates into whatever scope called it — the caller
/// decides what an aborted scope renders as (`summon-html`'s renderer
/// substitutes a fallback element and continues the parent).
#[derive(Debug)]
pub enum ScopeAbort {
    Panicked(String),
}

/// Convenience wrapper: installs `scope` as both the current scope
/// ([`crate::scope::current_scope`]) and the current composer frame for
/// the duration of `f`, closing the frame afterwards even if `f` panics.
///
/// A panic inside `f` is caught here and returned as
/// [`ScopeAbort::Panicked`] instead of unwinding into the caller — this
/// is the scope boundary the composable-failure containment in §4.3/§7
/// is checked at, not a single `catch_unwind` wrapped around an entire
/// render root.
pub fn compose<R>(scope: &crate::scope::Scope, f: impl FnOnce() -> R) -> Result<R, ScopeAbort> {
    open_scope(scope.id());
    struct CloseGuard;
    impl Drop for CloseGuard {
        fn drop(&mut self) {
            close_scope();
        }
    }
    let _guard = CloseGuard;
    match scope.run(|| crate::error::run_composable_body(f)) {
        Ok(value) => Ok(value),
        Err(crate::error::ComposeError::BodyPanicked(message)) => {
            log::error!("composable scope aborted: {message}");
            evict_scope(scope.id());
            Err(ScopeAbort::Panicked(message))
        }
        Err(other) => {
            log::error!("composable scope aborted: {other}");
            evict_scope(scope.id());
            Err(ScopeAbort::Panicked(other.to_string()))
        }
    }
}

/// Positional memoization: on the first call at this call site within
/// the current scope, runs `init` and stores the result. On later calls
/// at the same call site (same scope, same source position, same
/// invocation count this pass), returns a clone of the stored value
/// without calling `init`.
///
/// If a stored value's type no longer matches `T` (the same call site
/// started remembering a different type — almost always a programmer
/// error after editing code, not a real scenario in a stable build), the
/// stale slot is dropped and `init` runs again, with a warning logged.
#[track_caller]
pub fn remember<T: Clone + 'static>(init: impl FnOnce() -> T) -> T {
    let call_site = CallSiteId::here();
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let id = c.next_slot_id(call_site);
        if let Some(slot) = c.slots.get(&id) {
            if let Some(v) = slot.value.downcast_ref::<T>() {
                return v.clone();
            }
            log::warn!(
                "remember slot type mismatch at a reused call site (was `{}`); replacing",
                slot.type_name
            );
        }
        let value = init();
        c.slots.insert(
            id,
            Slot {
                value: Box::new(value.clone()),
                type_name: std::any::type_name::<T>(),
            },
        );
        value
    })
}

/// Like [`remember`], but the slot is additionally keyed by `key`
/// instead of relying purely on invocation order. Used by `remember`
/// call sites inside loops keyed by a stable item id, so reordering the
/// collection doesn't scramble which remembered value belongs to which
/// item.
#[track_caller]
pub fn remember_keyed<T: Clone + 'static, K: Hash>(key: K, init: impl FnOnce() -> T) -> T {
    let call_site = {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        CallSiteId::here().hash(&mut hasher);
        key.hash(&mut hasher);
        CallSiteId(hasher.finish())
    };
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let id = c.next_slot_id(call_site);
        if let Some(slot) = c.slots.get(&id) {
            if let Some(v) = slot.value.downcast_ref::<T>() {
                return v.clone();
            }
        }
        let value = init();
        c.slots.insert(
            id,
            Slot {
                value: Box::new(value.clone()),
                type_name: std::any::type_name::<T>(),
            },
        );
        value
    })
}

/// Marks the slot at this call site as used this pass without changing
/// it. Needed when a composable wants to keep an earlier `remember`
/// alive across a pass where, for unrelated reasons, its own branch did
/// not call `remember` again (rare; most code should just call
/// `remember` every time it runs).
pub fn touch(call_site: CallSiteId) {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let scope = c.current_frame().scope;
        let invocation = *c.current_frame().counts.get(&call_site).unwrap_or(&0);
        let id = SlotId {
            scope,
            call_site,
            invocation,
        };
        c.current_frame().used.insert(id);
    });
}
