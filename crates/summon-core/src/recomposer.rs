//! The recomposer (C3): drives one or more composition passes and owns
//! the invalidation queue that [`crate::state::S::write`] feeds into.
//!
//! Grounded on the dirty-set drain loop in `Recomposer::recompose` from
//! cksac's `compose-rt`: collect everything marked dirty, clear the
//! dirty set, re-run exactly those scopes, repeat if the re-run itself
//! marked anything dirty (a write inside a composable body that reads
//! the same cell it just wrote). Unlike that implementation we key
//! re-runs by [`ScopeId`] rather than a generational node key, since
//! `summon-core` does not keep a persistent node tree — only the slot
//! table does, and it owns its own staleness bookkeeping.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::scope::ScopeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Composing,
    Flushing,
}

struct RecomposerState {
    phase: Phase,
    dirty: HashSet<ScopeId>,
    /// The re-run closure registered for a scope the last time it was
    /// composed. Overwritten on every composition of that scope;
    /// removed when the scope is disposed.
    reruns: HashMap<ScopeId, Rc<dyn Fn()>>,
}

impl RecomposerState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            dirty: HashSet::new(),
            reruns: HashMap::new(),
        }
    }
}

thread_local! {
    static STATE: RefCell<RecomposerState> = RefCell::new(RecomposerState::new());
}

/// Registers (or replaces) the closure that recomposes `scope` in
/// isolation. Called by the composer once per scope on every pass it
/// composes that scope.
pub fn register_rerun(scope: ScopeId, rerun: Rc<dyn Fn()>) {
    STATE.with(|s| {
        s.borrow_mut().reruns.insert(scope, rerun);
    });
}

/// Drops bookkeeping for a scope that has been disposed. A disposed
/// scope must never be recomposed even if something invalidates it
/// after disposal but before the next tick drains the queue.
pub fn forget_scope(scope: ScopeId) {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        s.reruns.remove(&scope);
        s.dirty.remove(&scope);
    });
}

/// Marks `scope` dirty. Safe to call from inside a composable body
/// (e.g. an effect writing a state cell read by the same scope): the
/// write is simply queued for the next tick rather than recursing.
pub fn invalidate(scope: ScopeId) {
    STATE.with(|s| {
        s.borrow_mut().dirty.insert(scope);
    });
}

pub fn current_phase() -> Phase {
    STATE.with(|s| s.borrow().phase)
}

pub fn is_dirty() -> bool {
    STATE.with(|s| !s.borrow().dirty.is_empty())
}

/// Runs composition passes until the dirty set drains or `max_passes`
/// is hit (a safety valve against a composable that always invalidates
/// itself). Returns the number of passes actually run.
///
/// Ancestor-first ordering (spec §4.3) is approximated by ascending
/// `ScopeId`: scopes are allocated in composition order, and a parent's
/// scope is always created before any of its children's, so sorting by
/// id recomposes outer scopes before the inner scopes nested within
/// them were (re)created.
pub fn run_recomposition_tick(max_passes: usize) -> usize {
    let mut passes = 0;
    loop {
        let batch: Vec<ScopeId> = STATE.with(|s| {
            let mut s = s.borrow_mut();
            if s.dirty.is_empty() {
                return Vec::new();
            }
            s.phase = Phase::Composing;
            let mut batch: Vec<ScopeId> = s.dirty.drain().collect();
            batch.sort_unstable();
            batch
        });
        if batch.is_empty() {
            break;
        }
        for scope in batch {
            let rerun = STATE.with(|s| s.borrow().reruns.get(&scope).cloned());
            if let Some(rerun) = rerun {
                rerun();
            }
        }
        passes += 1;
        STATE.with(|s| s.borrow_mut().phase = Phase::Flushing);
        if passes >= max_passes {
            log::warn!(
                "recomposition did not settle after {max_passes} passes; \
                 a composable likely invalidates its own reader on every run"
            );
            break;
        }
    }
    STATE.with(|s| s.borrow_mut().phase = Phase::Idle);
    passes
}
