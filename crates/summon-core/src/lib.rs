//! # State cells, the composer, and effects
//!
//! `summon-core` is a small reactive core that a platform renderer
//! (`summon-html`, for instance) drives through a recomposition loop.
//! There is no view tree, widget type or rendering concern in this
//! crate — just five pieces:
//!
//! - [`state::S<T>`] — an observable, reactive value with
//!   equality-gated invalidation.
//! - [`composer`] — positional, call-site-keyed memoization
//!   (`remember`/`remember_keyed`) bound to a composition scope.
//! - [`recomposer`] — the invalidation queue and the drive loop that
//!   turns a dirty [`scope::ScopeId`] back into a re-run composable.
//! - [`effects`] — `launch_effect`/`disposable_effect`/`side_effect`.
//! - [`context`] — a stack of composition-local values, scoped per
//!   thread/task.
//!
//! ## State cells
//!
//! ```
//! use summon_core::prelude::*;
//!
//! let count = state(0i32);
//! count.write(1);
//! count.update(|v| v + 1);
//! assert_eq!(count.peek(), 2);
//! ```
//!
//! Reading a cell with [`state::S::read`] registers whichever scope is
//! currently composing as a reader; writing a changed value schedules
//! exactly those readers, and only those readers, for recomposition.
//!
//! ## Remembered state
//!
//! ```
//! use summon_core::prelude::*;
//!
//! fn counter_scope() -> Scope {
//!     let scope = Scope::new();
//!     composer::compose(&scope, || {
//!         let count = remember(|| state(0i32));
//!         count.write(count.peek() + 1);
//!     })
//!     .expect("composable body did not panic");
//!     scope
//! }
//! ```
//!
//! `remember` is positional: the call site plus its invocation index
//! within the current scope is the slot's identity (§4.2). Inside a
//! loop over items with a stable id, prefer `remember_keyed` so
//! reordering the collection does not scramble which remembered value
//! belongs to which item.
//!
//! ## Effects and cleanup
//!
//! ```
//! use summon_core::prelude::*;
//!
//! fn mount_log(scope: &Scope) {
//!     composer::compose(scope, || {
//!         disposable_effect((), || {
//!             log::info!("mounted");
//!             Dispose::new(|| log::info!("unmounted"))
//!         });
//!     })
//!     .expect("composable body did not panic");
//! }
//! ```
//!
//! `disposable_effect` and `launch_effect` are keyed: the setup/future
//! only reruns when the key changes, and the previous run's cleanup (or
//! cancellation) happens first. `side_effect` has no such gate and runs
//! on every composition of its call site.

pub mod composer;
pub mod context;
pub mod effects;
pub mod error;
pub mod prelude;
pub mod recomposer;
pub mod scope;
pub mod state;

pub use composer::{compose, remember, remember_keyed, ScopeAbort};
pub use effects::{disposable_effect, launch_effect, side_effect, Dispose, Executor, TaskHandle};
pub use error::ComposeError;
pub use scope::{current_scope, Scope, ScopeId};
pub use state::{state, S};
