pub use crate::composer::{self, remember, remember_keyed, CallSiteId};
pub use crate::context::{current, current_rc, provide, provide_rc};
pub use crate::effects::{
    disposable_effect, launch_effect, poll_pending, side_effect, Dispose, Executor, TaskHandle,
};
pub use crate::error::ComposeError;
pub use crate::recomposer::{self, Phase};
pub use crate::scope::{current_scope, current_scope_id, scoped_effect, Scope, ScopeId};
pub use crate::state::{state, S};
