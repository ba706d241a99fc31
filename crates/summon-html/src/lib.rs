//! # The HTML platform renderer
//!
//! `summon-html` drives a `summon_core` composition to produce server
//! rendered markup: an append-only [`renderer::Renderer`], an HTML
//! escaper and a conservative sanitizer for untrusted markup, the
//! callback registry and action-descriptor sum type that make an
//! element's event handlers serializable, the hydration packager that
//! embeds them alongside a vanilla-JS bootstrap script, and the
//! callback-dispatch HTTP wire contract the bootstrap script talks to.
//!
//! There is no virtual DOM and no client-side re-composition: hydration
//! here means "rebind listeners against a JSON table", never "re-run
//! composables in the browser". [`ssr::render_to_string`] is the usual
//! entry point; [`ssr::render_chunks`] streams the same output in
//! fixed-size pieces for a host framework that wants to start flushing
//! bytes before the whole document is ready.

pub mod callback;
pub mod error;
pub mod escape;
pub mod http;
pub mod hydration;
pub mod modifier;
pub mod renderer;
pub mod sanitize;
pub mod ssr;

pub use callback::{ActionDescriptor, CallbackEntry, CallbackRegistry};
pub use error::RenderError;
pub use modifier::Modifier;
pub use renderer::{FormScope, Renderer, RenderedOutput};
pub use ssr::{
    render_chunks, render_fragment, render_fragment_with_debug, render_to_string,
    render_to_string_with_debug,
};

pub mod prelude {
    pub use crate::callback::ActionDescriptor;
    pub use crate::error::RenderError;
    pub use crate::modifier::Modifier;
    pub use crate::renderer::Renderer;
    pub use crate::ssr::{
        render_chunks, render_fragment, render_fragment_with_debug, render_to_string,
        render_to_string_with_debug,
    };
}
