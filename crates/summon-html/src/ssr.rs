//! SSR entry points: `render_to_string` and the streaming
//! `render_chunks` variant (§6, E3).
//!
//! Grounded on sycamore-web's `render_to_string`: reuse a thread-local
//! root scope across calls rather than allocating a brand-new
//! composition root per request, and run each render in a disposable
//! child scope so per-call state (the callback registry, every
//! `remember` slot touched this render) is fully torn down afterwards
//! and cannot leak into the next request on the same thread — the
//! correctness requirement §5 calls out explicitly. The root composable
//! body runs through `summon_core::compose`, the same per-scope
//! containment boundary `Renderer::element`/`Renderer::form` open for
//! every nested element (§4.3, §7, §9): a panic anywhere in the tree is
//! caught at its own scope rather than unwinding the whole render, so a
//! top-level panic (one that isn't already inside some element's
//! `run_contained`) still comes back as a `RenderError` instead of
//! taking the render thread down.

use std::cell::RefCell;

use summon_core::composer;
use summon_core::scope::Scope;

use crate::error::RenderError;
use crate::hydration;
use crate::renderer::Renderer;

thread_local! {
    static SSR_ROOT: RefCell<Scope> = RefCell::new(Scope::new());
}

struct RenderedPass {
    body: String,
    head: String,
    callbacks: Vec<crate::callback::CallbackEntry>,
}

fn render_pass(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    debug_errors: bool,
) -> Result<RenderedPass, RenderError> {
    SSR_ROOT.with(|root| {
        let child = root.borrow().child();
        let mut renderer = Renderer::new();
        renderer.set_debug_errors(debug_errors);
        let outcome = composer::compose(&child, || compose(&mut renderer));
        child.dispose();

        match outcome {
            Ok(render_result) => render_result?,
            Err(abort) => return Err(RenderError::from(abort)),
        }

        let output = renderer.finish();
        Ok(RenderedPass {
            body: output.body,
            head: output.head,
            callbacks: output.callbacks.entries().to_vec(),
        })
    })
}

/// Renders `compose` into a complete HTML document: the accumulated
/// `<head>` content, the body, the hydration data marker and the
/// bootstrap script tag, in that order.
pub fn render_to_string(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
) -> Result<String, RenderError> {
    render_to_string_with_debug(compose, false)
}

/// As [`render_to_string`], but when `debug_errors` is set, every
/// `<div data-summon-error>` fallback carries the panic message that
/// produced it (§4.3). Intended for local development only — a
/// production render should not echo panic payloads into client markup.
pub fn render_to_string_with_debug(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    debug_errors: bool,
) -> Result<String, RenderError> {
    let pass = render_pass(compose, debug_errors)?;
    let hydration_script = hydration::render_hydration_script(&pass.callbacks)?;
    let bootstrap = hydration::bootstrap_script_tag();
    Ok(format!(
        "<!DOCTYPE html><html><head>{}</head><body>{}{}{}</body></html>",
        pass.head, pass.body, hydration_script, bootstrap
    ))
}

/// Renders `compose` into just the body fragment plus its hydration
/// marker and bootstrap tag, without a document shell — for embedding
/// into a page the host application otherwise controls. Any content
/// queued via `Renderer::push_head` is still included, prefixed to the
/// fragment, since a caller splicing this into an existing page still
/// needs it (a `<title>`/`<meta>` emitted by a composable has nowhere
/// else to go once there is no `<head>` element here to hold it).
pub fn render_fragment(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
) -> Result<String, RenderError> {
    render_fragment_with_debug(compose, false)
}

/// As [`render_fragment`], with the same `debug_errors` behavior as
/// [`render_to_string_with_debug`].
pub fn render_fragment_with_debug(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    debug_errors: bool,
) -> Result<String, RenderError> {
    let pass = render_pass(compose, debug_errors)?;
    let hydration_script = hydration::render_hydration_script(&pass.callbacks)?;
    let bootstrap = hydration::bootstrap_script_tag();
    Ok(format!(
        "{}{}{}{}",
        pass.head, pass.body, hydration_script, bootstrap
    ))
}

/// Renders `compose` into a complete document, then yields it back in
/// `chunk_size`-byte pieces. Chunk boundaries are not required to land
/// on character boundaries in the spec, but this implementation still
/// respects UTF-8 character boundaries so a consumer never sees a split
/// multi-byte sequence.
pub fn render_chunks(
    compose: impl FnOnce(&mut Renderer) -> Result<(), RenderError>,
    chunk_size: usize,
) -> Result<impl Iterator<Item = String>, RenderError> {
    let html = render_to_string(compose)?;
    Ok(ChunkIter {
        html,
        pos: 0,
        chunk_size: chunk_size.max(1),
    })
}

struct ChunkIter {
    html: String,
    pos: usize,
    chunk_size: usize,
}

impl Iterator for ChunkIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.pos >= self.html.len() {
            return None;
        }
        let mut end = (self.pos + self.chunk_size).min(self.html.len());
        while end < self.html.len() && !self.html.is_char_boundary(end) {
            end += 1;
        }
        let chunk = self.html[self.pos..end].to_string();
        self.pos = end;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::Modifier;

    #[test]
    fn render_to_string_produces_a_full_document() {
        let html = render_to_string(|r| {
            r.push_head("<title>T</title>");
            r.element("p", &Modifier::new(), |r| {
                r.text("hello");
                Ok(())
            })
        })
        .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>T</title>"));
        assert!(html.contains("<p>hello</p>"));
        assert!(html.contains("summon-hydration-data"));
    }

    #[test]
    fn consecutive_renders_on_the_same_thread_do_not_leak_callbacks() {
        let first = render_to_string(|r| {
            r.element(
                "button",
                &Modifier::new().on(
                    "click",
                    crate::callback::ActionDescriptor::Navigate { url: "/a".into() },
                ),
                |r| {
                    r.text("a");
                    Ok(())
                },
            )
        })
        .unwrap();
        let second = render_to_string(|r| {
            r.element("p", &Modifier::new(), |r| {
                r.text("b");
                Ok(())
            })
        })
        .unwrap();
        assert!(first.contains("cb-0"));
        assert!(!second.contains("data-summon-on-click"));
    }

    #[test]
    fn composable_panic_is_contained_as_a_render_error() {
        let result = render_to_string(|_r| -> Result<(), RenderError> {
            panic!("boom");
        });
        assert!(matches!(result, Err(RenderError::ComposeFailed(_))));
    }

    #[test]
    fn render_fragment_includes_deferred_head_content() {
        let fragment = render_fragment(|r| {
            r.push_head("<title>Fragment</title>");
            r.element("p", &Modifier::new(), |r| {
                r.text("hello");
                Ok(())
            })
        })
        .unwrap();
        assert!(fragment.contains("<title>Fragment</title>"));
        assert!(fragment.contains("<p>hello</p>"));
        assert!(!fragment.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn debug_errors_flag_reaches_the_fragment_renderer() {
        let fragment = render_fragment_with_debug(
            |r| r.element("div", &Modifier::new(), |_| panic!("nope")),
            true,
        )
        .unwrap();
        assert!(fragment.contains(r#"data-summon-error="nope""#));
    }

    #[test]
    fn fragment_snapshot_for_a_labeled_button() {
        let fragment = render_fragment(|r| {
            r.element("p", &Modifier::new(), |r| {
                r.text("Count: 0");
                Ok(())
            })?;
            r.element(
                "button",
                &Modifier::new().on(
                    "click",
                    crate::callback::ActionDescriptor::ServerRpc {
                        endpoint: "/counter/increment".into(),
                        payload: serde_json::json!({}),
                        optimistic: None,
                    },
                ),
                |r| {
                    r.text("Increment");
                    Ok(())
                },
            )
        })
        .unwrap();
        insta::assert_snapshot!(fragment, @r###"<p>Count: 0</p><button type="button" data-summon-on-click="cb-0">Increment</button><script type="application/json" id="summon-hydration-data">{"cb-0":{"kind":"rpc","endpoint":"/counter/increment","payload":{}}}</script><script src="/__summon/bootstrap.js" defer></script>"###);
    }

    #[test]
    fn render_chunks_reassembles_to_the_full_document() {
        let chunks: Vec<String> = render_chunks(
            |r| {
                r.element("p", &Modifier::new(), |r| {
                    r.text("chunked output");
                    Ok(())
                })
            },
            8,
        )
        .unwrap()
        .collect();
        assert!(chunks.len() > 1);
        let reassembled: String = chunks.concat();
        assert!(reassembled.contains("chunked output"));
    }
}
